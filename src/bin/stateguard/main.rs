use anyhow::Result;
use clap::Parser;

mod cli;
mod cmd_decode;
mod cmd_inject;
mod cmd_trace;
mod util;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Decode { file, json } => cmd_decode::exec(file, json),

        cli::Cmd::Inject { json } => cmd_inject::exec(json),

        cli::Cmd::Trace { seed, steps, out } => cmd_trace::exec(seed, steps, out),
    }
}
