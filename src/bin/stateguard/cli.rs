use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "stateguard",
    version,
    about = "Runtime safety harness: guarded operations with checksummed snapshot/rollback",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Decode exported snapshot frames for offline fault analysis
    Decode {
        /// File containing one or more concatenated SBMS frames
        #[arg(long)]
        file: PathBuf,
        /// Print one JSON object instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run the fault-injection drill (null/bounds/loop/propagation/corruption)
    Inject {
        /// Print one JSON object instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Generate a deterministic allocation trace (JSONL) for reproducibility checks
    Trace {
        /// LCG seed; identical seed and steps reproduce the trace byte-for-byte
        #[arg(long, default_value_t = 0)]
        seed: u32,
        /// Number of simulation steps
        #[arg(long, default_value_t = 1000)]
        steps: u32,
        /// Output JSONL file
        #[arg(long)]
        out: PathBuf,
    },
}
