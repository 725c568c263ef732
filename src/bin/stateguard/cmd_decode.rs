use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::PathBuf;

use stateguard::consts::FRAME_HDR_SIZE;
use stateguard::{read_frame, HarnessConfig, LoopContext};

use crate::util::hex_dump_head;

/// Decode every concatenated frame in `file`; text or one JSON object.
pub fn exec(file: PathBuf, json: bool) -> Result<()> {
    let bytes = fs::read(&file).with_context(|| format!("read frames {}", file.display()))?;
    if bytes.is_empty() {
        return Err(anyhow!("{} is empty", file.display()));
    }

    let mut frames = Vec::new();
    let mut pos = 0usize;
    let mut ctx = LoopContext::with_default_limit(&HarnessConfig::from_env());
    while pos < bytes.len() {
        ctx.tick().map_err(|v| anyhow!("{}", v))?;
        let (hdr, payload) = read_frame(&bytes[pos..])
            .map_err(|v| anyhow!("frame at offset {}: {}", pos, v))?;
        frames.push((pos, hdr, payload));
        pos += FRAME_HDR_SIZE + hdr.size as usize;
    }

    if json {
        let items: Vec<serde_json::Value> = frames
            .iter()
            .map(|(off, hdr, payload)| {
                serde_json::json!({
                    "offset": off,
                    "sequence": hdr.sequence,
                    "checksum": hdr.checksum,
                    "size": hdr.size,
                    "payload_head_hex": hex_dump_head(payload, 16).replace('\n', " "),
                })
            })
            .collect();
        let out = serde_json::json!({
            "file": file.display().to_string(),
            "frames": items,
            "total_bytes": bytes.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}: {} frame(s), {} bytes", file.display(), frames.len(), bytes.len());
    for (off, hdr, payload) in &frames {
        println!();
        println!("frame @ {}", off);
        println!("  sequence: {}", hdr.sequence);
        println!("  checksum: {:#010x} (verified)", hdr.checksum);
        println!("  size:     {} bytes", hdr.size);
        println!("  payload:");
        for line in hex_dump_head(payload, 64).lines() {
            println!("    {}", line);
        }
    }
    Ok(())
}
