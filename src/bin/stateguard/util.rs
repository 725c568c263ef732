/// Hex dump of the first `limit` bytes, 16 per line; longer input gets a
/// trailing ellipsis marker.
pub fn hex_dump_head(bytes: &[u8], limit: usize) -> String {
    let shown = &bytes[..bytes.len().min(limit)];
    let mut out = String::new();
    for (i, b) in shown.iter().enumerate() {
        if i > 0 {
            if i % 16 == 0 {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
        out.push_str(&format!("{:02x}", b));
    }
    if bytes.len() > limit {
        out.push_str(&format!("\n.. ({} more bytes)", bytes.len() - limit));
    }
    out
}
