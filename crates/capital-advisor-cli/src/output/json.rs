use serde_json::Value;
use std::io::{self, Write};

/// Write the full envelope to stdout as indented JSON.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = serde_json::to_writer_pretty(&mut out, value) {
        eprintln!("Failed to write JSON output: {e}");
        return;
    }
    let _ = writeln!(out);
}
