use serde_json::Value;
use std::io::{self, Read};

/// Read piped JSON from stdin. Returns `None` for an interactive terminal
/// or an empty pipe so the caller can fall back to flags.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| format!("Failed to read piped input: {e}"))?;
    parse_piped(&buffer)
}

fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse piped input: {e}"))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pipe_falls_back_to_flags() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_piped_json_parsed() {
        let value = parse_piped(r#"{"revenue": "500"}"#).unwrap().unwrap();
        assert_eq!(value["revenue"], "500");
    }

    #[test]
    fn test_bad_json_reports_source() {
        let err = parse_piped("{not json").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse piped input"));
    }
}
