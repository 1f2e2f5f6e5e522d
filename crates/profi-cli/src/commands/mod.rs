pub mod mail;
pub mod password;
pub mod state;
pub mod token;

use std::io::BufRead;

use anyhow::{Context, Result};

/// Returns `value` or, when absent, the first line of stdin.
pub fn value_or_stdin(value: Option<String>, what: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("failed to read {what} from stdin"))?;
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.is_empty() {
        anyhow::bail!("no {what} given");
    }
    Ok(line)
}
