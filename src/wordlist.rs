//! Wordlist loading.
//!
//! One term per line, UTF-8, with an optional byte-order mark. Terms are
//! trimmed; a blank line makes the empty string a term.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

const BOM: char = '\u{feff}';

pub fn load_wordlist(path: &Path) -> Result<HashSet<String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            anyhow::bail!("Wordlist file not found: {}", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read wordlist: {}", path.display()))
        }
    };
    Ok(parse_wordlist(&content))
}

pub fn parse_wordlist(content: &str) -> HashSet<String> {
    content
        .strip_prefix(BOM)
        .unwrap_or(content)
        .lines()
        .map(str::trim)
        .map(str::to_string)
        .collect()
}
