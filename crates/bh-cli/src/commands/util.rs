//! Shared utilities for CLI commands.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Reads a whole dump into memory. `-` reads standard input.
pub fn read_dump(path: &Path) -> Result<String> {
    if path.as_os_str().is_empty() {
        bail!("no dump file given; pass a path or `-` for stdin");
    }
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read dump from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
