//! Anchor command for showing the time job offsets count from.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::util::read_dump;
use crate::Config;

#[derive(Debug, Args)]
pub struct AnchorArgs {
    /// Dump file to analyse (`-` for stdin).
    pub file: PathBuf,
}

pub fn run<W: Write>(writer: &mut W, args: &AnchorArgs, config: &Config) -> Result<()> {
    let text = read_dump(&args.file)?;

    match bh_core::resolve_anchor(&text, config.anchor_offset_hours) {
        Some(anchor) => writeln!(writer, "{anchor}")?,
        None => writeln!(writer, "No anchor found.")?,
    }
    Ok(())
}
