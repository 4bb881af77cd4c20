//! Chart command for exporting count bars and axis bounds.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bh_core::ChartSeries;
use clap::Args;

use super::util::read_dump;
use crate::Config;

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Dump file to analyse (`-` for stdin).
    pub file: PathBuf,

    /// Year for year-less log timestamps.
    #[arg(long)]
    pub year: Option<i32>,
}

pub fn run<W: Write>(writer: &mut W, args: &ChartArgs, config: &Config) -> Result<()> {
    let text = read_dump(&args.file)?;
    let analysis = bh_core::analyze(&text, &config.analysis_config(args.year));
    let series = ChartSeries::from_timeline(&analysis.timeline, analysis.reference_year);

    let json = serde_json::to_string_pretty(&series).context("failed to serialize chart series")?;
    writeln!(writer, "{json}")?;
    Ok(())
}
