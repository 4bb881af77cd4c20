//! Timeline command for printing power-state intervals with event counts.
//!
//! This module implements `bh timeline` with human-readable table output
//! and a JSON form for downstream chart tooling.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bh_core::{Analysis, PowerState};
use clap::Args;

use super::util::read_dump;
use crate::Config;

#[derive(Debug, Args)]
pub struct TimelineArgs {
    /// Dump file to analyse (`-` for stdin).
    pub file: PathBuf,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Year for year-less log timestamps.
    #[arg(long)]
    pub year: Option<i32>,

    /// Only show intervals in this state (deep_doze, light_doze, screen_on, other).
    #[arg(long)]
    pub state: Option<PowerState>,
}

pub fn run<W: Write>(writer: &mut W, args: &TimelineArgs, config: &Config) -> Result<()> {
    let text = read_dump(&args.file)?;
    let mut analysis = bh_core::analyze(&text, &config.analysis_config(args.year));
    if let Some(state) = args.state {
        analysis.timeline.intervals.retain(|interval| interval.state == state);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&analysis).context("failed to serialize timeline")?;
        writeln!(writer, "{json}")?;
    } else {
        write!(writer, "{}", format_timeline(&analysis))?;
    }
    Ok(())
}

/// Formats the analysis as a fixed-width table followed by its metadata.
pub fn format_timeline(analysis: &Analysis) -> String {
    let mut output = String::new();
    let timeline = &analysis.timeline;

    if timeline.intervals.is_empty() {
        writeln!(output, "No intervals found.").unwrap();
    } else {
        writeln!(
            output,
            "{:<14}  {:<14}  {:<10}  {:>6}  {:>4}",
            "START", "END", "STATE", "ALARMS", "JOBS"
        )
        .unwrap();
        for interval in &timeline.intervals {
            writeln!(
                output,
                "{}  {}  {:<10}  {:>6}  {:>4}",
                interval.start,
                interval.end,
                interval.state.as_str(),
                interval.alarm_count,
                interval.job_count
            )
            .unwrap();
        }
        if let (Some(min), Some(max)) = (timeline.min_time, timeline.max_time) {
            writeln!(output).unwrap();
            writeln!(output, "Range: {min} - {max}").unwrap();
        }
    }

    writeln!(output, "Reference year: {}", analysis.reference_year).unwrap();
    match analysis.anchor {
        Some(anchor) => writeln!(output, "Anchor: {anchor}").unwrap(),
        None => writeln!(output, "Anchor: none (jobs not correlated)").unwrap(),
    }

    output
}
