//! One-call analysis of a full diagnostic dump.

use chrono::{Datelike, Local, NaiveDateTime};
use serde::Serialize;

use crate::anchor::{DEFAULT_ANCHOR_OFFSET_HOURS, resolve_anchor};
use crate::correlate::{count_alarms, count_jobs};
use crate::extract::extract_intervals;
use crate::selector::select_lines;
use crate::types::Timeline;

/// Configuration for an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Hours added to the `battery usage start` marker. Default: 9.
    pub anchor_offset_hours: i64,

    /// Year used to place year-less log timestamps on the calendar.
    /// Default: the anchor's year, else the current local year.
    pub reference_year: Option<i32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            anchor_offset_hours: DEFAULT_ANCHOR_OFFSET_HOURS,
            reference_year: None,
        }
    }
}

/// Result of analysing one dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub timeline: Timeline,
    pub anchor: Option<NaiveDateTime>,
    pub reference_year: i32,
    /// Alarms credited to some interval.
    pub alarms_credited: usize,
    /// Jobs credited to some interval.
    pub jobs_credited: usize,
}

fn reference_year(config: &AnalysisConfig, anchor: Option<NaiveDateTime>) -> i32 {
    config
        .reference_year
        .or_else(|| anchor.map(|a| a.year()))
        .unwrap_or_else(|| Local::now().year())
}

/// Runs selection, extraction, anchor resolution and both correlation passes.
///
/// Never fails: missing sections and malformed lines only reduce what is
/// found.
pub fn analyze(text: &str, config: &AnalysisConfig) -> Analysis {
    let lines = select_lines(text);
    let mut timeline = extract_intervals(&lines);

    let anchor = resolve_anchor(text, config.anchor_offset_hours);
    let year = reference_year(config, anchor);

    let alarms_credited = count_alarms(&mut timeline.intervals, text, year);
    let jobs_credited = count_jobs(&mut timeline.intervals, text, anchor, year);

    tracing::info!(
        lines = lines.len(),
        intervals = timeline.intervals.len(),
        alarms_credited,
        jobs_credited,
        year,
        "analysis complete"
    );

    Analysis {
        timeline,
        anchor,
        reference_year: year,
        alarms_credited,
        jobs_credited,
    }
}
