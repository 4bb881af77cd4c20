//! Core type definitions for the power-state timeline.

use std::fmt;

use serde::Serialize;

use crate::timestamp::{LogTimestamp, TIMESTAMP_WIDTH};

/// Device power state covered by a timeline interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Deep doze (device idle, `[DEEP]` controller tier).
    DeepDoze,
    /// Light doze (`[LIGHT]` controller tier).
    LightDoze,
    /// Screen on, between a wake and the next sleep.
    ScreenOn,
    /// Gap between a closed state and the next opened one.
    Other,
}

impl PowerState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DeepDoze => "deep_doze",
            Self::LightDoze => "light_doze",
            Self::ScreenOn => "screen_on",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PowerState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deep_doze" => Ok(Self::DeepDoze),
            "light_doze" => Ok(Self::LightDoze),
            "screen_on" => Ok(Self::ScreenOn),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid power state: {s}")),
        }
    }
}

/// A half-open span `[start, end)` spent in one power state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: LogTimestamp,
    pub end: LogTimestamp,
    pub state: PowerState,
    /// Wakeup alarms that fired inside the span.
    pub alarm_count: u32,
    /// Scheduled jobs that started inside the span.
    pub job_count: u32,
}

impl Interval {
    /// Creates an interval with zeroed event counts.
    pub const fn new(start: LogTimestamp, end: LogTimestamp, state: PowerState) -> Self {
        Self {
            start,
            end,
            state,
            alarm_count: 0,
            job_count: 0,
        }
    }
}

/// Intervals produced by one extraction, plus the range they cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timeline {
    /// Chronological, non-overlapping intervals.
    pub intervals: Vec<Interval>,
    /// Earliest interval start, `None` when no interval was emitted.
    pub min_time: Option<LogTimestamp>,
    /// Latest interval end, `None` when no interval was emitted.
    pub max_time: Option<LogTimestamp>,
}

/// One logcat line split into its timestamp prefix and message.
///
/// The prefix is kept as text; it is only parsed once a marker matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub timestamp: &'a str,
    pub message: &'a str,
}

impl<'a> LogLine<'a> {
    /// Splits off the fixed-width prefix. The character following it
    /// (the `.` before milliseconds) is not part of either field.
    pub fn split(line: &'a str) -> Option<Self> {
        let timestamp = line.get(..TIMESTAMP_WIDTH)?;
        let message = line.get(TIMESTAMP_WIDTH + 1..).unwrap_or("");
        Some(Self { timestamp, message })
    }
}
