//! Core logic for battery dump analysis.
//!
//! This crate turns a plain-text Android diagnostic dump into:
//! - Timeline: non-overlapping deep doze, light doze, screen-on and gap intervals
//! - Correlation: wakeup alarm and scheduled job counts per interval
//! - Chart series: count bars at interval midpoints with axis bounds

pub mod anchor;
pub mod chart;
pub mod correlate;
mod extract;
mod pipeline;
pub mod selector;
pub mod time;
mod timestamp;
mod types;

pub use anchor::{DEFAULT_ANCHOR_OFFSET_HOURS, resolve_anchor};
pub use chart::{BarPoint, ChartSeries};
pub use correlate::{count_alarms, count_jobs};
pub use extract::extract_intervals;
pub use pipeline::{Analysis, AnalysisConfig, analyze};
pub use selector::select_lines;
pub use time::TimeError;
pub use timestamp::LogTimestamp;
pub use types::{Interval, LogLine, PowerState, Timeline};
