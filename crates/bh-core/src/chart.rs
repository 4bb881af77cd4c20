//! Chart-ready series derived from a correlated timeline.
//!
//! Nothing here renders; it only computes where count bars sit and how
//! tall the count axis must be.

use serde::Serialize;

use crate::time::{self, TimeError};
use crate::timestamp::LogTimestamp;
use crate::types::{Interval, PowerState, Timeline};

/// Event counts for one interval, placed at its midpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarPoint {
    pub at: LogTimestamp,
    pub state: PowerState,
    pub alarm_count: u32,
    pub job_count: u32,
}

/// Series and axis bounds for a timeline chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub bars: Vec<BarPoint>,
    /// Count axis maximum; `None` when every count is zero.
    pub count_ceiling: Option<u64>,
    pub min_time: Option<LogTimestamp>,
    pub max_time: Option<LogTimestamp>,
}

/// Midpoint of an interval, computed on its year-day encoding counted from `year`.
fn midpoint(interval: &Interval, year: i32) -> Result<LogTimestamp, TimeError> {
    let start = interval.start.to_year_day(year)?;
    let end = interval.end.to_year_day(year)?;
    let mid = time::average_instant(&start, &end)?;
    LogTimestamp::from_year_day(&mid, year)
}

impl ChartSeries {
    pub fn from_timeline(timeline: &Timeline, year: i32) -> Self {
        let bars: Vec<BarPoint> = timeline
            .intervals
            .iter()
            .map(|interval| {
                let at = midpoint(interval, year).unwrap_or_else(|err| {
                    tracing::warn!(start = %interval.start, error = %err, "no midpoint, using start");
                    interval.start
                });
                BarPoint {
                    at,
                    state: interval.state,
                    alarm_count: interval.alarm_count,
                    job_count: interval.job_count,
                }
            })
            .collect();

        let peak = bars
            .iter()
            .map(|bar| bar.alarm_count.max(bar.job_count))
            .max()
            .unwrap_or(0);
        let count_ceiling =
            (peak > 0).then(|| time::round_up_to_power_of_ten_magnitude(u64::from(peak)));

        Self {
            bars,
            count_ceiling,
            min_time: timeline.min_time,
            max_time: timeline.max_time,
        }
    }
}
