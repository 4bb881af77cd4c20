//! Resolution of the absolute time a dump's relative offsets count from.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime};
use regex::Regex;

/// Correction applied to the recorded start time.
///
/// The field is written in UTC while the logcat timestamps are local time
/// on the devices these dumps come from (UTC+9).
pub const DEFAULT_ANCHOR_OFFSET_HOURS: i64 = 9;

static BATTERY_USAGE_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"battery usage start=(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\.\d{3}").unwrap()
});

/// Finds the first `battery usage start=` marker and shifts it by `offset_hours`.
///
/// Returns `None` when the marker is missing or unparseable; job
/// correlation is then unavailable, which is not an error.
pub fn resolve_anchor(text: &str, offset_hours: i64) -> Option<NaiveDateTime> {
    let Some(caps) = BATTERY_USAGE_START_RE.captures(text) else {
        tracing::debug!("no battery usage start marker");
        return None;
    };
    let raw = &caps[1];

    let start = match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        Ok(start) => start,
        Err(err) => {
            tracing::warn!(value = raw, error = %err, "invalid battery usage start");
            return None;
        }
    };

    let anchor = Duration::try_hours(offset_hours).and_then(|offset| start.checked_add_signed(offset));
    if anchor.is_none() {
        tracing::warn!(value = raw, offset_hours, "anchor offset out of range");
    }
    anchor
}
