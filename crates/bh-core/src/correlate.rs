//! Attribution of wakeup alarms and scheduled jobs to timeline intervals.
//!
//! Both passes place interval bounds on the calendar using a reference year
//! and credit each event to the first interval whose half-open range
//! `[start, end)` contains it. Events outside every interval are dropped.
//! The search is linear per event, O(events x intervals) overall.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::time::parse_relative_duration;
use crate::timestamp::LogTimestamp;
use crate::types::Interval;

/// Header preceding the wakeup alarm history section of the alarm dump.
pub const ALARM_HISTORY_HEADER: &str = "Wakeup Alarm history";

/// Header preceding the batterystats dump, whose history holds job events.
pub const BATTERYSTATS_HEADER: &str = "DUMP OF SERVICE batterystats:";

const JOB_MARKER: &str = "+job=";

static ALARM_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *rtc=(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").unwrap());

/// Lines after the last line containing `header`.
fn section_after<'a>(lines: &[&'a str], header: &str) -> Option<Vec<&'a str>> {
    let index = lines.iter().rposition(|line| line.contains(header))?;
    Some(lines[index + 1..].to_vec())
}

/// Interval bounds on the calendar; `None` where a bound has no date in `year`.
fn calendar_bounds(intervals: &[Interval], year: i32) -> Vec<Option<(NaiveDateTime, NaiveDateTime)>> {
    intervals
        .iter()
        .map(|interval| Some((interval.start.to_datetime(year)?, interval.end.to_datetime(year)?)))
        .collect()
}

/// Index of the first interval containing `at`.
fn locate(bounds: &[Option<(NaiveDateTime, NaiveDateTime)>], at: NaiveDateTime) -> Option<usize> {
    bounds
        .iter()
        .position(|b| b.is_some_and(|(start, end)| start <= at && at < end))
}

/// Credits wakeup alarms from the last alarm history section.
///
/// The section runs until the first line that is not an `rtc=` entry.
/// Alarm dates keep their month, day and time but take `year`, matching
/// how interval bounds are placed. Returns the number of alarms credited.
pub fn count_alarms(intervals: &mut [Interval], text: &str, year: i32) -> usize {
    let lines: Vec<&str> = text.lines().collect();
    let Some(section) = section_after(&lines, ALARM_HISTORY_HEADER) else {
        tracing::debug!("no wakeup alarm history section");
        return 0;
    };

    let bounds = calendar_bounds(intervals, year);
    let mut credited = 0;
    for line in section {
        let Some(caps) = ALARM_LINE_RE.captures(line) else {
            break;
        };
        let raw = &caps[1];
        let at = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .and_then(|dt| LogTimestamp::from_datetime(&dt).to_datetime(year));
        let Some(at) = at else {
            tracing::warn!(value = raw, "invalid alarm time, skipping");
            continue;
        };

        if let Some(index) = locate(&bounds, at) {
            let interval = &mut intervals[index];
            interval.alarm_count = interval.alarm_count.saturating_add(1);
            credited += 1;
        }
    }

    tracing::debug!(credited, "correlated wakeup alarms");
    credited
}

/// Credits `+job=` history entries from the last batterystats section.
///
/// Each entry's leading offset (e.g. `+1h02m03s456ms`) is added to
/// `anchor`. The section ends at the first blank line. Without an anchor
/// nothing is credited. Returns the number of jobs credited.
pub fn count_jobs(
    intervals: &mut [Interval],
    text: &str,
    anchor: Option<NaiveDateTime>,
    year: i32,
) -> usize {
    let Some(anchor) = anchor else {
        tracing::debug!("no log anchor, skipping job correlation");
        return 0;
    };
    let lines: Vec<&str> = text.lines().collect();
    let Some(section) = section_after(&lines, BATTERYSTATS_HEADER) else {
        tracing::debug!("no batterystats section");
        return 0;
    };

    let bounds = calendar_bounds(intervals, year);
    let mut credited = 0;
    for line in section
        .into_iter()
        .take_while(|line| !line.trim().is_empty())
        .filter(|line| line.contains(JOB_MARKER))
    {
        let token = line.split_whitespace().next().unwrap_or_default();
        let token = token.strip_prefix('+').unwrap_or(token);
        let at = match parse_relative_duration(token, anchor) {
            Ok(at) => at,
            Err(err) => {
                tracing::warn!(line, error = %err, "invalid job offset, skipping");
                continue;
            }
        };

        if let Some(index) = locate(&bounds, at) {
            let interval = &mut intervals[index];
            interval.job_count = interval.job_count.saturating_add(1);
            credited += 1;
        }
    }

    tracing::debug!(credited, "correlated scheduled jobs");
    credited
}
