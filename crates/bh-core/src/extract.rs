//! Power-state interval extraction.
//!
//! # Algorithm Summary
//!
//! 1. Each marker family (deep doze, light doze, screen on) keeps its own
//!    pending open timestamp; an open marker overwrites it, a close marker
//!    emits `[open, close)` only when one is pending
//! 2. A single gap cursor remembers the end of the last closed interval;
//!    the next open marker of any family fills `[cursor, open)` with
//!    [`PowerState::Other`]
//! 3. Emission clips intervals that would overlap the previous one and
//!    drops empty spans, so output is chronological and non-overlapping
//!
//! A family still open when the log ends produces no interval. Timestamps
//! carry no year, so a marker whose clock jumps back by more than half a
//! year (December to January) starts the next year of the log.

use chrono::Duration;

use crate::timestamp::LogTimestamp;
use crate::types::{Interval, LogLine, PowerState, Timeline};

/// Entering deep idle.
const DEEP_OPEN: &[&str] = &[
    "[DEEP] QUICK_DOZE_DELAY to IDLE",
    "[DEEP] IDLE_MAINTENANCE to IDLE",
];

/// Leaving deep idle.
const DEEP_CLOSE: &[&str] = &["[DEEP] IDLE to ACTIVE", "[DEEP] IDLE to IDLE_MAINTENANCE"];

const LIGHT_OPEN: &[&str] = &["[LIGHT] INACTIVE to IDLE"];

/// Any transition out of light idle.
const LIGHT_CLOSE: &[&str] = &["[LIGHT] IDLE to"];

const SCREEN_OPEN: &[&str] = &["PowerManagerService: Waking"];

const SCREEN_CLOSE: &[&str] = &[
    "PowerManagerService: [api] goToSleep",
    "PowerManagerService: Going to sleep",
];

/// Backward clock jump, in days, read as crossing into the next year.
const ROLLOVER_DAYS: i64 = 183;

/// An independent family of open/close markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Deep,
    Light,
    Screen,
}

impl Family {
    /// Rule priority: families are tried in this order, open before close.
    const ALL: [Self; 3] = [Self::Deep, Self::Light, Self::Screen];

    const fn open_markers(self) -> &'static [&'static str] {
        match self {
            Self::Deep => DEEP_OPEN,
            Self::Light => LIGHT_OPEN,
            Self::Screen => SCREEN_OPEN,
        }
    }

    const fn close_markers(self) -> &'static [&'static str] {
        match self {
            Self::Deep => DEEP_CLOSE,
            Self::Light => LIGHT_CLOSE,
            Self::Screen => SCREEN_CLOSE,
        }
    }

    const fn state(self) -> PowerState {
        match self {
            Self::Deep => PowerState::DeepDoze,
            Self::Light => PowerState::LightDoze,
            Self::Screen => PowerState::ScreenOn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Open,
    Close,
}

fn contains_any(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| message.contains(marker))
}

/// Scan state for one extraction.
#[derive(Debug, Default)]
struct Extractor {
    deep_open: Option<LogTimestamp>,
    light_open: Option<LogTimestamp>,
    screen_open: Option<LogTimestamp>,
    /// End of the most recently closed interval, pending a gap fill.
    last_close: Option<LogTimestamp>,
    /// Latest marker timestamp, for year rollover detection.
    latest: Option<LogTimestamp>,
    year_offset: u16,
    intervals: Vec<Interval>,
}

impl Extractor {
    const fn pending(&self, family: Family) -> Option<LogTimestamp> {
        match family {
            Family::Deep => self.deep_open,
            Family::Light => self.light_open,
            Family::Screen => self.screen_open,
        }
    }

    const fn pending_mut(&mut self, family: Family) -> &mut Option<LogTimestamp> {
        match family {
            Family::Deep => &mut self.deep_open,
            Family::Light => &mut self.light_open,
            Family::Screen => &mut self.screen_open,
        }
    }

    /// Finds the first rule that fires for `message`.
    ///
    /// A close marker only fires while its family is open; otherwise the
    /// remaining rules are still tried.
    fn transition(&self, message: &str) -> Option<(Family, Edge)> {
        Family::ALL.into_iter().find_map(|family| {
            if contains_any(message, family.open_markers()) {
                Some((family, Edge::Open))
            } else if self.pending(family).is_some() && contains_any(message, family.close_markers())
            {
                Some((family, Edge::Close))
            } else {
                None
            }
        })
    }

    fn feed(&mut self, raw: &str) {
        let Some(line) = LogLine::split(raw) else {
            tracing::warn!(line = raw, "line too short for a timestamp, skipping");
            return;
        };
        let Some((family, edge)) = self.transition(line.message) else {
            return;
        };
        let at = match LogTimestamp::parse(line.timestamp) {
            Ok(at) => self.place(at),
            Err(err) => {
                tracing::warn!(line = raw, error = %err, "unparseable marker timestamp, skipping");
                return;
            }
        };

        match edge {
            Edge::Open => self.open(family, at),
            Edge::Close => self.close(family, at),
        }
    }

    /// Gives `parsed` the current year offset, advancing it on a rollover.
    fn place(&mut self, parsed: LogTimestamp) -> LogTimestamp {
        let mut at = parsed.with_year_offset(self.year_offset);
        let rollover = Duration::days(ROLLOVER_DAYS);
        if let Some(latest) = self.latest.filter(|latest| latest.clock_since(at) > rollover) {
            self.year_offset = self.year_offset.saturating_add(1);
            at = parsed.with_year_offset(self.year_offset);
            tracing::debug!(%latest, %at, year_offset = self.year_offset, "log crossed into a new year");
        }
        self.latest = Some(at);
        at
    }

    fn open(&mut self, family: Family, at: LogTimestamp) {
        if let Some(gap_start) = self.last_close.take() {
            self.emit(gap_start, at, PowerState::Other);
        }
        if let Some(previous) = self.pending_mut(family).replace(at) {
            tracing::debug!(?family, %previous, %at, "open marker replaces pending open");
        }
    }

    fn close(&mut self, family: Family, at: LogTimestamp) {
        if let Some(start) = self.pending_mut(family).take() {
            self.emit(start, at, family.state());
            self.last_close = Some(at);
        }
    }

    fn emit(&mut self, start: LogTimestamp, end: LogTimestamp, state: PowerState) {
        let start = match self.intervals.last() {
            Some(previous) if previous.end > start => previous.end,
            _ => start,
        };
        if start >= end {
            tracing::debug!(%start, %end, %state, "dropping empty interval");
            return;
        }
        self.intervals.push(Interval::new(start, end, state));
    }

    fn finish(self) -> Timeline {
        for family in Family::ALL {
            if let Some(open) = self.pending(family) {
                tracing::debug!(?family, %open, "family still open at end of log, dropped");
            }
        }

        let min_time = self.intervals.first().map(|i| i.start);
        let max_time = self.intervals.last().map(|i| i.end);
        Timeline {
            intervals: self.intervals,
            min_time,
            max_time,
        }
    }
}

/// Builds the power-state timeline from selected log lines.
///
/// Lines without a recognised marker are ignored, as are close markers
/// with nothing open.
pub fn extract_intervals<S: AsRef<str>>(lines: &[S]) -> Timeline {
    let mut extractor = Extractor::default();
    for line in lines {
        extractor.feed(line.as_ref());
    }
    let timeline = extractor.finish();
    tracing::debug!(intervals = timeline.intervals.len(), "extracted timeline");
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> LogTimestamp {
        LogTimestamp::parse(s).unwrap()
    }

    fn line(time: &str, message: &str) -> String {
        format!("08-24 {time}.000  1000  1100 I {message}")
    }

    fn spans(timeline: &Timeline) -> Vec<(String, String, PowerState)> {
        timeline
            .intervals
            .iter()
            .map(|i| (i.start.to_string(), i.end.to_string(), i.state))
            .collect()
    }

    fn span(start: &str, end: &str, state: PowerState) -> (String, String, PowerState) {
        (start.to_string(), end.to_string(), state)
    }

    #[test]
    fn single_deep_doze_pair() {
        let lines = [
            "08-24 00:00:00.000 DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE",
            "08-24 00:15:00.000 DeviceIdleController: [DEEP] IDLE to ACTIVE",
        ];
        let timeline = extract_intervals(&lines);

        assert_eq!(
            timeline.intervals,
            vec![Interval::new(
                ts("08-24 00:00:00"),
                ts("08-24 00:15:00"),
                PowerState::DeepDoze
            )]
        );
        assert_eq!(timeline.min_time, Some(ts("08-24 00:00:00")));
        assert_eq!(timeline.max_time, Some(ts("08-24 00:15:00")));
    }

    #[test]
    fn every_family_pairs_open_and_close() {
        let lines = [
            line("01:00:00", "DeviceIdleController: [DEEP] IDLE_MAINTENANCE to IDLE"),
            line("01:10:00", "DeviceIdleController: [DEEP] IDLE to IDLE_MAINTENANCE"),
            line("01:10:00", "DeviceIdleController: [LIGHT] INACTIVE to IDLE"),
            line("01:20:00", "DeviceIdleController: [LIGHT] IDLE to IDLE_MAINTENANCE"),
            line("01:20:00", "PowerManagerService: Waking up from Asleep (uid=1000)"),
            line("01:30:00", "PowerManagerService: [api] goToSleep (uid 1000)"),
        ];
        let timeline = extract_intervals(&lines);

        assert_eq!(
            spans(&timeline),
            vec![
                span("08-24 01:00:00", "08-24 01:10:00", PowerState::DeepDoze),
                span("08-24 01:10:00", "08-24 01:20:00", PowerState::LightDoze),
                span("08-24 01:20:00", "08-24 01:30:00", PowerState::ScreenOn),
            ]
        );
    }

    #[test]
    fn gap_between_families_becomes_other() {
        let lines = [
            line("00:00:00", "DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE"),
            line("00:10:00", "DeviceIdleController: [DEEP] IDLE to ACTIVE"),
            line("00:20:00", "DeviceIdleController: [LIGHT] INACTIVE to IDLE"),
            line("00:30:00", "DeviceIdleController: [LIGHT] IDLE to OVERRIDE"),
        ];
        let timeline = extract_intervals(&lines);

        assert_eq!(
            spans(&timeline),
            vec![
                span("08-24 00:00:00", "08-24 00:10:00", PowerState::DeepDoze),
                span("08-24 00:10:00", "08-24 00:20:00", PowerState::Other),
                span("08-24 00:20:00", "08-24 00:30:00", PowerState::LightDoze),
            ]
        );
    }

    #[test]
    fn gap_is_filled_once() {
        let lines = [
            line("00:00:00", "DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE"),
            line("00:10:00", "DeviceIdleController: [DEEP] IDLE to ACTIVE"),
            line("00:20:00", "PowerManagerService: Waking up from Asleep"),
            line("00:25:00", "DeviceIdleController: [LIGHT] INACTIVE to IDLE"),
        ];
        let timeline = extract_intervals(&lines);

        assert_eq!(
            spans(&timeline),
            vec![
                span("08-24 00:00:00", "08-24 00:10:00", PowerState::DeepDoze),
                span("08-24 00:10:00", "08-24 00:20:00", PowerState::Other),
            ]
        );
    }

    #[test]
    fn unmatched_close_is_ignored() {
        let lines = [
            line("00:05:00", "DeviceIdleController: [DEEP] IDLE to ACTIVE"),
            line("00:06:00", "PowerManagerService: Going to sleep due to timeout"),
        ];
        assert!(extract_intervals(&lines).intervals.is_empty());
    }

    #[test]
    fn dangling_open_is_dropped() {
        let lines = [
            line("00:00:00", "DeviceIdleController: [LIGHT] INACTIVE to IDLE"),
            line("00:05:00", "DeviceIdleController: [LIGHT] IDLE to IDLE_MAINTENANCE"),
            line("00:06:00", "DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE"),
        ];
        let timeline = extract_intervals(&lines);

        // The gap [00:05, 00:06) is emitted by the open; the deep span is not.
        assert_eq!(
            spans(&timeline),
            vec![
                span("08-24 00:00:00", "08-24 00:05:00", PowerState::LightDoze),
                span("08-24 00:05:00", "08-24 00:06:00", PowerState::Other),
            ]
        );
        assert_eq!(timeline.max_time, Some(ts("08-24 00:06:00")));
    }

    #[test]
    fn repeated_open_keeps_latest() {
        let lines = [
            line("00:00:00", "DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE"),
            line("00:03:00", "DeviceIdleController: [DEEP] IDLE_MAINTENANCE to IDLE"),
            line("00:09:00", "DeviceIdleController: [DEEP] IDLE to ACTIVE"),
        ];
        assert_eq!(
            spans(&extract_intervals(&lines)),
            vec![span("08-24 00:03:00", "08-24 00:09:00", PowerState::DeepDoze)]
        );
    }

    #[test]
    fn zero_length_spans_are_dropped() {
        let lines = [
            line("00:00:00", "DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE"),
            line("00:00:00", "DeviceIdleController: [DEEP] IDLE to ACTIVE"),
        ];
        assert!(extract_intervals(&lines).intervals.is_empty());
    }

    #[test]
    fn interleaved_families_do_not_overlap() {
        let lines = [
            line("00:00:00", "DeviceIdleController: [LIGHT] INACTIVE to IDLE"),
            line("00:02:00", "DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE"),
            line("00:04:00", "DeviceIdleController: [DEEP] IDLE to ACTIVE"),
            line("00:08:00", "DeviceIdleController: [LIGHT] IDLE to ACTIVE"),
        ];
        let timeline = extract_intervals(&lines);

        assert_eq!(
            spans(&timeline),
            vec![
                span("08-24 00:02:00", "08-24 00:04:00", PowerState::DeepDoze),
                span("08-24 00:04:00", "08-24 00:08:00", PowerState::LightDoze),
            ]
        );
        for pair in timeline.intervals.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn malformed_timestamp_skips_line() {
        let lines = [
            "08-24 00:00:00.000 DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE".to_string(),
            "08-2x 00:05:00.000 DeviceIdleController: [DEEP] IDLE to ACTIVE".to_string(),
            "short DeviceIdleController:".to_string(),
            "08-24 00:10:00.000 DeviceIdleController: [DEEP] IDLE to ACTIVE".to_string(),
        ];
        assert_eq!(
            spans(&extract_intervals(&lines)),
            vec![span("08-24 00:00:00", "08-24 00:10:00", PowerState::DeepDoze)]
        );
    }

    #[test]
    fn span_across_new_year_is_kept() {
        let lines = [
            "12-31 23:50:00.000 DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE",
            "01-01 00:10:00.000 DeviceIdleController: [DEEP] IDLE to ACTIVE",
            "01-01 00:20:00.000 DeviceIdleController: [LIGHT] INACTIVE to IDLE",
            "01-01 00:30:00.000 DeviceIdleController: [LIGHT] IDLE to ACTIVE",
        ];
        let timeline = extract_intervals(&lines);

        assert_eq!(
            spans(&timeline),
            vec![
                span("12-31 23:50:00", "01-01 00:10:00", PowerState::DeepDoze),
                span("01-01 00:10:00", "01-01 00:20:00", PowerState::Other),
                span("01-01 00:20:00", "01-01 00:30:00", PowerState::LightDoze),
            ]
        );
        assert_eq!(timeline.intervals[0].start.year_offset(), 0);
        assert_eq!(timeline.intervals[0].end.year_offset(), 1);
        assert_eq!(timeline.max_time.map(LogTimestamp::year_offset), Some(1));
    }

    #[test]
    fn small_backward_jump_is_not_a_new_year() {
        let lines = [
            line("00:10:00", "DeviceIdleController: [DEEP] QUICK_DOZE_DELAY to IDLE"),
            line("00:09:00", "DeviceIdleController: [DEEP] IDLE to ACTIVE"),
        ];
        assert!(extract_intervals(&lines).intervals.is_empty());
    }

    #[test]
    fn no_markers_yields_empty_timeline() {
        let timeline = extract_intervals(&[line("00:00:00", "DeviceIdleController: stepIdleStateLocked")]);
        assert_eq!(timeline, Timeline::default());
    }
}
