//! Year-less log timestamps.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::time::{self, TimeError};

/// Width of the `MM-DD HH:MM:SS` prefix on every logcat line.
pub const TIMESTAMP_WIDTH: usize = 14;

/// Placeholder year; a leap year so that `02-29` stays representable.
const PLACEHOLDER_YEAR: i32 = 2000;

const DISPLAY_FORMAT: &str = "%m-%d %H:%M:%S";

/// An instant written as `MM-DD HH:MM:SS`, without a year.
///
/// Ordering is chronological. A timestamp read after the log crossed into a
/// new year carries a year offset, so it sorts after everything in the
/// year before. The text form has no year and does not keep the offset.
/// Use [`Self::to_datetime`] to place it on the calendar once a year is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogTimestamp {
    // Field order matters for the derived `Ord`.
    year_offset: u16,
    at: NaiveDateTime,
}

impl LogTimestamp {
    /// Parses the fixed-width `MM-DD HH:MM:SS` form.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let invalid = || TimeError::InvalidTimestamp {
            value: s.to_string(),
        };
        if s.len() != TIMESTAMP_WIDTH {
            return Err(invalid());
        }

        let (date, clock) = s.split_once(' ').ok_or_else(invalid)?;
        let (month, day) = date.split_once('-').ok_or_else(invalid)?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;

        let date = NaiveDate::from_ymd_opt(PLACEHOLDER_YEAR, month, day).ok_or_else(invalid)?;
        let clock = NaiveTime::parse_from_str(clock, "%H:%M:%S").map_err(|_| invalid())?;
        Ok(Self {
            year_offset: 0,
            at: date.and_time(clock),
        })
    }

    /// Drops the year (and sub-second precision) of a calendar instant.
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        let truncated = dt.with_nanosecond(0).unwrap_or(*dt);
        // Every month-day pair exists in the leap placeholder year.
        Self {
            year_offset: 0,
            at: truncated.with_year(PLACEHOLDER_YEAR).unwrap_or(truncated),
        }
    }

    /// Years between the first year of the log and this timestamp.
    pub const fn year_offset(self) -> u16 {
        self.year_offset
    }

    /// The same month, day and time, `years` after the first year of the log.
    #[must_use]
    pub const fn with_year_offset(self, years: u16) -> Self {
        Self {
            year_offset: years,
            at: self.at,
        }
    }

    /// Time from `earlier` to `self` on the month-day clock, ignoring year offsets.
    pub fn clock_since(self, earlier: Self) -> Duration {
        self.at.signed_duration_since(earlier.at)
    }

    /// Places the timestamp in `year`, the year the log starts in.
    ///
    /// `None` for `02-29` outside leap years.
    pub fn to_datetime(self, year: i32) -> Option<NaiveDateTime> {
        let year = year.checked_add(i32::from(self.year_offset))?;
        self.at.with_year(year)
    }

    /// Encodes as `YY-DDD HH:MM:SS`, counting 365-day years and days from
    /// January 1 of `epoch_year`.
    ///
    /// Timestamps in `epoch_year` itself encode as `00-DDD`, where `DDD` is
    /// the zero-based day of the year.
    pub fn to_year_day(self, epoch_year: i32) -> Result<String, TimeError> {
        let invalid = || TimeError::InvalidTimestamp {
            value: format!("{self} in {epoch_year}"),
        };
        let dt = self.to_datetime(epoch_year).ok_or_else(invalid)?;
        let epoch = year_start(epoch_year).ok_or_else(invalid)?;
        Ok(time::seconds_to_year_day(dt.signed_duration_since(epoch).num_seconds()))
    }

    /// Decodes a year-day string produced by [`Self::to_year_day`] with the
    /// same `epoch_year`. Round trips are exact, leap days included.
    pub fn from_year_day(s: &str, epoch_year: i32) -> Result<Self, TimeError> {
        let invalid = || TimeError::InvalidYearDay {
            value: s.to_string(),
        };
        let seconds = time::year_day_to_seconds(s)?;
        let dt = Duration::try_seconds(seconds)
            .zip(year_start(epoch_year))
            .and_then(|(offset, epoch)| epoch.checked_add_signed(offset))
            .ok_or_else(invalid)?;
        let year_offset = u16::try_from(dt.year() - epoch_year).map_err(|_| invalid())?;
        Ok(Self::from_datetime(&dt).with_year_offset(year_offset))
    }
}

fn year_start(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1).map(|date| date.and_time(NaiveTime::MIN))
}

impl fmt::Display for LogTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.at.format(DISPLAY_FORMAT))
    }
}

impl FromStr for LogTimestamp {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LogTimestamp {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LogTimestamp> for String {
    fn from(ts: LogTimestamp) -> Self {
        ts.to_string()
    }
}
