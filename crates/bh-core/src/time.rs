//! Conversions between the time representations found in battery dumps.
//!
//! Three encodings show up in a dump and in the series handed to charts:
//! - clock-of-day: `HH:MM:SS`
//! - year-day: `YY-DDD HH:MM:SS`, a count of 365-day years plus a day offset
//! - relative duration: `1d02h03m04s005ms`, an offset from a log-wide anchor
//!
//! The year-day codec does not model leap years. That approximation is
//! deliberate and shared by encode and decode, so round trips are exact.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Days in a year for the year-day codec. Leap days are not modelled.
pub const DAYS_PER_YEAR: i64 = 365;

pub const SECONDS_PER_YEAR: i64 = DAYS_PER_YEAR * SECONDS_PER_DAY;

/// Width of the `DDD` field produced by [`seconds_to_year_day`].
const YEAR_DAY_WIDTH: usize = 3;

/// A full relative duration token, every unit optional, in fixed order.
static RELATIVE_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)d)?(?:(\d+)h)?(?:(\d+)m)?(?:(\d+)s)?(?:(\d+)ms)?$").unwrap()
});

/// A token that starts like a duration, used to tell garbage from unit-less input.
static UNIT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:ms|d|h|m|s)").unwrap());

/// Milliseconds per capture group of [`RELATIVE_DURATION_RE`].
const UNIT_MILLIS: [(usize, i64); 5] = [
    (1, 86_400_000),
    (2, 3_600_000),
    (3, 60_000),
    (4, 1_000),
    (5, 1),
];

/// Errors from decoding or shifting time values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid clock time: {value}")]
    InvalidClock { value: String },

    #[error("invalid year-day time: {value}")]
    InvalidYearDay { value: String },

    #[error("invalid log timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[error("invalid relative duration: {value}")]
    InvalidDuration { value: String },

    #[error("time arithmetic overflow: {value}")]
    Overflow { value: String },
}

fn overflow(value: &str) -> TimeError {
    TimeError::Overflow {
        value: value.to_string(),
    }
}

/// Numeric `HH:MM:SS` fields; `None` when the shape or a field is wrong.
fn clock_fields(s: &str) -> Option<[i64; 3]> {
    let mut parts = s.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    Some([hours.parse().ok()?, minutes.parse().ok()?, seconds.parse().ok()?])
}

fn fields_to_seconds([hours, minutes, seconds]: [i64; 3]) -> Option<i64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Converts `HH:MM:SS` to seconds since midnight.
///
/// Fields are only checked to be numeric; `25:61:00` is accepted.
pub fn clock_to_seconds(s: &str) -> Result<i64, TimeError> {
    let fields = clock_fields(s).ok_or_else(|| TimeError::InvalidClock {
        value: s.to_string(),
    })?;
    fields_to_seconds(fields).ok_or_else(|| overflow(s))
}

/// Converts seconds since midnight to `HH:MM:SS`.
///
/// Hours are not wrapped at 24; keep `n` within a day for sane output.
pub fn seconds_to_clock(n: i64) -> String {
    format!("{:02}:{:02}:{:02}", n / 3600, (n % 3600) / 60, n % 60)
}

/// Converts `YY-DDD HH:MM:SS` to seconds, counting `YY` as 365-day years.
pub fn year_day_to_seconds(s: &str) -> Result<i64, TimeError> {
    let invalid = || TimeError::InvalidYearDay {
        value: s.to_string(),
    };

    let (year_day, clock) = s.split_once(' ').ok_or_else(invalid)?;
    let (years, days) = year_day.split_once('-').ok_or_else(invalid)?;
    let years: i64 = years.parse().map_err(|_| invalid())?;
    let days: i64 = days.parse().map_err(|_| invalid())?;
    let clock = clock_fields(clock).ok_or_else(invalid)?;

    years
        .checked_mul(DAYS_PER_YEAR)
        .and_then(|d| d.checked_add(days))
        .and_then(|d| d.checked_mul(SECONDS_PER_DAY))
        .zip(fields_to_seconds(clock))
        .and_then(|(d, c)| d.checked_add(c))
        .ok_or_else(|| overflow(s))
}

fn format_year_day(n: i64, day_width: usize) -> String {
    let years = n / SECONDS_PER_YEAR;
    let remainder = n % SECONDS_PER_YEAR;
    let days = remainder / SECONDS_PER_DAY;
    let clock = seconds_to_clock(remainder % SECONDS_PER_DAY);
    format!("{years:02}-{days:0day_width$} {clock}")
}

/// Converts seconds back to `YY-DDD HH:MM:SS`, the inverse of [`year_day_to_seconds`].
pub fn seconds_to_year_day(n: i64) -> String {
    format_year_day(n, YEAR_DAY_WIDTH)
}

/// Returns the floored midpoint of two instants in the encoding they share.
///
/// Inputs containing a space are decoded as year-day strings and the result
/// keeps the day-field width of `a`; anything else is a clock-of-day string.
pub fn average_instant(a: &str, b: &str) -> Result<String, TimeError> {
    if let Some((year_day, _)) = a.split_once(' ') {
        let day_width = year_day.split_once('-').map_or(YEAR_DAY_WIDTH, |(_, d)| d.len());
        let sum = year_day_to_seconds(a)?
            .checked_add(year_day_to_seconds(b)?)
            .ok_or_else(|| overflow(a))?;
        Ok(format_year_day(sum.div_euclid(2), day_width))
    } else {
        let sum = clock_to_seconds(a)?
            .checked_add(clock_to_seconds(b)?)
            .ok_or_else(|| overflow(a))?;
        Ok(seconds_to_clock(sum.div_euclid(2)))
    }
}

/// Adds a relative duration such as `1d02h03m04s005ms` to `base`.
///
/// Every unit is optional but units must appear in the order above and the
/// whole token must be consumed, so `250ms` is never read as 250 minutes.
/// A token that does not start with any `<digits><unit>` pair (e.g. `0`)
/// is accepted as a zero offset and returns `base` unchanged.
pub fn parse_relative_duration(s: &str, base: NaiveDateTime) -> Result<NaiveDateTime, TimeError> {
    let Some(caps) = RELATIVE_DURATION_RE.captures(s) else {
        if UNIT_PREFIX_RE.is_match(s) {
            return Err(TimeError::InvalidDuration {
                value: s.to_string(),
            });
        }
        tracing::debug!(token = s, "duration has no unit tokens, using zero offset");
        return Ok(base);
    };

    let mut total_ms: i64 = 0;
    for (group, unit_ms) in UNIT_MILLIS {
        let Some(m) = caps.get(group) else {
            continue;
        };
        let n: i64 = m.as_str().parse().map_err(|_| overflow(s))?;
        total_ms = n
            .checked_mul(unit_ms)
            .and_then(|ms| total_ms.checked_add(ms))
            .ok_or_else(|| overflow(s))?;
    }

    let offset = Duration::try_milliseconds(total_ms).ok_or_else(|| overflow(s))?;
    base.checked_add_signed(offset).ok_or_else(|| overflow(s))
}

/// Rounds `n` up to the next multiple of ten raised to its order of magnitude.
///
/// `47 -> 50`, `470 -> 500`, `100 -> 100`. Zero has no magnitude and is returned as is.
pub fn round_up_to_power_of_ten_magnitude(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    let factor = 10_u64.pow(n.ilog10());
    n.div_ceil(factor).saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 24)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn clock_round_trip() {
        for clock in ["00:00:00", "09:05:07", "12:30:59", "23:59:59"] {
            assert_eq!(seconds_to_clock(clock_to_seconds(clock).unwrap()), clock);
        }
    }

    #[test]
    fn clock_to_seconds_values() {
        assert_eq!(clock_to_seconds("01:02:03").unwrap(), 3723);
        assert_eq!(clock_to_seconds("25:61:00").unwrap(), 25 * 3600 + 61 * 60);
    }

    #[test]
    fn clock_to_seconds_rejects_garbage() {
        assert!(matches!(
            clock_to_seconds("12:xx:00"),
            Err(TimeError::InvalidClock { .. })
        ));
        assert!(clock_to_seconds("12:00").is_err());
        assert!(clock_to_seconds("12:00:00:00").is_err());
    }

    #[test]
    fn year_day_round_trip() {
        for value in ["00-000 00:00:00", "24-005 12:00:00", "08-024 23:59:59", "99-364 01:02:03"] {
            assert_eq!(seconds_to_year_day(year_day_to_seconds(value).unwrap()), value);
        }
    }

    #[test]
    fn year_day_uses_365_day_years() {
        assert_eq!(
            year_day_to_seconds("01-000 00:00:00").unwrap(),
            365 * SECONDS_PER_DAY
        );
        assert_eq!(seconds_to_year_day(365 * SECONDS_PER_DAY), "01-000 00:00:00");
    }

    #[test]
    fn year_day_rejects_garbage() {
        assert!(matches!(
            year_day_to_seconds("08-24T00:00:00"),
            Err(TimeError::InvalidYearDay { .. })
        ));
        assert!(year_day_to_seconds("0824 00:00:00").is_err());
    }

    #[test]
    fn oversized_fields_overflow_instead_of_wrapping() {
        assert!(matches!(
            clock_to_seconds("3000000000000000:00:00"),
            Err(TimeError::Overflow { .. })
        ));
        assert!(matches!(
            year_day_to_seconds("99999999999999999-000 00:00:00"),
            Err(TimeError::Overflow { .. })
        ));
        assert!(matches!(
            year_day_to_seconds("00-000 3000000000000000:00:00"),
            Err(TimeError::Overflow { .. })
        ));
    }

    #[test]
    fn average_instant_overflow_is_an_error() {
        let big = "2000000000000000:00:00";
        assert!(clock_to_seconds(big).is_ok());
        assert!(matches!(
            average_instant(big, big),
            Err(TimeError::Overflow { .. })
        ));
        let big_year_day = "200000000000-000 00:00:00";
        assert!(year_day_to_seconds(big_year_day).is_ok());
        assert!(matches!(
            average_instant(big_year_day, big_year_day),
            Err(TimeError::Overflow { .. })
        ));
    }

    #[test]
    fn average_instant_is_idempotent() {
        for value in ["08-24 00:15:00", "24-005 12:00:00", "07:30:00"] {
            assert_eq!(average_instant(value, value).unwrap(), value);
        }
    }

    #[test]
    fn average_instant_floors_the_midpoint() {
        assert_eq!(average_instant("00:00:00", "00:00:03").unwrap(), "00:00:01");
        assert_eq!(
            average_instant("08-24 23:00:00", "08-25 01:00:00").unwrap(),
            "08-25 00:00:00"
        );
    }

    #[test]
    fn relative_duration_full_token() {
        let shifted = parse_relative_duration("1d02h03m04s005ms", base()).unwrap();
        let expected = base()
            + Duration::days(1)
            + Duration::hours(2)
            + Duration::minutes(3)
            + Duration::seconds(4)
            + Duration::milliseconds(5);
        assert_eq!(shifted, expected);
    }

    #[test]
    fn relative_duration_partial_token() {
        let shifted = parse_relative_duration("3m20s", base()).unwrap();
        assert_eq!(shifted, base() + Duration::seconds(200));
    }

    #[test]
    fn relative_duration_milliseconds_are_not_minutes() {
        let shifted = parse_relative_duration("250ms", base()).unwrap();
        assert_eq!(shifted, base() + Duration::milliseconds(250));
    }

    #[test]
    fn relative_duration_without_units_is_zero_offset() {
        assert_eq!(parse_relative_duration("0", base()).unwrap(), base());
        assert_eq!(parse_relative_duration("", base()).unwrap(), base());
        assert_eq!(parse_relative_duration("abc", base()).unwrap(), base());
    }

    #[test]
    fn relative_duration_rejects_trailing_garbage() {
        assert!(matches!(
            parse_relative_duration("5m3x", base()),
            Err(TimeError::InvalidDuration { .. })
        ));
        assert!(parse_relative_duration("1h1d", base()).is_err());
    }

    #[test]
    fn relative_duration_overflow_is_an_error() {
        assert!(matches!(
            parse_relative_duration("99999999999999999999d", base()),
            Err(TimeError::Overflow { .. })
        ));
    }

    #[test]
    fn round_up_examples() {
        assert_eq!(round_up_to_power_of_ten_magnitude(47), 50);
        assert_eq!(round_up_to_power_of_ten_magnitude(470), 500);
        assert_eq!(round_up_to_power_of_ten_magnitude(100), 100);
        assert_eq!(round_up_to_power_of_ten_magnitude(7), 7);
        assert_eq!(round_up_to_power_of_ten_magnitude(101), 200);
    }
}
