//! Timestamps and time ranges
//!
//! Both query languages want ISO-8601 timestamps. A timestamp without an
//! offset is taken to be UTC and rendered with a trailing `Z`; a timestamp with
//! an offset keeps it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::query::error::{QueryError, QueryResult};

/// A point in time, with or without a UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timestamp {
    /// No offset; treated as UTC
    Naive(NaiveDateTime),
    /// Carries its own offset
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Whether the timestamp carries an explicit offset
    pub fn is_aware(&self) -> bool {
        matches!(self, Self::Aware(_))
    }

    /// Parse an ISO-8601 timestamp.
    ///
    /// Accepts RFC 3339 (with offset or `Z`), `YYYY-MM-DDTHH:MM:SS[.f]`,
    /// the same with a space separator, and a bare `YYYY-MM-DD` (midnight).
    pub fn parse(input: &str) -> QueryResult<Self> {
        let input = input.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self::Aware(dt));
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
                return Ok(Self::Naive(dt));
            }
        }

        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self::Naive)
            .ok_or_else(|| QueryError::InvalidTimestamp(input.to_string()))
    }
}

/// Render a timestamp the way both query languages expect it.
///
/// `2026-02-01T00:00:00Z` for naive input, `2026-02-01T00:00:00+02:00` for
/// aware input. Microseconds are only written when non-zero, and offset
/// seconds only when the offset is not a whole number of minutes.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_string()
}

fn write_datetime(f: &mut fmt::Formatter<'_>, dt: &NaiveDateTime) -> fmt::Result {
    write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S"))?;
    let micros = (dt.nanosecond() % 1_000_000_000) / 1_000;
    if micros != 0 {
        write!(f, ".{:06}", micros)?;
    }
    Ok(())
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive(dt) => {
                write_datetime(f, dt)?;
                write!(f, "Z")
            }
            Self::Aware(dt) => {
                write_datetime(f, &dt.naive_local())?;
                // seconds only for offsets that are not whole minutes
                let offset = if dt.offset().local_minus_utc() % 60 == 0 {
                    "%:z"
                } else {
                    "%::z"
                };
                write!(f, "{}", dt.format(offset))
            }
        }
    }
}

impl FromStr for Timestamp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::Aware(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Aware(dt.with_timezone(&Utc.fix()))
    }
}

impl From<DateTime<Local>> for Timestamp {
    fn from(dt: DateTime<Local>) -> Self {
        Self::Aware(dt.with_timezone(&dt.offset().fix()))
    }
}

/// Half-open time range: `start` inclusive, `end` exclusive.
///
/// The bounds are not checked against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start timestamp (inclusive)
    pub start: Timestamp,
    /// End timestamp (exclusive)
    pub end: Timestamp,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: impl Into<Timestamp>, end: impl Into<Timestamp>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The whole UTC day `year-month-day`, as naive timestamps
    pub fn day(year: i32, month: u32, day: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
        let end = start + chrono::Duration::days(1);
        Some(Self::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn naive(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_naive_timestamp_gets_z() {
        let ts = Timestamp::from(naive(2026, 2, 1));
        assert_eq!(format_timestamp(&ts), "2026-02-01T00:00:00Z");
    }

    #[test]
    fn test_aware_timestamp_keeps_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = tz.with_ymd_and_hms(2026, 2, 1, 12, 30, 0).unwrap();
        let rendered = format_timestamp(&dt.into());

        assert_eq!(rendered, "2026-02-01T12:30:00+02:00");
        assert!(!rendered.ends_with('Z'));
    }

    #[test]
    fn test_offset_seconds_are_kept() {
        let tz = FixedOffset::east_opt(3600 + 1).unwrap();
        let dt = tz.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(Timestamp::from(dt).to_string(), "2026-02-01T00:00:00+01:00:01");

        let tz = FixedOffset::west_opt(5 * 3600 + 30 * 60 + 15).unwrap();
        let dt = tz.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(Timestamp::from(dt).to_string(), "2026-02-01T00:00:00-05:30:15");
    }

    #[test]
    fn test_utc_datetime_renders_zero_offset() {
        let dt = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(Timestamp::from(dt).to_string(), "2026-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_microseconds_only_when_present() {
        let dt = naive(2026, 2, 1)
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(Timestamp::from(dt).to_string(), "2026-02-01T00:00:00.123456Z");

        let dt = naive(2026, 2, 1).with_nanosecond(999).unwrap();
        assert_eq!(Timestamp::from(dt).to_string(), "2026-02-01T00:00:00Z");
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(
            Timestamp::parse("2026-02-01T00:00:00").unwrap(),
            Timestamp::Naive(naive(2026, 2, 1))
        );
        assert_eq!(
            Timestamp::parse("2026-02-01").unwrap(),
            Timestamp::Naive(naive(2026, 2, 1))
        );

        let aware: Timestamp = "2026-02-01T00:00:00-05:00".parse().unwrap();
        assert!(aware.is_aware());
        assert_eq!(aware.to_string(), "2026-02-01T00:00:00-05:00");

        let zulu: Timestamp = "2026-02-01T00:00:00Z".parse().unwrap();
        assert_eq!(zulu.to_string(), "2026-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            Timestamp::parse("yesterday"),
            Err(QueryError::InvalidTimestamp("yesterday".to_string()))
        );
    }

    #[test]
    fn test_time_range_day() {
        let range = TimeRange::day(2026, 2, 1).unwrap();
        assert_eq!(range.start.to_string(), "2026-02-01T00:00:00Z");
        assert_eq!(range.end.to_string(), "2026-02-02T00:00:00Z");

        assert!(TimeRange::day(2026, 2, 30).is_none());
    }
}
