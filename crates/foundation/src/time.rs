//! Time primitives.
//!
//! All instants are integer milliseconds since the Unix epoch and all
//! intervals are fixed elapsed durations; nothing here is calendar aware.

use std::fmt;

use ::time::OffsetDateTime;
use ::time::format_description::well_known::Rfc3339;

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// An instant in epoch milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(pub i64);

/// A fixed elapsed-time duration in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(i64);

/// Closed time range, `start <= end` once built through [`TimeSpan::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    /// Builds a span, swapping the bounds if they arrive reversed.
    pub fn new(a: Time, b: Time) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn forever() -> Self {
        Self {
            start: Time(i64::MIN),
            end: Time(i64::MAX),
        }
    }

    pub fn instant(t: Time) -> Self {
        Self { start: t, end: t }
    }

    pub fn contains(&self, t: Time) -> bool {
        t >= self.start && t <= self.end
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end.0 - self.start.0).max(0)
    }
}

impl Interval {
    /// Returns `None` unless `ms` is strictly positive.
    pub fn from_millis(ms: i64) -> Option<Self> {
        (ms > 0).then_some(Self(ms))
    }

    pub fn from_hours_minutes(hours: i64, minutes: i64) -> Option<Self> {
        Self::from_millis(hours * MS_PER_HOUR + minutes * MS_PER_MINUTE)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    WrongWidth { found: usize },
    MissingMarker { marker: char },
    NotNumeric { segment: String },
    MinutesOutOfRange { minutes: u32 },
    ZeroLength,
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodParseError::WrongWidth { found } => {
                write!(f, "step must be 6 characters (HHhMMm), got {found}")
            }
            PeriodParseError::MissingMarker { marker } => {
                write!(f, "step is missing the '{marker}' marker")
            }
            PeriodParseError::NotNumeric { segment } => {
                write!(f, "step segment is not numeric: {segment:?}")
            }
            PeriodParseError::MinutesOutOfRange { minutes } => {
                write!(f, "step minutes must be below 60, got {minutes}")
            }
            PeriodParseError::ZeroLength => write!(f, "step must be longer than zero"),
        }
    }
}

impl std::error::Error for PeriodParseError {}

/// Parses a fixed-width `HHhMMm` step specification, e.g. `"01h30m"`.
pub fn parse_period(spec: &str) -> Result<Interval, PeriodParseError> {
    let bytes = spec.as_bytes();
    if bytes.len() != 6 {
        return Err(PeriodParseError::WrongWidth {
            found: spec.chars().count(),
        });
    }
    if bytes[2] != b'h' {
        return Err(PeriodParseError::MissingMarker { marker: 'h' });
    }
    if bytes[5] != b'm' {
        return Err(PeriodParseError::MissingMarker { marker: 'm' });
    }

    let hours = two_digits(&spec[0..2])?;
    let minutes = two_digits(&spec[3..5])?;
    if minutes >= 60 {
        return Err(PeriodParseError::MinutesOutOfRange { minutes });
    }

    Interval::from_hours_minutes(i64::from(hours), i64::from(minutes))
        .ok_or(PeriodParseError::ZeroLength)
}

fn two_digits(segment: &str) -> Result<u32, PeriodParseError> {
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PeriodParseError::NotNumeric {
            segment: segment.to_string(),
        });
    }
    segment.parse().map_err(|_| PeriodParseError::NotNumeric {
        segment: segment.to_string(),
    })
}

/// Inverse of [`parse_period`]. Hours widen past two digits rather than wrap.
///
/// Seconds are truncated, so only whole-minute intervals round-trip; an
/// interval under a minute formats as `"00h00m"`, which does not parse.
pub fn format_period(interval: Interval) -> String {
    let total_minutes = interval.0 / MS_PER_MINUTE;
    format!("{:02}h{:02}m", total_minutes / 60, total_minutes % 60)
}

/// Floors `t` to a multiple of `interval` counted from the Unix epoch.
///
/// Like [`increment`] and [`decrement`], this saturates at the ends of the
/// `i64` range instead of overflowing.
pub fn round_down(t: Time, interval: Interval) -> Time {
    Time(t.0.saturating_sub(t.0.rem_euclid(interval.0)))
}

pub fn increment(t: Time, interval: Interval) -> Time {
    Time(t.0.saturating_add(interval.0))
}

pub fn decrement(t: Time, interval: Interval) -> Time {
    Time(t.0.saturating_sub(interval.0))
}

/// Parses an RFC 3339 timestamp such as `2024-01-01T10:00:00Z`.
pub fn parse_timestamp(s: &str) -> Option<Time> {
    let dt = OffsetDateTime::parse(s, &Rfc3339).ok()?;
    let ms = dt.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(ms).ok().map(Time)
}

/// Formats `t` as an RFC 3339 UTC timestamp. Out-of-range instants yield `None`.
pub fn format_timestamp(t: Time) -> Option<String> {
    let dt = OffsetDateTime::from_unix_timestamp_nanos(i128::from(t.0) * 1_000_000).ok()?;
    dt.format(&Rfc3339).ok()
}
