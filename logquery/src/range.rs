use crate::errors::RangeError;
use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// UTC time window and entry limit shared by every query of an invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    from: NaiveDateTime,
    to: NaiveDateTime,
    limit: usize,
}

impl TimeRange {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime, limit: usize) -> Result<Self, RangeError> {
        if from >= to {
            return Err(RangeError::Empty {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if limit == 0 {
            return Err(RangeError::ZeroLimit);
        }
        Ok(TimeRange { from, to, limit })
    }

    /// The `minutes` minutes ending at `to`.
    pub fn ending_at(to: NaiveDateTime, minutes: i64, limit: usize) -> Result<Self, RangeError> {
        let from = Duration::try_minutes(minutes)
            .and_then(|window| to.checked_sub_signed(window))
            .ok_or_else(|| RangeError::OutOfRange {
                to: to.to_string(),
                minutes,
            })?;
        TimeRange::new(from, to, limit)
    }

    pub fn from(&self) -> NaiveDateTime {
        self.from
    }

    pub fn to(&self) -> NaiveDateTime {
        self.to
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Parses `YYYY-MM-DD HH:MM:SS` (taken as UTC) or an RFC 3339 timestamp
/// (converted to UTC).
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, RangeError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc).naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| RangeError::InvalidTimestamp(value.to_string()))
}
