//! Timestamps and date ranges
//!
//! Every date that reaches the store is a [`Timestamp`]: a UTC instant with a
//! fixed binary layout (`i64` seconds, `u32` nanoseconds) so replicas encode
//! it byte-for-byte identically.

use super::error::LedgerError;
use borsh::{BorshDeserialize, BorshSerialize};
use chrono::{DateTime, Days, NaiveDate, Utc};
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;

/// A UTC instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Midnight UTC of the given calendar day
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidDate`] if the day does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, LedgerError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| Timestamp(naive.and_utc()))
            .ok_or_else(|| {
                LedgerError::invalid_date(&format!("{year}-{month}-{day}"), "no such calendar day")
            })
    }

    /// Add whole days, returning `None` on overflow
    pub fn checked_add_days(self, days: u32) -> Option<Self> {
        self.0.checked_add_days(Days::new(u64::from(days))).map(Timestamp)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Timestamp(datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = LedgerError;

    /// Accepts RFC 3339 (`2024-01-10T12:00:00Z`) or a bare `YYYY-MM-DD`
    /// which resolves to midnight UTC.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Timestamp(datetime.with_timezone(&Utc)));
        }
        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|e| LedgerError::invalid_date(trimmed, &e.to_string()))?;
        date.and_hms_opt(0, 0, 0)
            .map(|naive| Timestamp(naive.and_utc()))
            .ok_or_else(|| LedgerError::invalid_date(trimmed, "no midnight on this day"))
    }
}

impl BorshSerialize for Timestamp {
    fn serialize<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.0.timestamp().serialize(writer)?;
        self.0.timestamp_subsec_nanos().serialize(writer)
    }
}

impl BorshDeserialize for Timestamp {
    fn deserialize_reader<R: Read>(reader: &mut R) -> io::Result<Self> {
        let secs = i64::deserialize_reader(reader)?;
        let nanos = u32::deserialize_reader(reader)?;
        DateTime::from_timestamp(secs, nanos)
            .map(Timestamp)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "timestamp out of range"))
    }
}

/// Inclusive date range where an unset bound is open-ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl DateRange {
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        DateRange { start, end }
    }

    /// Whether `date` lies within `[start, end]`
    pub fn contains(&self, date: Timestamp) -> bool {
        let after_start = self.start.is_none_or(|start| date >= start);
        let before_end = self.end.is_none_or(|end| date <= end);
        after_start && before_end
    }

    /// Parse `start:end`, where either side may be empty
    ///
    /// ```
    /// use invoicer_engine::types::DateRange;
    ///
    /// let range: DateRange = "2017-01-01:".parse().unwrap();
    /// assert!(range.start.is_some());
    /// assert!(range.end.is_none());
    /// ```
    pub fn parse(text: &str) -> Result<Self, LedgerError> {
        let (start, end) = text
            .split_once(':')
            .ok_or_else(|| LedgerError::invalid_date(text, "date range must be start:end"))?;
        let bound = |part: &str| -> Result<Option<Timestamp>, LedgerError> {
            if part.trim().is_empty() {
                Ok(None)
            } else {
                part.parse().map(Some)
            }
        };
        Ok(DateRange::new(bound(start)?, bound(end)?))
    }
}

impl FromStr for DateRange {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateRange::parse(s)
    }
}
