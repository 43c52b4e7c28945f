use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::{calendar_day_to_unix_seconds, datetime_to_unix_seconds};
use crate::error::{ChartError, ChartResult};

/// Dense logical bar position in the merged time index.
pub type TimePointIndex = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn manhattan_distance(self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesId(u64);

impl SeriesId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusinessDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl BusinessDay {
    #[must_use]
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn to_unix_seconds(self) -> ChartResult<i64> {
        calendar_day_to_unix_seconds(self.year, self.month, self.day)
    }
}

impl FromStr for BusinessDay {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|err| ChartError::InvalidData(format!("invalid date string `{s}`: {err}")))?;
        Ok(Self::new(date.year(), date.month(), date.day()))
    }
}

/// Time as supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Time {
    /// UTC unix timestamp in seconds.
    Timestamp(i64),
    BusinessDay(BusinessDay),
    /// `yyyy-mm-dd`.
    DateString(String),
}

impl Time {
    /// Normalizes the caller-facing time into an index key.
    pub fn to_time_point(&self) -> ChartResult<TimePoint> {
        match self {
            Self::Timestamp(seconds) => Ok(TimePoint::from_timestamp(*seconds)),
            Self::BusinessDay(day) => TimePoint::from_business_day(*day),
            Self::DateString(text) => TimePoint::from_business_day(text.parse()?),
        }
    }
}

impl From<i64> for Time {
    fn from(value: i64) -> Self {
        Self::Timestamp(value)
    }
}

impl From<BusinessDay> for Time {
    fn from(value: BusinessDay) -> Self {
        Self::BusinessDay(value)
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(datetime_to_unix_seconds(value))
    }
}

/// Normalized time key; ordering follows `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: i64,
    pub business_day: Option<BusinessDay>,
}

impl TimePoint {
    #[must_use]
    pub const fn from_timestamp(timestamp: i64) -> Self {
        Self {
            timestamp,
            business_day: None,
        }
    }

    pub fn from_business_day(day: BusinessDay) -> ChartResult<Self> {
        Ok(Self {
            timestamp: day.to_unix_seconds()?,
            business_day: Some(day),
        })
    }

    #[must_use]
    pub const fn key(self) -> i64 {
        self.timestamp
    }
}

impl PartialOrd for TimePoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimePoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::{BusinessDay, Time};

    #[test]
    fn all_time_inputs_share_one_key() {
        let from_day = Time::BusinessDay(BusinessDay::new(2020, 3, 9))
            .to_time_point()
            .expect("business day");
        let from_text = Time::DateString("2020-03-09".to_owned())
            .to_time_point()
            .expect("date string");
        let from_ts = Time::Timestamp(from_day.timestamp)
            .to_time_point()
            .expect("timestamp");
        assert_eq!(from_day.key(), from_text.key());
        assert_eq!(from_day.key(), from_ts.key());
        assert!(from_ts.business_day.is_none());
    }

    #[test]
    fn untagged_json_time_variants_parse() {
        let ts: Time = serde_json::from_str("1700000000").expect("number");
        assert_eq!(ts, Time::Timestamp(1_700_000_000));
        let day: Time =
            serde_json::from_str(r#"{"year":2021,"month":1,"day":4}"#).expect("object");
        assert_eq!(day, Time::BusinessDay(BusinessDay::new(2021, 1, 4)));
        let text: Time = serde_json::from_str(r#""2021-01-04""#).expect("string");
        assert_eq!(text, Time::DateString("2021-01-04".to_owned()));
    }

    #[test]
    fn malformed_date_string_is_rejected() {
        assert!(Time::DateString("2021/01/04".to_owned()).to_time_point().is_err());
    }
}
