use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> i64 {
    time.timestamp()
}

/// UTC midnight of a calendar day, in unix seconds.
pub fn calendar_day_to_unix_seconds(year: i32, month: u32, day: u32) -> ChartResult<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ChartError::InvalidData(format!("invalid business day {year:04}-{month:02}-{day:02}"))
    })?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
}

pub fn unix_seconds_to_datetime(seconds: i64) -> ChartResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| ChartError::InvalidData(format!("timestamp {seconds} is out of range")))
}

pub(crate) fn ensure_finite(value: f64, what: &str) -> ChartResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ChartError::InvalidData(format!("{what} must be finite")))
    }
}
