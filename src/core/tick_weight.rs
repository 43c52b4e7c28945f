use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::core::primitives::unix_seconds_to_datetime;

/// Coarsest calendar boundary a bar crosses relative to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TickMarkWeight(u8);

impl TickMarkWeight {
    pub const LESS_THAN_SECOND: Self = Self(0);
    pub const SECOND: Self = Self(10);
    pub const MINUTE1: Self = Self(20);
    pub const MINUTE5: Self = Self(21);
    pub const MINUTE30: Self = Self(22);
    pub const HOUR1: Self = Self(30);
    pub const HOUR3: Self = Self(31);
    pub const HOUR6: Self = Self(32);
    pub const HOUR12: Self = Self(33);
    pub const DAY: Self = Self(50);
    pub const MONTH: Self = Self(60);
    pub const YEAR: Self = Self(70);

    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Label granularity derived from a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickMarkType {
    Year,
    Month,
    DayOfMonth,
    Time,
    TimeWithSeconds,
}

impl TickMarkType {
    #[must_use]
    pub fn for_weight(weight: TickMarkWeight, time_visible: bool, seconds_visible: bool) -> Self {
        match weight {
            TickMarkWeight::YEAR => Self::Year,
            TickMarkWeight::MONTH => Self::Month,
            TickMarkWeight::DAY => Self::DayOfMonth,
            w if w < TickMarkWeight::MINUTE1 => {
                if !time_visible {
                    Self::DayOfMonth
                } else if seconds_visible {
                    Self::TimeWithSeconds
                } else {
                    Self::Time
                }
            }
            _ => {
                if time_visible {
                    Self::Time
                } else {
                    Self::DayOfMonth
                }
            }
        }
    }
}

const INTRADAY_BUCKETS: [(i64, TickMarkWeight); 8] = [
    (1, TickMarkWeight::SECOND),
    (60, TickMarkWeight::MINUTE1),
    (5 * 60, TickMarkWeight::MINUTE5),
    (30 * 60, TickMarkWeight::MINUTE30),
    (3600, TickMarkWeight::HOUR1),
    (3 * 3600, TickMarkWeight::HOUR3),
    (6 * 3600, TickMarkWeight::HOUR6),
    (12 * 3600, TickMarkWeight::HOUR12),
];

#[must_use]
pub fn weight_by_time(current: DateTime<Utc>, previous: DateTime<Utc>) -> TickMarkWeight {
    if current.year() != previous.year() {
        return TickMarkWeight::YEAR;
    }
    if current.month() != previous.month() {
        return TickMarkWeight::MONTH;
    }
    if current.day() != previous.day() {
        return TickMarkWeight::DAY;
    }
    let current_ms = current.timestamp_millis();
    let previous_ms = previous.timestamp_millis();
    for (bucket_seconds, weight) in INTRADAY_BUCKETS.iter().rev() {
        let bucket_ms = bucket_seconds * 1000;
        if current_ms.div_euclid(bucket_ms) != previous_ms.div_euclid(bucket_ms) {
            return *weight;
        }
    }
    TickMarkWeight::LESS_THAN_SECOND
}

/// Weight of a bar at `current` following one at `previous` (unix seconds).
pub(crate) fn weight_by_seconds(current: i64, previous: i64) -> TickMarkWeight {
    match (
        unix_seconds_to_datetime(current),
        unix_seconds_to_datetime(previous),
    ) {
        (Ok(current), Ok(previous)) => weight_by_time(current, previous),
        _ => TickMarkWeight::LESS_THAN_SECOND,
    }
}

/// Assigns weights to `times[start..]` in place.
///
/// The first element of a full pass is weighted against a synthetic predecessor
/// placed one average spacing before it.
pub fn fill_weights(times: &[i64], weights: &mut [TickMarkWeight], start: usize) {
    debug_assert_eq!(times.len(), weights.len());
    if times.is_empty() || start >= times.len() {
        return;
    }
    let mut previous = if start == 0 {
        None
    } else {
        Some(times[start - 1])
    };
    let mut total_delta: i64 = 0;
    for position in start..times.len() {
        let current = times[position];
        if let Some(previous) = previous {
            weights[position] = weight_by_seconds(current, previous);
            total_delta += current - previous;
        }
        previous = Some(current);
    }
    if start == 0 && times.len() > 1 {
        let spans = (times.len() - 1) as i64;
        let average = (total_delta + spans - 1).div_euclid(spans);
        weights[0] = weight_by_seconds(times[0], times[0] - average);
    }
}

/// Highest weight among `weights`, folding the hour tiers onto `HOUR1`.
#[must_use]
pub fn max_tick_mark_weight(weights: impl IntoIterator<Item = TickMarkWeight>) -> TickMarkWeight {
    let max = weights
        .into_iter()
        .max()
        .unwrap_or(TickMarkWeight::LESS_THAN_SECOND);
    if max > TickMarkWeight::HOUR1 && max < TickMarkWeight::DAY {
        TickMarkWeight::HOUR1
    } else {
        max
    }
}
