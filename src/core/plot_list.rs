use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{IndexedBar, TimePoint, TimePointIndex};
use crate::render::Color;

/// Rows per cached min/max chunk.
pub const MIN_MAX_CHUNK_SIZE: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotValue {
    Open = 0,
    High = 1,
    Low = 2,
    Close = 3,
}

fn value_mask(values: &[PlotValue]) -> u8 {
    values.iter().fold(0u8, |mask, value| mask | (1 << *value as u8))
}

/// Per-point color overrides supplied with the data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointColors {
    pub color: Option<Color>,
    pub border_color: Option<Color>,
    pub wick_color: Option<Color>,
}

/// One plotted row of a series at a logical index.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub index: TimePointIndex,
    pub time: TimePoint,
    /// OHLC, or the single value repeated four times.
    pub values: [f64; 4],
    pub colors: PointColors,
}

impl SeriesPoint {
    #[must_use]
    pub fn value(&self, plot: PlotValue) -> f64 {
        self.values[plot as usize]
    }

    #[must_use]
    pub fn open(&self) -> f64 {
        self.values[0]
    }

    #[must_use]
    pub fn high(&self) -> f64 {
        self.values[1]
    }

    #[must_use]
    pub fn low(&self) -> f64 {
        self.values[2]
    }

    #[must_use]
    pub fn close(&self) -> f64 {
        self.values[3]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MismatchDirection {
    None,
    NearestLeft,
    NearestRight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    fn merge(self, other: MinMax) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

fn merge_opt(acc: Option<MinMax>, next: Option<MinMax>) -> Option<MinMax> {
    match (acc, next) {
        (Some(a), Some(b)) => Some(a.merge(b)),
        (a, b) => a.or(b),
    }
}

/// Chunked min/max cache keyed by value selection.
#[derive(Debug, Default)]
struct MinMaxCache {
    chunks: HashMap<u8, HashMap<usize, Option<MinMax>>>,
}

impl MinMaxCache {
    fn clear(&mut self) {
        self.chunks.clear();
    }

    fn invalidate_from_chunk(&mut self, first_dirty_chunk: usize) {
        for per_mask in self.chunks.values_mut() {
            per_mask.retain(|chunk, _| *chunk < first_dirty_chunk);
        }
    }
}

/// Time-ordered rows of one series with a lazily filled min/max cache.
#[derive(Debug, Default)]
pub struct PlotList {
    rows: Vec<SeriesPoint>,
    cache: RefCell<MinMaxCache>,
    version: u64,
}

impl Clone for PlotList {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            cache: RefCell::new(MinMaxCache::default()),
            version: self.version,
        }
    }
}

impl PlotList {
    #[must_use]
    pub fn rows(&self) -> &[SeriesPoint] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bumped on every mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn first(&self) -> Option<&SeriesPoint> {
        self.rows.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&SeriesPoint> {
        self.rows.last()
    }

    #[must_use]
    pub fn first_index(&self) -> Option<TimePointIndex> {
        self.rows.first().map(|row| row.index)
    }

    #[must_use]
    pub fn last_index(&self) -> Option<TimePointIndex> {
        self.rows.last().map(|row| row.index)
    }

    pub(crate) fn set_rows(&mut self, rows: Vec<SeriesPoint>) {
        self.rows = rows;
        self.cache.get_mut().clear();
        self.version += 1;
    }

    /// Replaces the last row when it shares `row.time`, appends otherwise.
    pub(crate) fn upsert_last(&mut self, row: SeriesPoint) {
        let position = match self.rows.last() {
            Some(last) if last.time.key() == row.time.key() => {
                let position = self.rows.len() - 1;
                self.rows[position] = row;
                position
            }
            _ => {
                self.rows.push(row);
                self.rows.len() - 1
            }
        };
        self.mark_dirty_from(position);
    }

    /// Drops the last row when it sits at `key`.
    pub(crate) fn remove_last_at(&mut self, key: i64) -> bool {
        if self.rows.last().is_some_and(|last| last.time.key() == key) {
            self.rows.pop();
            self.mark_dirty_from(self.rows.len());
            return true;
        }
        false
    }

    /// Re-reads logical indices for rows at or after `from_key`.
    pub(crate) fn reindex(&mut self, from_key: i64, bars: &[IndexedBar]) {
        let start = self.rows.partition_point(|row| row.time.key() < from_key);
        if start == self.rows.len() {
            return;
        }
        let mut cursor = bars.partition_point(|bar| bar.time.key() < from_key);
        for row in &mut self.rows[start..] {
            while cursor < bars.len() && bars[cursor].time.key() < row.time.key() {
                cursor += 1;
            }
            if let Some(bar) = bars.get(cursor) {
                row.index = bar.index;
            }
        }
        self.version += 1;
    }

    fn mark_dirty_from(&mut self, position: usize) {
        let chunk = position.saturating_sub(1) / MIN_MAX_CHUNK_SIZE;
        self.cache.get_mut().invalidate_from_chunk(chunk);
        self.version += 1;
    }

    #[must_use]
    pub fn value_at(&self, index: TimePointIndex) -> Option<&SeriesPoint> {
        self.search(index, MismatchDirection::None)
    }

    #[must_use]
    pub fn search(&self, index: TimePointIndex, direction: MismatchDirection) -> Option<&SeriesPoint> {
        let position = self.rows.partition_point(|row| row.index < index);
        if let Some(row) = self.rows.get(position)
            && row.index == index
        {
            return Some(row);
        }
        match direction {
            MismatchDirection::None => None,
            MismatchDirection::NearestLeft => position.checked_sub(1).and_then(|p| self.rows.get(p)),
            MismatchDirection::NearestRight => self.rows.get(position),
        }
    }

    /// Min/max of `values` across rows with `first <= index <= last`, NaN skipped.
    #[must_use]
    pub fn min_max_on_range(
        &self,
        first: TimePointIndex,
        last: TimePointIndex,
        values: &[PlotValue],
    ) -> Option<MinMax> {
        if self.rows.is_empty() || values.is_empty() || first > last {
            return None;
        }
        let start = self.rows.partition_point(|row| row.index < first);
        let end = self.rows.partition_point(|row| row.index <= last);
        if start >= end {
            return None;
        }

        let mask = value_mask(values);
        let mut result = None;
        for chunk in start / MIN_MAX_CHUNK_SIZE..=(end - 1) / MIN_MAX_CHUNK_SIZE {
            let chunk_start = chunk * MIN_MAX_CHUNK_SIZE;
            let chunk_end = (chunk_start + MIN_MAX_CHUNK_SIZE).min(self.rows.len());
            let part = if start <= chunk_start && chunk_end <= end {
                self.cached_chunk(mask, chunk, chunk_start, chunk_end, values)
            } else {
                self.scan(start.max(chunk_start), end.min(chunk_end), values)
            };
            result = merge_opt(result, part);
        }
        result
    }

    fn cached_chunk(
        &self,
        mask: u8,
        chunk: usize,
        chunk_start: usize,
        chunk_end: usize,
        values: &[PlotValue],
    ) -> Option<MinMax> {
        if let Some(hit) = self
            .cache
            .borrow()
            .chunks
            .get(&mask)
            .and_then(|per_mask| per_mask.get(&chunk))
        {
            return *hit;
        }
        let computed = self.scan(chunk_start, chunk_end, values);
        self.cache
            .borrow_mut()
            .chunks
            .entry(mask)
            .or_default()
            .insert(chunk, computed);
        computed
    }

    fn scan(&self, from: usize, to: usize, values: &[PlotValue]) -> Option<MinMax> {
        let mut result: Option<MinMax> = None;
        for row in &self.rows[from..to] {
            for plot in values {
                let value = row.value(*plot);
                if value.is_nan() {
                    continue;
                }
                let single = MinMax {
                    min: value,
                    max: value,
                };
                result = merge_opt(result, Some(single));
            }
        }
        result
    }

    #[cfg(test)]
    fn cached_chunk_count(&self) -> usize {
        self.cache.borrow().chunks.values().map(HashMap::len).sum()
    }
}
