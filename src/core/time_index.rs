//! Merged global time index shared by every series of a chart.
//!
//! Every distinct time across all series owns one dense logical index.
//! `set_series_data` re-merges and renumbers only from the first position
//! where the merged sequence changed; `update_series_data` appends or amends
//! the series tail and, when the time is new to the chart, inserts one slot and
//! shifts the indices after it.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::plot_list::{PlotList, PointColors, SeriesPoint};
use crate::core::tick_weight::{TickMarkWeight, fill_weights, weight_by_seconds};
use crate::core::{SeriesId, Time, TimePoint, TimePointIndex};
use crate::error::{ChartError, ChartResult};

/// One entry of the global time index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedBar {
    pub index: TimePointIndex,
    pub time: TimePoint,
    pub original_time: Time,
    pub tick_weight: TickMarkWeight,
}

/// Series item after kind-specific conversion; `values == None` is whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedItem {
    pub time: TimePoint,
    pub original_time: Time,
    pub values: Option<[f64; 4]>,
    pub colors: PointColors,
}

#[derive(Debug, Clone)]
struct TimeSlot {
    time: TimePoint,
    original_time: Time,
    series: SmallVec<[SeriesId; 4]>,
}

/// What a data mutation changed, consumed by the time scale and price scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataChange {
    pub series: SeriesId,
    /// Position of the first global bar whose index or weight changed.
    pub first_changed_index: Option<usize>,
    pub base_index: Option<TimePointIndex>,
    /// A new bar was added after every existing bar.
    pub appended_bar: bool,
}

impl DataChange {
    #[must_use]
    pub fn changes_time_scale(&self) -> bool {
        self.first_changed_index.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    slots: BTreeMap<i64, TimeSlot>,
    bars: Vec<IndexedBar>,
    series_keys: IndexMap<SeriesId, Vec<i64>>,
    rows: IndexMap<SeriesId, PlotList>,
}

impl TimeIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bars(&self) -> &[IndexedBar] {
        &self.bars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    #[must_use]
    pub fn series_rows(&self, series: SeriesId) -> Option<&PlotList> {
        self.rows.get(&series)
    }

    /// Largest last row index across series.
    #[must_use]
    pub fn base_index(&self) -> Option<TimePointIndex> {
        self.rows.values().filter_map(PlotList::last_index).max()
    }

    #[must_use]
    pub fn bar(&self, index: TimePointIndex) -> Option<&IndexedBar> {
        usize::try_from(index).ok().and_then(|i| self.bars.get(i))
    }

    /// Index of `time`, or the nearest index at or before it when `find_nearest`.
    #[must_use]
    pub fn index_of_time(&self, time: &TimePoint, find_nearest: bool) -> Option<TimePointIndex> {
        if self.bars.is_empty() {
            return None;
        }
        let position = self.bars.partition_point(|bar| bar.time.key() < time.key());
        if let Some(bar) = self.bars.get(position)
            && bar.time.key() == time.key()
        {
            return Some(bar.index);
        }
        if !find_nearest {
            return None;
        }
        if position == 0 {
            Some(0)
        } else {
            Some(self.bars[position - 1].index)
        }
    }

    /// Replaces the full data of one series.
    pub fn set_series_data(
        &mut self,
        series: SeriesId,
        items: Vec<PreparedItem>,
    ) -> ChartResult<DataChange> {
        for (position, pair) in items.windows(2).enumerate() {
            if pair[1].time.key() <= pair[0].time.key() {
                return Err(ChartError::UnorderedData {
                    series,
                    position: position + 1,
                });
            }
        }

        if let Some(old_keys) = self.series_keys.shift_remove(&series) {
            for key in old_keys {
                self.release_slot(key, series);
            }
        }

        let mut keys = Vec::with_capacity(items.len());
        let mut pending_rows = Vec::with_capacity(items.len());
        for item in items {
            let key = item.time.key();
            keys.push(key);
            self.claim_slot(&item.time, series, &item.original_time);
            if let Some(values) = item.values {
                pending_rows.push((item.time, values, item.colors));
            }
        }

        let first_changed = self.rebuild_bars();

        if keys.is_empty() {
            self.rows.shift_remove(&series);
        } else {
            self.series_keys.insert(series, keys);
            let rows = pending_rows
                .into_iter()
                .filter_map(|(time, values, colors)| {
                    self.index_of_time(&time, false).map(|index| SeriesPoint {
                        index,
                        time,
                        values,
                        colors,
                    })
                })
                .collect();
            self.rows.entry(series).or_default().set_rows(rows);
        }

        if let Some(first_changed) = first_changed {
            self.reindex_other_series(series, first_changed);
        }

        let base_index = self.base_index();
        debug!(
            series = %series,
            bars = self.bars.len(),
            first_changed = ?first_changed,
            ?base_index,
            "set series data"
        );
        Ok(DataChange {
            series,
            first_changed_index: first_changed,
            base_index,
            appended_bar: false,
        })
    }

    /// Appends a new last item or amends the existing last one.
    pub fn update_series_data(
        &mut self,
        series: SeriesId,
        item: PreparedItem,
    ) -> ChartResult<DataChange> {
        let key = item.time.key();
        if let Some(last_key) = self.series_keys.get(&series).and_then(|keys| keys.last().copied())
            && key < last_key
        {
            return Err(ChartError::OutOfOrderUpdate {
                series,
                last_time: last_key,
                new_time: key,
            });
        }

        let old_len = self.bars.len();
        let mut first_changed = None;
        let mut appended_bar = false;
        if !self.slots.contains_key(&key) {
            let position = self.bars.partition_point(|bar| bar.time.key() < key);
            appended_bar = position == old_len;
            self.bars.insert(
                position,
                IndexedBar {
                    index: position as TimePointIndex,
                    time: item.time,
                    original_time: item.original_time.clone(),
                    tick_weight: TickMarkWeight::default(),
                },
            );
            for (offset, bar) in self.bars[position..].iter_mut().enumerate() {
                bar.index = (position + offset) as TimePointIndex;
            }
            self.refill_weights(position);
            first_changed = Some(position);
        }
        self.claim_slot(&item.time, series, &item.original_time);

        let keys = self.series_keys.entry(series).or_default();
        if keys.last() != Some(&key) {
            keys.push(key);
        }

        if let Some(position) = first_changed
            && !appended_bar
        {
            self.reindex_other_series(series, position);
        }

        let plot_list = self.rows.entry(series).or_default();
        match item.values {
            Some(values) => {
                let index = self
                    .bars
                    .partition_point(|bar| bar.time.key() < key) as TimePointIndex;
                plot_list.upsert_last(SeriesPoint {
                    index,
                    time: item.time,
                    values,
                    colors: item.colors,
                });
            }
            None => {
                plot_list.remove_last_at(key);
            }
        }

        trace!(series = %series, key, new_bar = first_changed.is_some(), "update series data");
        Ok(DataChange {
            series,
            first_changed_index: first_changed,
            base_index: self.base_index(),
            appended_bar,
        })
    }

    pub fn remove_series(&mut self, series: SeriesId) -> ChartResult<DataChange> {
        let change = self.set_series_data(series, Vec::new())?;
        self.rows.shift_remove(&series);
        Ok(change)
    }

    fn claim_slot(&mut self, time: &TimePoint, series: SeriesId, original_time: &Time) {
        let slot = self.slots.entry(time.key()).or_insert_with(|| TimeSlot {
            time: *time,
            original_time: original_time.clone(),
            series: SmallVec::new(),
        });
        if !slot.series.contains(&series) {
            slot.series.push(series);
        }
    }

    fn release_slot(&mut self, key: i64, series: SeriesId) {
        if let Some(slot) = self.slots.get_mut(&key) {
            slot.series.retain(|id| *id != series);
            if slot.series.is_empty() {
                self.slots.remove(&key);
            }
        }
    }

    /// Rebuilds bars from slots keeping the unchanged prefix; returns the
    /// first changed position.
    fn rebuild_bars(&mut self) -> Option<usize> {
        let mut first_changed = None;
        for (position, (key, _)) in self.slots.iter().enumerate() {
            match self.bars.get(position) {
                Some(bar) if bar.time.key() == *key => {}
                _ => {
                    first_changed = Some(position);
                    break;
                }
            }
        }
        if first_changed.is_none() && self.slots.len() != self.bars.len() {
            first_changed = Some(self.slots.len().min(self.bars.len()));
        }
        let first_changed = first_changed?;

        self.bars.truncate(first_changed);
        let tail_start = self.slots.len().min(first_changed);
        for (offset, slot) in self.slots.values().skip(tail_start).enumerate() {
            self.bars.push(IndexedBar {
                index: (tail_start + offset) as TimePointIndex,
                time: slot.time,
                original_time: slot.original_time.clone(),
                tick_weight: TickMarkWeight::default(),
            });
        }
        self.refill_weights(first_changed);
        Some(first_changed)
    }

    /// Recomputes weights from `start`. Only a full pass needs every time,
    /// since the first bar is weighted by the average spacing.
    fn refill_weights(&mut self, start: usize) {
        if start >= self.bars.len() {
            return;
        }
        if start == 0 {
            let times: Vec<i64> = self.bars.iter().map(|bar| bar.time.key()).collect();
            let mut weights = vec![TickMarkWeight::default(); times.len()];
            fill_weights(&times, &mut weights, 0);
            for (bar, weight) in self.bars.iter_mut().zip(weights) {
                bar.tick_weight = weight;
            }
            return;
        }
        let mut previous = self.bars[start - 1].time.key();
        for bar in &mut self.bars[start..] {
            let current = bar.time.key();
            bar.tick_weight = weight_by_seconds(current, previous);
            previous = current;
        }
    }

    fn reindex_other_series(&mut self, except: SeriesId, first_changed: usize) {
        let Some(from_key) = self.bars.get(first_changed).map(|bar| bar.time.key()) else {
            return;
        };
        for (id, plot_list) in &mut self.rows {
            if *id != except {
                plot_list.reindex(from_key, &self.bars);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PreparedItem, TimeIndex};
    use crate::core::plot_list::PointColors;
    use crate::core::tick_weight::TickMarkWeight;
    use crate::core::{SeriesId, Time, TimePoint};
    use crate::error::ChartError;

    const DAY: i64 = 86_400;
    const START: i64 = 1_577_836_800;

    fn item(key: i64, value: Option<f64>) -> PreparedItem {
        PreparedItem {
            time: TimePoint::from_timestamp(key),
            original_time: Time::Timestamp(key),
            values: value.map(|v| [v; 4]),
            colors: PointColors::default(),
        }
    }

    fn daily(count: i64, offset_days: i64) -> Vec<PreparedItem> {
        (0..count)
            .map(|i| item(START + (i + offset_days) * DAY, Some(i as f64)))
            .collect()
    }

    #[test]
    fn first_set_data_numbers_from_zero() {
        let mut index = TimeIndex::new();
        let change = index
            .set_series_data(SeriesId::new(1), daily(10, 0))
            .expect("set data");
        assert_eq!(change.first_changed_index, Some(0));
        assert_eq!(change.base_index, Some(9));
        assert_eq!(index.len(), 10);
        assert_eq!(index.bars()[0].tick_weight, TickMarkWeight::YEAR);
    }

    #[test]
    fn append_weights_only_the_new_tail() {
        let mut index = TimeIndex::new();
        let series = SeriesId::new(1);
        // 2020 is a leap year, so 366 days end on 2020-12-31.
        index.set_series_data(series, daily(366, 0)).expect("set data");
        let before: Vec<TickMarkWeight> = index.bars().iter().map(|bar| bar.tick_weight).collect();

        let change = index
            .update_series_data(series, item(START + 366 * DAY, Some(1.0)))
            .expect("append");
        assert_eq!(change.first_changed_index, Some(366));
        assert!(change.appended_bar);

        let after: Vec<TickMarkWeight> = index.bars().iter().map(|bar| bar.tick_weight).collect();
        assert_eq!(&after[..366], &before[..]);
        assert_eq!(after[366], TickMarkWeight::YEAR);

        index
            .update_series_data(series, item(START + 367 * DAY, Some(2.0)))
            .expect("append");
        assert_eq!(index.bars()[367].tick_weight, TickMarkWeight::DAY);

        let mut rebuilt = TimeIndex::new();
        rebuilt.set_series_data(series, daily(368, 0)).expect("rebuild");
        let expected: Vec<TickMarkWeight> = rebuilt.bars().iter().map(|bar| bar.tick_weight).collect();
        let streamed: Vec<TickMarkWeight> = index.bars().iter().map(|bar| bar.tick_weight).collect();
        assert_eq!(streamed, expected);
    }

    #[test]
    fn merging_second_series_renumbers_from_divergence() {
        let mut index = TimeIndex::new();
        let a = SeriesId::new(1);
        let b = SeriesId::new(2);
        index.set_series_data(a, daily(10, 0)).expect("a");
        // b shares days 0..9 every other day and adds two later days
        let b_items: Vec<_> = (0..6)
            .map(|i| item(START + (i * 2) * DAY, Some(1.0)))
            .collect();
        let change = index.set_series_data(b, b_items).expect("b");
        assert_eq!(change.first_changed_index, Some(10));
        assert_eq!(index.len(), 11);
        let b_rows = index.series_rows(b).expect("rows");
        assert_eq!(b_rows.last_index(), Some(10));
        assert_eq!(index.base_index(), Some(10));
    }

    #[test]
    fn identical_set_data_keeps_index() {
        let mut index = TimeIndex::new();
        let a = SeriesId::new(1);
        index.set_series_data(a, daily(5, 0)).expect("first");
        let change = index.set_series_data(a, daily(5, 0)).expect("second");
        assert_eq!(change.first_changed_index, None);
    }

    #[test]
    fn unordered_set_data_is_rejected() {
        let mut index = TimeIndex::new();
        let mut items = daily(3, 0);
        items.swap(1, 2);
        let err = index
            .set_series_data(SeriesId::new(1), items)
            .expect_err("unordered");
        assert!(matches!(err, ChartError::UnorderedData { position: 2, .. }));
    }

    #[test]
    fn whitespace_occupies_index_without_row() {
        let mut index = TimeIndex::new();
        let a = SeriesId::new(1);
        let mut items = daily(3, 0);
        items.push(item(START + 3 * DAY, None));
        index.set_series_data(a, items).expect("set");
        assert_eq!(index.len(), 4);
        assert_eq!(index.series_rows(a).expect("rows").len(), 3);
        assert_eq!(index.base_index(), Some(2));
    }

    #[test]
    fn update_inserting_in_middle_shifts_other_series() {
        let mut index = TimeIndex::new();
        let a = SeriesId::new(1);
        let b = SeriesId::new(2);
        index
            .set_series_data(a, vec![item(START, Some(1.0)), item(START + 4 * DAY, Some(2.0))])
            .expect("a");
        index
            .set_series_data(b, vec![item(START + DAY, Some(5.0))])
            .expect("b");
        let change = index
            .update_series_data(b, item(START + 2 * DAY, Some(6.0)))
            .expect("update");
        assert_eq!(change.first_changed_index, Some(2));
        assert!(!change.appended_bar);
        assert_eq!(index.series_rows(a).expect("a").last_index(), Some(3));
        assert_eq!(index.series_rows(b).expect("b").last_index(), Some(2));
    }

    #[test]
    fn removing_series_drops_unshared_times() {
        let mut index = TimeIndex::new();
        let a = SeriesId::new(1);
        let b = SeriesId::new(2);
        index.set_series_data(a, daily(3, 0)).expect("a");
        index.set_series_data(b, daily(3, 2)).expect("b");
        assert_eq!(index.len(), 5);
        index.remove_series(b).expect("remove");
        assert_eq!(index.len(), 3);
        assert!(index.series_rows(b).is_none());
    }
}
