use std::collections::BTreeMap;

use crate::core::{IndexedBar, TickMarkWeight, Time, TimePointIndex};

/// Candidate time-axis mark before projection.
#[derive(Debug, Clone, PartialEq)]
pub struct TickMark {
    pub index: TimePointIndex,
    pub time_key: i64,
    pub weight: TickMarkWeight,
    pub original_time: Time,
}

#[derive(Debug, Clone)]
struct DecimationCache {
    min_index_distance: i64,
    marks: Vec<TickMark>,
}

/// Weight-bucketed tick marks with a decimation cache keyed by the minimum
/// index distance between labels.
#[derive(Debug, Clone, Default)]
pub struct TickMarks {
    by_weight: BTreeMap<TickMarkWeight, Vec<TickMark>>,
    cache: Option<DecimationCache>,
    uniform_distribution: bool,
}

impl TickMarks {
    pub fn set_uniform_distribution(&mut self, value: bool) {
        if self.uniform_distribution != value {
            self.uniform_distribution = value;
            self.cache = None;
        }
    }

    /// Rebuilds buckets for `bars[first_changed..]`; earlier marks are kept.
    pub fn set_points(&mut self, bars: &[IndexedBar], first_changed: usize) {
        self.truncate_from(first_changed);
        self.cache = None;
        for bar in bars.iter().skip(first_changed) {
            self.by_weight.entry(bar.tick_weight).or_default().push(TickMark {
                index: bar.index,
                time_key: bar.time.key(),
                weight: bar.tick_weight,
                original_time: bar.original_time.clone(),
            });
        }
    }

    fn truncate_from(&mut self, first_changed: usize) {
        if first_changed == 0 {
            self.by_weight.clear();
            return;
        }
        let first_changed = first_changed as TimePointIndex;
        self.by_weight.retain(|_, marks| {
            let keep = marks.partition_point(|mark| mark.index < first_changed);
            marks.truncate(keep);
            !marks.is_empty()
        });
    }

    /// Marks kept for the given zoom, sorted by index.
    pub fn build(&mut self, bar_spacing: f64, max_label_width: f64) -> &[TickMark] {
        let min_index_distance = (max_label_width / bar_spacing).ceil().max(1.0) as i64;
        let stale = self
            .cache
            .as_ref()
            .is_none_or(|cache| cache.min_index_distance != min_index_distance);
        if stale {
            let marks = self.decimate(min_index_distance);
            self.cache = Some(DecimationCache {
                min_index_distance,
                marks,
            });
        }
        self.cache.as_ref().map_or(&[], |cache| cache.marks.as_slice())
    }

    fn decimate(&self, min_index_distance: i64) -> Vec<TickMark> {
        let mut selected: Vec<TickMark> = Vec::new();
        for marks in self.by_weight.values().rev() {
            let previous = std::mem::take(&mut selected);
            let mut cursor = 0;
            let mut right_neighbour = i64::MAX;
            let mut left_neighbour = i64::MIN;
            for mark in marks {
                let current = mark.index;
                while cursor < previous.len() {
                    let candidate = previous[cursor].index;
                    if candidate >= current {
                        right_neighbour = candidate;
                        break;
                    }
                    selected.push(previous[cursor].clone());
                    cursor += 1;
                    left_neighbour = candidate;
                    right_neighbour = i64::MAX;
                }
                if right_neighbour.saturating_sub(current) >= min_index_distance
                    && current.saturating_sub(left_neighbour) >= min_index_distance
                {
                    selected.push(mark.clone());
                    left_neighbour = current;
                } else if self.uniform_distribution {
                    return previous;
                }
            }
            selected.extend(previous.into_iter().skip(cursor));
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::TickMarks;
    use crate::core::{IndexedBar, TickMarkWeight, Time, TimePoint};

    fn bars(weights: &[TickMarkWeight]) -> Vec<IndexedBar> {
        weights
            .iter()
            .enumerate()
            .map(|(i, weight)| IndexedBar {
                index: i as i64,
                time: TimePoint::from_timestamp(i as i64),
                original_time: Time::Timestamp(i as i64),
                tick_weight: *weight,
            })
            .collect()
    }

    #[test]
    fn heavier_weights_win_spacing_conflicts() {
        let day = TickMarkWeight::DAY;
        let month = TickMarkWeight::MONTH;
        let weights = [day, day, day, month, day, day, day, day, day, day];
        let mut marks = TickMarks::default();
        marks.set_points(&bars(&weights), 0);

        let built: Vec<i64> = marks.build(10.0, 30.0).iter().map(|m| m.index).collect();
        // distance 3: month at 3 first, then days at 0, 6, 9
        assert_eq!(built, vec![0, 3, 6, 9]);

        let dense: Vec<i64> = marks.build(10.0, 10.0).iter().map(|m| m.index).collect();
        assert_eq!(dense.len(), weights.len());
    }

    #[test]
    fn partial_rebuild_keeps_prefix() {
        let day = TickMarkWeight::DAY;
        let mut marks = TickMarks::default();
        let all = bars(&[day, day, day, day]);
        marks.set_points(&all, 0);
        let mut extended = all.clone();
        extended.extend(bars(&[day; 6]).into_iter().skip(4));
        marks.set_points(&extended, 4);
        assert_eq!(marks.build(10.0, 5.0).len(), 6);
    }

    #[test]
    fn uniform_distribution_returns_previous_level_on_conflict() {
        let day = TickMarkWeight::DAY;
        let month = TickMarkWeight::MONTH;
        let mut marks = TickMarks::default();
        marks.set_uniform_distribution(true);
        marks.set_points(&bars(&[month, day, day, day]), 0);
        let built: Vec<i64> = marks.build(10.0, 20.0).iter().map(|m| m.index).collect();
        assert_eq!(built, vec![0]);
    }
}
