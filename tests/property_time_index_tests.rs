use std::collections::BTreeSet;

use chart_engine::api::{ChartEngine, ChartOptions};
use chart_engine::core::{SeriesDataItem, SeriesKind, SeriesOptions};
use chart_engine::render::NullRenderer;
use proptest::prelude::*;

const START: i64 = 1_600_000_000;

fn times() -> impl Strategy<Value = BTreeSet<i64>> {
    prop::collection::btree_set(0i64..500, 1..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn merged_index_is_sorted_dense_and_shared(a in times(), b in times()) {
        let mut engine = ChartEngine::new(NullRenderer::default(), ChartOptions::default()).expect("engine");
        let first = engine.add_series(SeriesKind::Line, SeriesOptions::default()).expect("first");
        let second = engine.add_series(SeriesKind::Line, SeriesOptions::default()).expect("second");
        let items = |set: &BTreeSet<i64>| -> Vec<SeriesDataItem> {
            set.iter().map(|t| SeriesDataItem::value(START + t * 60, *t as f64)).collect()
        };
        engine.set_series_data(first, &items(&a)).expect("first data");
        engine.set_series_data(second, &items(&b)).expect("second data");

        let union: BTreeSet<i64> = a.union(&b).copied().collect();
        let bars = engine.model().time_index().bars();
        prop_assert_eq!(bars.len(), union.len());
        for (position, (bar, t)) in bars.iter().zip(&union).enumerate() {
            prop_assert_eq!(bar.index, position as i64);
            prop_assert_eq!(bar.time.timestamp, START + t * 60);
        }

        for (series, set) in [(first, &a), (second, &b)] {
            let rows = engine.series_data(series).expect("rows");
            prop_assert_eq!(rows.len(), set.len());
            for row in rows {
                let bar = &bars[row.index as usize];
                prop_assert_eq!(bar.time.timestamp, row.time.timestamp);
            }
        }
    }

    #[test]
    fn appends_extend_the_index_monotonically(steps in prop::collection::vec(1i64..10, 1..40)) {
        let mut engine = ChartEngine::new(NullRenderer::default(), ChartOptions::default()).expect("engine");
        let series = engine.add_series(SeriesKind::Line, SeriesOptions::default()).expect("series");
        let mut time = START;
        let mut last_len = 0;
        for step in steps {
            time += step * 60;
            let change = engine
                .update_series(series, &SeriesDataItem::value(time, step as f64))
                .expect("append");
            prop_assert!(change.appended_bar);
            let bars = engine.bars_len();
            prop_assert_eq!(bars, last_len + 1);
            last_len = bars;
            prop_assert!(engine.update_series(series, &SeriesDataItem::value(time - 1, 0.0)).is_err());
        }
        let last = engine.series_data(series).expect("rows").last().map(|row| row.index);
        prop_assert_eq!(last, Some(last_len as i64 - 1));
    }
}
