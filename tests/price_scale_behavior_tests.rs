use approx::assert_abs_diff_eq;
use chart_engine::api::{ChartEngine, ChartOptions};
use chart_engine::core::{MismatchDirection, SeriesDataItem, SeriesId, SeriesKind, SeriesOptions};
use chart_engine::error::ChartError;
use chart_engine::model::{LogicalRange, PriceScaleId, PriceScaleMode};
use chart_engine::render::NullRenderer;

const DAY: i64 = 86_400;
const START: i64 = 1_700_006_400;

fn candles(count: i64) -> Vec<SeriesDataItem> {
    (0..count)
        .map(|i| {
            let mid = 100.0 + i as f64;
            SeriesDataItem::ohlc(START + i * DAY, mid - 1.0, mid + 3.0, mid - 4.0, mid + 1.0)
        })
        .collect()
}

fn build_engine(count: i64) -> (ChartEngine<NullRenderer>, SeriesId) {
    let mut engine =
        ChartEngine::new(NullRenderer::default(), ChartOptions::default()).expect("engine init");
    let series = engine
        .add_series(SeriesKind::Candlestick, SeriesOptions::default())
        .expect("series");
    engine.set_series_data(series, &candles(count)).expect("data");
    engine.on_animation_frame(0.0).expect("frame");
    (engine, series)
}

#[test]
fn autoscale_keeps_every_visible_bar_inside_the_pane() {
    let (mut engine, series) = build_engine(120);
    engine
        .set_visible_logical_range(LogicalRange::new(40.0, 90.0))
        .expect("range");
    engine.on_animation_frame(16.0).expect("frame");

    let height = engine.pane_heights()[0];
    for index in 40..=90 {
        let row = engine
            .data_by_index(series, index, MismatchDirection::None)
            .expect("lookup")
            .expect("row")
            .clone();
        let high_y = engine
            .price_to_coordinate(series, row.high())
            .expect("query")
            .expect("mapped");
        let low_y = engine
            .price_to_coordinate(series, row.low())
            .expect("query")
            .expect("mapped");
        assert!(high_y >= 0.0 && low_y <= height, "bar {index}: {high_y}..{low_y}");
        assert!(high_y < low_y);
    }

    let range = engine
        .price_range(0, &PriceScaleId::right())
        .expect("scale")
        .expect("range");
    assert!(range.min() <= 136.0 && range.max() >= 193.0);
}

#[test]
fn autoscale_follows_the_visible_window() {
    let (mut engine, _) = build_engine(200);
    engine
        .set_visible_logical_range(LogicalRange::new(0.0, 20.0))
        .expect("range");
    engine.on_animation_frame(16.0).expect("frame");
    let early = engine
        .price_range(0, &PriceScaleId::right())
        .expect("scale")
        .expect("range");

    engine
        .set_visible_logical_range(LogicalRange::new(150.0, 170.0))
        .expect("range");
    engine.on_animation_frame(32.0).expect("frame");
    let late = engine
        .price_range(0, &PriceScaleId::right())
        .expect("scale")
        .expect("range");

    assert!(late.min() > early.max());
}

#[test]
fn pinned_range_disables_autoscale_until_re_enabled() {
    let (mut engine, series) = build_engine(50);
    let right = PriceScaleId::right();
    engine
        .set_visible_price_range(0, &right, 10.0, 20.0)
        .expect("pin");
    engine.on_animation_frame(16.0).expect("frame");

    let options = engine.price_scale_options(0, &right).expect("options");
    assert!(!options.auto_scale);
    let range = engine.price_range(0, &right).expect("scale").expect("range");
    assert_abs_diff_eq!(range.min(), 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(range.max(), 20.0, epsilon = 1e-9);
    let mid = engine
        .price_to_coordinate(series, 15.0)
        .expect("query")
        .expect("mapped");
    let height = engine.pane_heights()[0];
    assert!(mid > 0.0 && mid < height);

    engine
        .set_price_scale_auto_scale(0, &right, true)
        .expect("autoscale");
    engine.on_animation_frame(32.0).expect("frame");
    let range = engine.price_range(0, &right).expect("scale").expect("range");
    assert!(range.min() > 20.0);
}

#[test]
fn log_mode_round_trips_and_reports_prices() {
    let (mut engine, series) = build_engine(80);
    engine
        .set_price_scale_mode(0, &PriceScaleId::right(), PriceScaleMode::Logarithmic)
        .expect("mode");
    engine.on_animation_frame(16.0).expect("frame");

    let range = engine
        .price_range(0, &PriceScaleId::right())
        .expect("scale")
        .expect("range");
    assert!(range.min() > 50.0 && range.max() < 250.0);

    for price in [110.0, 150.0, 175.5] {
        let y = engine
            .price_to_coordinate(series, price)
            .expect("query")
            .expect("mapped");
        let back = engine
            .coordinate_to_price(series, y)
            .expect("query")
            .expect("mapped");
        assert_abs_diff_eq!(back, price, epsilon = 1e-6);
    }
}

#[test]
fn percentage_mode_anchors_on_the_first_visible_value() {
    let (mut engine, series) = build_engine(30);
    engine
        .set_price_scale_mode(0, &PriceScaleId::right(), PriceScaleMode::Percentage)
        .expect("mode");
    engine.on_animation_frame(16.0).expect("frame");

    let range = engine
        .price_range(0, &PriceScaleId::right())
        .expect("scale")
        .expect("range");
    assert!(range.min() < 0.0 && range.max() > 20.0, "percent range {range:?}");

    let first_close = engine.series_data(series).expect("rows")[0].close();
    let y = engine
        .price_to_coordinate(series, first_close)
        .expect("query")
        .expect("mapped");
    let back = engine
        .coordinate_to_price(series, y)
        .expect("query")
        .expect("mapped");
    assert_abs_diff_eq!(back, first_close, epsilon = 1e-6);
}

#[test]
fn inverted_scale_puts_higher_prices_lower() {
    let (mut engine, series) = build_engine(30);
    let right = PriceScaleId::right();
    let mut options = engine.price_scale_options(0, &right).expect("options");
    options.invert_scale = true;
    engine
        .apply_price_scale_options(0, &right, options)
        .expect("apply");
    engine.on_animation_frame(16.0).expect("frame");

    let low = engine
        .price_to_coordinate(series, 110.0)
        .expect("query")
        .expect("mapped");
    let high = engine
        .price_to_coordinate(series, 120.0)
        .expect("query")
        .expect("mapped");
    assert!(high > low);
}

#[test]
fn invalid_queries_and_targets_are_errors() {
    let (mut engine, series) = build_engine(10);
    assert!(matches!(
        engine.price_to_coordinate(series, f64::NAN),
        Err(ChartError::InvalidData(_))
    ));
    assert!(matches!(
        engine.price_to_coordinate(SeriesId::new(999), 1.0),
        Err(ChartError::UnknownSeries(_))
    ));
    assert!(matches!(
        engine.price_range(3, &PriceScaleId::right()),
        Err(ChartError::UnknownPane(3))
    ));
    assert!(
        engine
            .set_visible_price_range(0, &PriceScaleId::right(), 5.0, 5.0)
            .is_err()
    );
    assert!(
        engine
            .price_scale_options(0, &PriceScaleId::new("missing"))
            .is_err()
    );
}

#[test]
fn overlay_scale_is_created_for_series_that_name_it() {
    let (mut engine, _) = build_engine(20);
    let volume = engine
        .add_series(
            SeriesKind::Histogram,
            SeriesOptions {
                price_scale_id: "volume".to_owned(),
                ..SeriesOptions::default()
            },
        )
        .expect("series");
    let items: Vec<_> = (0..20)
        .map(|i| SeriesDataItem::value(START + i * DAY, 1_000.0 + i as f64 * 10.0))
        .collect();
    engine.set_series_data(volume, &items).expect("data");
    engine.on_animation_frame(16.0).expect("frame");

    let overlay = engine
        .price_range(0, &PriceScaleId::new("volume"))
        .expect("overlay scale")
        .expect("range");
    assert!(overlay.min() <= 1_000.0 && overlay.max() >= 1_190.0);
    let main = engine
        .price_range(0, &PriceScaleId::right())
        .expect("right scale")
        .expect("range");
    assert!(main.max() < 1_000.0);
}
