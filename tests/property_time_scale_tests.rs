use chart_engine::api::{ChartEngine, ChartOptions};
use chart_engine::core::{SeriesDataItem, SeriesKind, SeriesOptions};
use chart_engine::render::NullRenderer;
use proptest::prelude::*;

fn engine_with_bars(bars: i64) -> ChartEngine<NullRenderer> {
    let mut engine = ChartEngine::new(NullRenderer::default(), ChartOptions::default()).expect("engine");
    let series = engine
        .add_series(SeriesKind::Line, SeriesOptions::default())
        .expect("series");
    let items: Vec<_> = (0..bars)
        .map(|i| SeriesDataItem::value(1_700_006_400 + i * 300, 100.0 + i as f64))
        .collect();
    engine.set_series_data(series, &items).expect("data");
    engine.on_animation_frame(0.0).expect("frame");
    engine
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn logical_coordinate_round_trip(
        spacing in 2.0f64..40.0,
        offset in -30.0f64..30.0,
        logical in -100.0f64..400.0,
    ) {
        let mut engine = engine_with_bars(300);
        engine.set_bar_spacing(spacing).expect("spacing");
        engine.set_right_offset(offset).expect("offset");
        engine.on_animation_frame(16.0).expect("frame");

        let x = engine.logical_to_coordinate(logical).expect("x");
        let back = engine.coordinate_to_logical(x).expect("logical");
        prop_assert!((back - logical).abs() <= 1e-6, "{logical} -> {x} -> {back}");
    }

    #[test]
    fn navigation_always_keeps_two_bars_visible(
        bars in 2i64..200,
        spacing in 1.0f64..60.0,
        offset in -5_000.0f64..5_000.0,
    ) {
        let mut engine = engine_with_bars(bars);
        engine.set_bar_spacing(spacing).expect("spacing");
        engine.set_right_offset(offset).expect("offset");
        engine.on_animation_frame(16.0).expect("frame");

        let range = engine.visible_logical_range().expect("range");
        prop_assert!(range.right() >= 1.0 - 1e-9, "right edge {} left the data", range.right());
        prop_assert!(
            range.left() <= (bars - 2) as f64 + 1e-9,
            "left edge {} left the data",
            range.left()
        );
    }

    #[test]
    fn wheel_zoom_keeps_the_bar_under_the_pointer(
        delta in -300.0f64..300.0,
        x in 50.0f64..600.0,
    ) {
        use chart_engine::core::Point;
        use chart_engine::interaction::{InputEvent, WheelDelta, WheelDeltaMode};
        use chart_engine::render::SurfaceId;

        let mut engine = engine_with_bars(400);
        let before = engine.coordinate_to_logical(x).expect("logical");
        let wheel = InputEvent::wheel(
            Point::new(x, 100.0),
            WheelDelta { delta_x: 0.0, delta_y: delta, mode: WheelDeltaMode::Pixel },
            0.0,
        );
        engine.handle_input(SurfaceId::PaneTop(0), &wheel).expect("wheel");
        let after = engine.coordinate_to_logical(x).expect("logical");
        prop_assert!((after - before).abs() <= 1e-6);
    }
}
