use approx::assert_abs_diff_eq;
use chart_engine::api::{ChartEngine, ChartOptions};
use chart_engine::core::{Point, SeriesDataItem, SeriesKind, SeriesOptions, Time};
use chart_engine::interaction::{InputEvent, WheelDelta, WheelDeltaMode};
use chart_engine::model::LogicalRange;
use chart_engine::render::{NullRenderer, SurfaceId};

const DAY: i64 = 86_400;
const START: i64 = 1_700_006_400;

fn build_engine(bars: i64) -> ChartEngine<NullRenderer> {
    let mut engine =
        ChartEngine::new(NullRenderer::default(), ChartOptions::default()).expect("engine init");
    let line = engine
        .add_series(SeriesKind::Line, SeriesOptions::default())
        .expect("series");
    let items: Vec<_> = (0..bars)
        .map(|i| SeriesDataItem::value(START + i * DAY, 50.0 + (i as f64 * 0.3).sin() * 10.0))
        .collect();
    engine.set_series_data(line, &items).expect("data");
    engine.on_animation_frame(0.0).expect("first frame");
    engine
}

#[test]
fn empty_time_scale_has_no_visible_range_or_coordinates() {
    let mut engine =
        ChartEngine::new(NullRenderer::default(), ChartOptions::default()).expect("engine");
    assert!(engine.visible_logical_range().is_none());
    assert!(engine.visible_range().is_none());
    assert!(engine.logical_to_coordinate(3.0).is_none());
    assert!(engine.coordinate_to_time(10.0).is_none());
}

#[test]
fn fit_content_is_queued_until_the_next_frame() {
    let mut engine = build_engine(100);
    let spacing_before = engine.bar_spacing();

    engine.fit_content();
    assert_eq!(engine.bar_spacing(), spacing_before);
    assert!(engine.has_pending_frame());

    engine.on_animation_frame(16.0).expect("frame");
    let range = engine.visible_logical_range().expect("range");
    assert_abs_diff_eq!(range.right(), 99.0, epsilon = 1e-9);
    assert!(range.left().abs() < 1.0, "left edge {}", range.left());
}

#[test]
fn last_queued_range_action_wins() {
    let mut engine = build_engine(200);
    engine.fit_content();
    engine
        .set_visible_logical_range(LogicalRange::new(120.0, 160.0))
        .expect("range");
    engine.on_animation_frame(16.0).expect("frame");

    let range = engine.visible_logical_range().expect("range");
    assert_abs_diff_eq!(range.right(), 160.0, epsilon = 1e-9);
    assert!((range.left() - 120.0).abs() < 1.0);
}

#[test]
fn invalid_ranges_are_rejected() {
    let mut engine = build_engine(20);
    assert!(
        engine
            .set_visible_logical_range(LogicalRange::new(10.0, 2.0))
            .is_err()
    );
    assert!(
        engine
            .set_visible_logical_range(LogicalRange::new(f64::NAN, 2.0))
            .is_err()
    );
    assert!(
        engine
            .set_visible_range(&Time::Timestamp(START + 5 * DAY), &Time::Timestamp(START))
            .is_err()
    );
    assert!(engine.set_bar_spacing(0.0).is_err());
    assert!(engine.set_right_offset(f64::INFINITY).is_err());
}

#[test]
fn visible_time_range_maps_back_to_bar_times() {
    let mut engine = build_engine(60);
    engine
        .set_visible_range(
            &Time::Timestamp(START + 10 * DAY),
            &Time::Timestamp(START + 30 * DAY),
        )
        .expect("range");
    engine.on_animation_frame(16.0).expect("frame");

    let (from, to) = engine.visible_range().expect("visible times");
    assert_eq!(to, Time::Timestamp(START + 30 * DAY));
    let Time::Timestamp(from) = from else {
        panic!("timestamps in, timestamps out");
    };
    assert!((from - (START + 10 * DAY)).abs() <= DAY);
}

#[test]
fn scrolling_into_the_past_keeps_two_bars_in_view() {
    let mut engine = build_engine(30);
    engine.set_right_offset(-1_000.0).expect("offset");
    engine.on_animation_frame(16.0).expect("frame");

    assert_abs_diff_eq!(engine.right_offset(), -28.0, epsilon = 1e-9);
    let (from, to) = engine.visible_range().expect("bars in view");
    assert_eq!(from, Time::Timestamp(START));
    assert_eq!(to, Time::Timestamp(START + DAY));
}

#[test]
fn wheel_zoom_keeps_the_logical_index_under_the_pointer() {
    let mut engine = build_engine(500);
    let x = 300.0;
    let before = engine.coordinate_to_logical(x).expect("logical");
    let spacing_before = engine.bar_spacing();

    let wheel = InputEvent::wheel(
        Point::new(x, 100.0),
        WheelDelta {
            delta_x: 0.0,
            delta_y: -100.0,
            mode: WheelDeltaMode::Pixel,
        },
        10.0,
    );
    let output = engine
        .handle_input(SurfaceId::PaneTop(0), &wheel)
        .expect("wheel");
    assert!(output.prevent_default);
    assert!(engine.bar_spacing() > spacing_before);

    let after = engine.coordinate_to_logical(x).expect("logical");
    assert_abs_diff_eq!(before, after, epsilon = 1e-9);
}

#[test]
fn animated_scroll_runs_its_full_duration_on_frame_time() {
    let mut engine = build_engine(300);
    engine.set_right_offset(-50.0).expect("offset");
    // The host frame clock is already well ahead of engine construction.
    engine.on_animation_frame(5_000.0).expect("frame");
    assert_abs_diff_eq!(engine.scroll_position(), -50.0, epsilon = 1e-9);

    engine.scroll_to_real_time().expect("scroll");

    let report = engine.on_animation_frame(5_016.0).expect("frame");
    assert!(report.animating);
    assert_abs_diff_eq!(engine.scroll_position(), -50.0, epsilon = 1e-9);

    let report = engine.on_animation_frame(5_216.0).expect("frame");
    assert!(report.animating);
    assert_abs_diff_eq!(engine.scroll_position(), -25.0, epsilon = 1e-9);

    let report = engine.on_animation_frame(5_416.0).expect("frame");
    assert!(!report.animating);
    assert_abs_diff_eq!(engine.scroll_position(), 0.0, epsilon = 1e-9);
    engine.on_animation_frame(5_432.0).expect("frame");
    assert!(!engine.has_pending_frame());
}

#[test]
fn reset_restores_default_spacing_and_offset() {
    let mut engine = build_engine(100);
    engine.set_bar_spacing(20.0).expect("spacing");
    engine.set_right_offset(-10.0).expect("offset");
    engine.on_animation_frame(16.0).expect("frame");
    assert_abs_diff_eq!(engine.bar_spacing(), 20.0, epsilon = 1e-9);

    engine.reset_time_scale();
    engine.on_animation_frame(32.0).expect("frame");
    assert_abs_diff_eq!(engine.bar_spacing(), 6.0, epsilon = 1e-9);
    assert_abs_diff_eq!(engine.right_offset(), 0.0, epsilon = 1e-9);
}

#[test]
fn time_and_coordinate_queries_agree() {
    let engine = build_engine(50);
    let time = Time::Timestamp(START + 42 * DAY);
    let x = engine
        .time_to_coordinate(&time)
        .expect("valid time")
        .expect("bar exists");
    assert_eq!(engine.coordinate_to_time(x), Some(time));
    assert_eq!(
        engine
            .time_to_coordinate(&Time::Timestamp(START + 42 * DAY + 1))
            .expect("valid time"),
        None
    );
}
