use chart_engine::api::{ChartEngine, ChartOptions, EngineSnapshot};
use chart_engine::core::{SeriesDataItem, SeriesKind, SeriesOptions, Viewport};
use chart_engine::model::PriceScaleMode;
use chart_engine::render::{NullRenderer, SurfaceId};
use chart_engine::ChartError;

const START: i64 = 1_700_006_400;

fn two_pane_engine() -> ChartEngine<NullRenderer> {
    let mut engine = ChartEngine::new(NullRenderer::default(), ChartOptions::default()).expect("engine");
    let candles = engine
        .add_series(SeriesKind::Candlestick, SeriesOptions::default())
        .expect("candles");
    let lower = engine.add_pane(3.0).expect("pane");
    let volume = engine
        .add_series(
            SeriesKind::Histogram,
            SeriesOptions {
                pane_index: lower,
                ..SeriesOptions::default()
            },
        )
        .expect("volume");
    let bars: Vec<_> = (0..30)
        .map(|i| {
            let mid = 20.0 + i as f64;
            SeriesDataItem::ohlc(START + i * 60, mid, mid + 1.0, mid - 1.0, mid + 0.5)
        })
        .collect();
    engine.set_series_data(candles, &bars).expect("candles");
    let volumes: Vec<_> = (10..30)
        .map(|i| SeriesDataItem::value(START + i * 60, 1_000.0 + i as f64))
        .collect();
    engine.set_series_data(volume, &volumes).expect("volume");
    engine.on_animation_frame(0.0).expect("frame");
    engine
}

#[test]
fn snapshot_describes_panes_series_and_scales() {
    let mut engine = two_pane_engine();
    let snapshot = engine.snapshot();

    assert_eq!(snapshot.viewport, Viewport::new(800, 600));
    assert_eq!(snapshot.bars_len, 30);
    assert_eq!(snapshot.panes.len(), 2);
    assert_eq!(snapshot.panes[0].height, 143.0);
    assert_eq!(snapshot.panes[1].height, 429.0);
    assert_eq!(snapshot.panes[1].stretch_factor, 3.0);

    let volume = &snapshot.series[1];
    assert_eq!(volume.kind, SeriesKind::Histogram);
    assert_eq!(volume.pane_index, 1);
    assert_eq!(volume.rows, 20);
    assert_eq!(volume.first_index, Some(10));
    assert_eq!(volume.last_index, Some(29));

    let right = snapshot.panes[0]
        .price_scales
        .iter()
        .find(|scale| scale.id == "right")
        .expect("right scale");
    assert!(right.auto_scale);
    assert_eq!(right.mode, PriceScaleMode::Normal);
    assert!(right.range.is_some());
    assert_eq!(snapshot.frame_stats.frames, 1);
}

#[test]
fn snapshot_json_parses_back_to_the_same_state() {
    let mut engine = two_pane_engine();
    let json = engine.snapshot_json_pretty().expect("json");
    assert!(json.contains("\"bars_len\": 30"));
    let parsed: EngineSnapshot = serde_json::from_str(&json).expect("parse");
    assert_eq!(parsed, engine.snapshot());
}

#[test]
fn options_json_round_trip_and_validation() {
    let mut options = ChartOptions::default();
    options.time_scale.bar_spacing = 9.0;
    options.layout.font_size = 13.0;
    let json = options.to_json_pretty().expect("json");
    let parsed = ChartOptions::from_json_str(&json).expect("parse");
    assert_eq!(parsed, options);

    assert!(matches!(
        ChartOptions::from_json_str("{\"viewport\": 12}"),
        Err(ChartError::InvalidOptions(_))
    ));
    let partial = ChartOptions::from_json_str(r#"{"viewport":{"width":320,"height":200}}"#)
        .expect("partial");
    assert_eq!(partial.viewport, Viewport::new(320, 200));
    assert_eq!(partial.time_scale.bar_spacing, 6.0);
}

#[test]
fn applying_options_relayouts_without_losing_data() {
    let mut engine = two_pane_engine();
    engine
        .apply_options_json(r#"{"left_price_scale":{"visible":true},"layout":{"font_size":16}}"#)
        .expect("patch");
    engine.on_animation_frame(16.0).expect("frame");

    let layout = engine.layout();
    assert!(layout.left_axis_width > 0.0);
    assert_eq!(layout.time_axis_height, 32.0);
    assert!(engine.canvas_binding(SurfaceId::PriceAxis {
        pane: 1,
        side: chart_engine::render::PriceAxisSide::Left
    })
    .is_some());
    assert_eq!(engine.bars_len(), 30);
}

#[test]
fn removing_a_pane_drops_its_series() {
    let mut engine = two_pane_engine();
    assert!(matches!(engine.remove_pane(5), Err(ChartError::UnknownPane(5))));
    engine.remove_pane(1).expect("remove");
    assert_eq!(engine.pane_count(), 1);
    assert_eq!(engine.series_ids().len(), 1);
    assert_eq!(engine.pane_heights(), vec![572.0]);
    assert!(matches!(engine.remove_pane(0), Err(ChartError::InvalidData(_))));
    assert!(engine.canvas_binding(SurfaceId::PaneMain(1)).is_none());
}
