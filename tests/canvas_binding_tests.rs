use std::cell::RefCell;
use std::rc::Rc;

use chart_engine::ChartError;
use chart_engine::api::{ChartEngine, ChartOptions};
use chart_engine::core::{Point, SeriesDataItem, SeriesKind, SeriesOptions};
use chart_engine::render::{BitmapSize, NullRenderer, PriceAxisSide, ResizeSource, SurfaceId};

fn engine_with_data() -> ChartEngine<NullRenderer> {
    let mut engine = ChartEngine::new(NullRenderer::default(), ChartOptions::default()).expect("engine");
    let series = engine
        .add_series(SeriesKind::Area, SeriesOptions::default())
        .expect("series");
    let items: Vec<_> = (0..40)
        .map(|i| SeriesDataItem::value(1_700_006_400 + i * 3_600, 10.0 + i as f64))
        .collect();
    engine.set_series_data(series, &items).expect("data");
    engine.on_animation_frame(0.0).expect("frame");
    engine
}

#[test]
fn layout_tiles_the_viewport() {
    let engine = engine_with_data();
    let layout = engine.layout();
    assert_eq!(layout.left_axis_width, 0.0);
    assert!(layout.right_axis_width > 0.0);
    assert_eq!(layout.right_axis_width % 2.0, 0.0);
    assert!((layout.pane_width + layout.right_axis_width - 800.0).abs() <= 1e-9);
    let panes_height: f64 = layout.panes.iter().map(|pane| pane.height).sum();
    assert!((panes_height + layout.time_axis_height - 600.0).abs() <= 1e-9);
    assert_eq!(
        layout.time_axis_height,
        engine.options().layout.font_size + 16.0
    );
}

#[test]
fn bitmap_sizes_follow_the_device_pixel_ratio_on_the_next_frame() {
    let mut engine = engine_with_data();
    let pane = SurfaceId::PaneMain(0);
    let media = engine.canvas_binding(pane).expect("binding").media_size();
    let before = engine.canvas_binding(pane).expect("binding").bitmap_size();
    assert_eq!(before.width, media.width.round() as u32);

    engine.set_device_pixel_ratio(2.0).expect("ratio");
    let binding = engine.canvas_binding(pane).expect("binding");
    assert_eq!(binding.bitmap_size(), before);
    assert!(binding.suggested_bitmap_size().is_some());

    engine.on_animation_frame(16.0).expect("frame");
    let binding = engine.canvas_binding(pane).expect("binding");
    assert_eq!(binding.bitmap_size().width, (media.width * 2.0).round() as u32);
    assert_eq!(binding.bitmap_size().height, (media.height * 2.0).round() as u32);
    assert!(binding.suggested_bitmap_size().is_none());
    let target = binding.rendering_target().expect("target");
    assert!((target.horizontal_pixel_ratio - 2.0).abs() <= 1e-2);
    assert_eq!(engine.options().device_pixel_ratio, 2.0);
}

#[test]
fn device_pixel_content_box_overrides_ratio_sizing() {
    let mut engine = engine_with_data();
    let pane = SurfaceId::PaneMain(0);
    engine
        .on_device_pixel_content_box(pane, BitmapSize::new(1_001, 901))
        .expect("content box");
    engine.on_animation_frame(16.0).expect("frame");

    let binding = engine.canvas_binding(pane).expect("binding");
    assert_eq!(binding.resize_source(), ResizeSource::DevicePixelContentBox);
    assert_eq!(binding.bitmap_size(), BitmapSize::new(1_001, 901));

    engine.set_device_pixel_ratio(3.0).expect("ratio");
    engine.on_animation_frame(32.0).expect("frame");
    let binding = engine.canvas_binding(pane).expect("binding");
    assert_eq!(binding.bitmap_size(), BitmapSize::new(1_001, 901));

    let hidden_axis = SurfaceId::PriceAxis {
        pane: 0,
        side: PriceAxisSide::Left,
    };
    assert!(matches!(
        engine.on_device_pixel_content_box(hidden_axis, BitmapSize::new(10, 10)),
        Err(ChartError::InvalidData(_))
    ));
}

#[test]
fn bitmap_listeners_fire_when_the_size_is_committed() {
    let mut engine = engine_with_data();
    let seen: Rc<RefCell<Vec<(BitmapSize, BitmapSize)>>> = Rc::default();
    let sink = Rc::clone(&seen);
    engine
        .canvas_binding_mut(SurfaceId::TimeAxis)
        .expect("time axis binding")
        .subscribe_bitmap_size_changed(move |old, new| sink.borrow_mut().push((old, new)));

    engine.resize(640, 480).expect("resize");
    assert!(seen.borrow().is_empty());
    engine.on_animation_frame(16.0).expect("frame");

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    let (old, new) = seen[0];
    assert_ne!(old, new);
    assert!(new.width < old.width);
}

#[test]
fn resize_validation_and_container_sizing() {
    let mut engine = engine_with_data();
    assert!(matches!(
        engine.resize(0, 300),
        Err(ChartError::InvalidViewport { width: 0, height: 300 })
    ));
    assert!(!engine.on_container_resized(500, 400).expect("ignored"));
    assert_eq!(engine.viewport().width, 800);

    let mut options = engine.options().clone();
    options.auto_size = true;
    engine.apply_options(options).expect("auto size");
    assert!(engine.on_container_resized(500, 400).expect("resized"));
    assert_eq!(engine.viewport().width, 500);
    assert!(!engine.on_container_resized(0, 0).expect("hidden container"));
    assert_eq!(engine.viewport().height, 400);
}

#[test]
fn invalid_device_pixel_ratio_is_rejected() {
    let mut engine = engine_with_data();
    assert!(engine.set_device_pixel_ratio(0.0).is_err());
    assert!(engine.set_device_pixel_ratio(f64::NAN).is_err());
    assert_eq!(engine.device_pixel_ratio(), 1.0);
}

#[test]
fn hit_surface_resolves_chart_points() {
    let engine = engine_with_data();
    let layout = engine.layout();
    let (surface, local) = layout
        .hit_surface(Point::new(10.0, 10.0))
        .expect("pane hit");
    assert_eq!(surface, SurfaceId::PaneTop(0));
    assert_eq!(local, Point::new(10.0, 10.0));

    let axis_x = layout.pane_width + 1.0;
    let (surface, _) = layout
        .hit_surface(Point::new(axis_x, 10.0))
        .expect("axis hit");
    assert_eq!(
        surface,
        SurfaceId::PriceAxis {
            pane: 0,
            side: PriceAxisSide::Right
        }
    );

    let (surface, local) = layout
        .hit_surface(Point::new(20.0, 599.0))
        .expect("time axis hit");
    assert_eq!(surface, SurfaceId::TimeAxis);
    assert!((local.y - (599.0 - (600.0 - layout.time_axis_height))).abs() <= 1e-9);
}
