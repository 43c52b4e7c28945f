use serde::{Deserialize, Serialize};

use crate::core::{SeriesId, Viewport};
use crate::interaction::{CrosshairState, InteractionMode};
use crate::model::{AutoScaleInfo, LogicalRange, PriceScale, StrictRange, TimeScale};
use crate::render::{LayerPrimitives, MediaSize};

/// Read-only state snapshot passed to plugin hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub viewport: Viewport,
    pub visible_logical_range: Option<LogicalRange>,
    pub bar_spacing: f64,
    pub right_offset: f64,
    pub bars_len: usize,
    pub series_count: usize,
    pub interaction_mode: InteractionMode,
    pub crosshair: CrosshairState,
}

/// Event stream exposed to plugins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PluginEvent {
    DataUpdated { series: SeriesId, bars_len: usize },
    SeriesRemoved { series: SeriesId },
    VisibleRangeChanged { from: f64, to: f64 },
    CrosshairMoved { x: f64, y: f64 },
    CrosshairHidden,
    ScrollStarted,
    ScrollEnded,
    Rendered { canvases: usize },
}

/// Extension hook interface for bounded custom logic.
///
/// Plugins can observe events and read engine context without mutating core
/// internals directly.
pub trait ChartPlugin {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: PluginEvent, context: PluginContext);
}

/// What a pane primitive sees while drawing.
pub struct PrimitiveDrawContext<'a> {
    pub pane_index: usize,
    pub media_size: MediaSize,
    pub horizontal_pixel_ratio: f64,
    pub vertical_pixel_ratio: f64,
    pub time_scale: &'a TimeScale,
    pub price_scale: &'a PriceScale,
    /// Base for percentage and indexed price modes.
    pub base_value: f64,
}

impl PrimitiveDrawContext<'_> {
    #[must_use]
    pub fn price_to_coordinate(&self, price: f64) -> f64 {
        self.price_scale.price_to_coordinate(price, self.base_value)
    }

    #[must_use]
    pub fn logical_to_coordinate(&self, logical: f64) -> f64 {
        self.time_scale.logical_to_coordinate(logical)
    }
}

impl std::fmt::Debug for PrimitiveDrawContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveDrawContext")
            .field("pane_index", &self.pane_index)
            .field("media_size", &self.media_size)
            .finish_non_exhaustive()
    }
}

/// Custom drawing attached to a pane and invoked during the draw phase.
///
/// Output shapes follow frame conventions: geometry in bitmap space, text in
/// media space.
pub trait PanePrimitive {
    fn id(&self) -> &str;

    /// Main-canvas content, redrawn on light and full passes.
    fn draw(&self, context: &PrimitiveDrawContext<'_>, out: &mut LayerPrimitives);

    /// Top-canvas content, redrawn on every pass including cursor-only ones.
    fn draw_top(&self, _context: &PrimitiveDrawContext<'_>, _out: &mut LayerPrimitives) {}

    /// Object id under the media-space point, if any.
    fn hit_test(&self, _x: f64, _y: f64, _context: &PrimitiveDrawContext<'_>) -> Option<String> {
        None
    }

    /// Extra range the pane's default price scale must include.
    fn autoscale_info(&self, _visible: StrictRange) -> Option<AutoScaleInfo> {
        None
    }
}
