use serde::{Deserialize, Serialize};

use crate::core::{SeriesId, SeriesKind, Viewport};
use crate::interaction::{CrosshairState, InteractionMode};
use crate::model::{LogicalRange, PriceRange, PriceScaleMode, TimeLabelCacheStats};
use crate::render::TextWidthCacheStats;

use super::{ChartLayout, FrameStats};

/// Serializable diagnostic view of the whole engine, used by regression
/// tests and debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub viewport: Viewport,
    pub layout: ChartLayout,
    pub bars_len: usize,
    pub bar_spacing: f64,
    pub right_offset: f64,
    pub visible_logical_range: Option<LogicalRange>,
    pub panes: Vec<PaneSnapshot>,
    pub series: Vec<SeriesSnapshot>,
    pub crosshair: CrosshairState,
    pub interaction_mode: InteractionMode,
    pub frame_stats: FrameStats,
    pub time_label_cache: TimeLabelCacheStats,
    pub text_width_cache: TextWidthCacheStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSnapshot {
    pub height: f64,
    pub stretch_factor: f64,
    pub series: Vec<SeriesId>,
    pub price_scales: Vec<PriceScaleSnapshot>,
    pub primitives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceScaleSnapshot {
    pub id: String,
    pub mode: PriceScaleMode,
    pub auto_scale: bool,
    pub inverted: bool,
    /// Visible range in display units.
    pub range: Option<PriceRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub id: SeriesId,
    pub kind: SeriesKind,
    pub pane_index: usize,
    pub price_scale_id: String,
    pub rows: usize,
    pub first_index: Option<i64>,
    pub last_index: Option<i64>,
}
