use indexmap::IndexMap;

use crate::core::Point;
use crate::extensions::ChartPlugin;
use crate::interaction::{CrosshairState, GestureRecognizer, InteractionMode, KineticAnimation};
use crate::model::{LogicalRange, PriceScaleId};
use crate::render::SurfaceId;

use super::{FrameStats, subscriptions::Subscriptions};

/// Pointer-driven state carried between input events.
#[derive(Debug, Default)]
pub(super) struct PointerRuntime {
    pub(super) mode: InteractionMode,
    pub(super) crosshair: CrosshairState,
    /// Pane and pane-local point the crosshair follows.
    pub(super) hover: Option<(usize, Point)>,
    pub(super) recognizers: IndexMap<SurfaceId, GestureRecognizer>,
    /// Velocity tracker of the current pane drag, when kinetic scroll applies.
    pub(super) kinetic: Option<KineticAnimation>,
    pub(super) pinch_prev_scale: f64,
    /// Pane and price scale dragged by the current pane scroll.
    pub(super) scroll_target: Option<(usize, PriceScaleId)>,
    /// Price axis dragged by the current axis scale.
    pub(super) price_axis_target: Option<(usize, PriceScaleId)>,
}

/// Runtime orchestration state grouped separately from model/presentation.
pub(super) struct ChartRuntimeState {
    pub(super) plugins: Vec<Box<dyn ChartPlugin>>,
    pub(super) subscriptions: Subscriptions,
    pub(super) pointer: PointerRuntime,
    pub(super) frame_stats: FrameStats,
    pub(super) last_visible_range: Option<LogicalRange>,
}

impl ChartRuntimeState {
    #[must_use]
    pub(super) fn new() -> Self {
        Self {
            plugins: Vec::new(),
            subscriptions: Subscriptions::default(),
            pointer: PointerRuntime {
                pinch_prev_scale: 1.0,
                ..PointerRuntime::default()
            },
            frame_stats: FrameStats::default(),
            last_visible_range: None,
        }
    }
}
