use crate::core::Viewport;
use crate::error::ChartResult;
use crate::interaction::{CrosshairState, InteractionMode};
use crate::model::ChartModel;
use crate::render::Renderer;

use super::{ChartOptions, engine_core::EngineCore, render_coordinator::RenderCoordinator};

/// Main orchestration facade consumed by host applications.
///
/// `ChartEngine` owns the chart model, the canvas bindings and pointer
/// state. Mutations only mark work as pending; the host drives drawing by
/// calling `on_animation_frame` whenever `has_pending_frame` is true.
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) core: EngineCore,
}

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn options(&self) -> &ChartOptions {
        &self.core.options
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.core.options.viewport
    }

    /// Read access to the underlying model for queries the facade does not
    /// wrap.
    #[must_use]
    pub fn model(&self) -> &ChartModel {
        &self.core.model
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.core.runtime.pointer.mode
    }

    #[must_use]
    pub fn crosshair(&self) -> CrosshairState {
        self.core.runtime.pointer.crosshair
    }

    /// Redraws every canvas immediately, outside the frame loop.
    pub fn render(&mut self) -> ChartResult<usize> {
        self.relayout()?;
        RenderCoordinator::render_all(self)
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
