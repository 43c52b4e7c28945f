use tracing::debug;

use crate::error::ChartResult;
use crate::model::ChartModel;
use crate::render::Renderer;

use super::{
    ChartEngine, ChartOptions, chart_presentation::ChartPresentationState,
    chart_runtime::ChartRuntimeState, engine_core::EngineCore,
};

impl<R: Renderer> ChartEngine<R> {
    /// Creates an engine. Animations run on the timestamps the host passes
    /// to `on_animation_frame`.
    pub fn new(renderer: R, options: ChartOptions) -> ChartResult<Self> {
        options.validate()?;
        let model = ChartModel::new(
            options.time_scale,
            options.left_price_scale,
            options.right_price_scale,
        );
        let presentation = ChartPresentationState::new(options.device_pixel_ratio);
        let mut engine = Self {
            renderer,
            core: EngineCore {
                options,
                model,
                presentation,
                runtime: ChartRuntimeState::new(),
            },
        };
        engine.relayout()?;
        debug!(
            width = engine.core.options.viewport.width,
            height = engine.core.options.viewport.height,
            auto_size = engine.core.options.auto_size,
            "chart engine created"
        );
        Ok(engine)
    }
}
