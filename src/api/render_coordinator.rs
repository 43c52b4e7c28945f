use tracing::trace;

use crate::error::ChartResult;
use crate::model::{
    InvalidateMask, InvalidationLevel, PriceScaleId, PriceTickMark, StrictRange, TimeAxisMark,
};
use crate::render::{PriceAxisSide, RenderFrame, Renderer};

use super::ChartEngine;

/// Tick marks and visible range shared by every canvas of one pass.
pub(super) struct SceneInputs {
    pub(super) visible: Option<StrictRange>,
    pub(super) time_marks: Vec<TimeAxisMark>,
    /// Per pane: left then right scale marks.
    pub(super) price_marks: Vec<[Vec<PriceTickMark>; 2]>,
}

impl SceneInputs {
    pub(super) fn price_marks(&self, pane_index: usize, side: PriceAxisSide) -> &[PriceTickMark] {
        let slot = match side {
            PriceAxisSide::Left => 0,
            PriceAxisSide::Right => 1,
        };
        self.price_marks
            .get(pane_index)
            .map_or(&[], |marks| marks[slot].as_slice())
    }
}

pub(super) struct RenderCoordinator;

impl RenderCoordinator {
    /// Draws what `mask` invalidated: main canvases and price axes of
    /// Light/Full panes, top canvases down to Cursor, the time axis on Light.
    pub(super) fn render<R: Renderer>(
        engine: &mut ChartEngine<R>,
        mask: &InvalidateMask,
    ) -> ChartResult<usize> {
        let pane_levels: Vec<InvalidationLevel> = (0..engine.core.model.panes().len())
            .map(|pane_index| mask.invalidation_for_pane(pane_index).level)
            .collect();
        let time_axis = mask.max_level() >= InvalidationLevel::Light;
        Self::render_surfaces(engine, &pane_levels, time_axis)
    }

    pub(super) fn render_all<R: Renderer>(engine: &mut ChartEngine<R>) -> ChartResult<usize> {
        let pane_levels = vec![InvalidationLevel::Full; engine.core.model.panes().len()];
        Self::render_surfaces(engine, &pane_levels, true)
    }

    fn render_surfaces<R: Renderer>(
        engine: &mut ChartEngine<R>,
        pane_levels: &[InvalidationLevel],
        time_axis: bool,
    ) -> ChartResult<usize> {
        let inputs = engine.collect_scene_inputs(pane_levels, time_axis);
        let mut frames: Vec<RenderFrame> = Vec::new();
        for (pane_index, level) in pane_levels.iter().enumerate() {
            if *level >= InvalidationLevel::Light {
                frames.extend(engine.pane_main_frame(pane_index, &inputs));
                for side in [PriceAxisSide::Left, PriceAxisSide::Right] {
                    frames.extend(engine.price_axis_frame(
                        pane_index,
                        side,
                        inputs.price_marks(pane_index, side),
                    ));
                }
            }
            if *level >= InvalidationLevel::Cursor {
                frames.extend(engine.pane_top_frame(pane_index));
            }
        }
        if time_axis {
            frames.extend(engine.time_axis_frame(&inputs.time_marks));
        }

        for frame in &frames {
            engine.renderer.render(frame)?;
        }
        trace!(canvases = frames.len(), "render pass finished");
        Ok(frames.len())
    }
}

impl<R: Renderer> ChartEngine<R> {
    /// Builds tick marks only for surfaces the pass draws; a cursor pass
    /// needs none.
    fn collect_scene_inputs(
        &mut self,
        pane_levels: &[InvalidationLevel],
        time_axis: bool,
    ) -> SceneInputs {
        let font_size = self.core.options.layout.font_size;
        let visible = self.core.model.time_scale_mut().visible_strict_range();
        let any_main = pane_levels
            .iter()
            .any(|level| *level >= InvalidationLevel::Light);
        let time_marks = if time_axis || any_main {
            self.core.model.time_scale_mut().time_axis_marks(font_size)
        } else {
            Vec::new()
        };
        let mut price_marks = Vec::with_capacity(pane_levels.len());
        for (pane_index, level) in pane_levels.iter().enumerate() {
            if *level < InvalidationLevel::Light {
                price_marks.push([Vec::new(), Vec::new()]);
                continue;
            }
            let mut marks_for = |id: PriceScaleId| {
                self.core
                    .model
                    .price_scale_mut(pane_index, &id)
                    .map(|scale| scale.tick_marks(font_size).to_vec())
                    .unwrap_or_default()
            };
            price_marks.push([marks_for(PriceScaleId::left()), marks_for(PriceScaleId::right())]);
        }
        SceneInputs {
            visible,
            time_marks,
            price_marks,
        }
    }
}
