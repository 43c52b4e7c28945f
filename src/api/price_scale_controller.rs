use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::model::{
    InvalidationLevel, PriceRange, PriceScaleId, PriceScaleMode, PriceScaleOptions,
    PriceScaleStateChange,
};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    pub fn price_scale_options(
        &self,
        pane_index: usize,
        id: &PriceScaleId,
    ) -> ChartResult<PriceScaleOptions> {
        self.core
            .model
            .pane(pane_index)
            .ok_or(ChartError::UnknownPane(pane_index))?
            .price_scale(id)
            .map(|scale| scale.options())
            .ok_or_else(|| ChartError::InvalidData(format!("unknown price scale `{id}`")))
    }

    /// Replaces one scale's options; margins are validated first.
    pub fn apply_price_scale_options(
        &mut self,
        pane_index: usize,
        id: &PriceScaleId,
        options: PriceScaleOptions,
    ) -> ChartResult<()> {
        self.core
            .model
            .apply_price_scale_options(pane_index, id, options)?;
        debug!(pane = pane_index, scale = %id, mode = ?options.mode, "price scale options applied");
        Ok(())
    }

    /// Switches mode, keeping the visible window where the transform allows.
    pub fn set_price_scale_mode(
        &mut self,
        pane_index: usize,
        id: &PriceScaleId,
        mode: PriceScaleMode,
    ) -> ChartResult<()> {
        self.core.model.price_scale_mut(pane_index, id)?.set_mode(PriceScaleStateChange {
            mode: Some(mode),
            ..PriceScaleStateChange::default()
        });
        self.core.model.recalculate_pane(pane_index);
        self.core
            .model
            .invalidate_pane(pane_index, InvalidationLevel::Light, true);
        Ok(())
    }

    pub fn set_price_scale_auto_scale(
        &mut self,
        pane_index: usize,
        id: &PriceScaleId,
        auto_scale: bool,
    ) -> ChartResult<()> {
        self.core
            .model
            .price_scale_mut(pane_index, id)?
            .set_auto_scale(auto_scale);
        self.core.model.recalculate_pane(pane_index);
        self.core
            .model
            .invalidate_pane(pane_index, InvalidationLevel::Light, auto_scale);
        Ok(())
    }

    /// Visible range in display units, `None` before the first autoscale.
    pub fn price_range(&self, pane_index: usize, id: &PriceScaleId) -> ChartResult<Option<PriceRange>> {
        self.core
            .model
            .pane(pane_index)
            .ok_or(ChartError::UnknownPane(pane_index))?
            .price_scale(id)
            .map(|scale| scale.visible_price_range())
            .ok_or_else(|| ChartError::InvalidData(format!("unknown price scale `{id}`")))
    }

    /// Pins a scale to `[min, max]` and disables its autoscale.
    pub fn set_visible_price_range(
        &mut self,
        pane_index: usize,
        id: &PriceScaleId,
        min: f64,
        max: f64,
    ) -> ChartResult<()> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ChartError::InvalidData(
                "price range bounds must be finite with min < max".to_owned(),
            ));
        }
        self.core
            .model
            .price_scale_mut(pane_index, id)?
            .set_visible_price_range(PriceRange::new(min, max));
        debug!(pane = pane_index, scale = %id, min, max, "visible price range pinned");
        self.core
            .model
            .invalidate_pane(pane_index, InvalidationLevel::Light, false);
        Ok(())
    }
}
