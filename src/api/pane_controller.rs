use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::extensions::{PanePrimitive, PluginEvent};
use crate::model::InvalidationLevel;
use crate::render::{Renderer, SurfaceId};

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.core.model.panes().len()
    }

    /// Appends a pane below the existing ones; returns its index.
    pub fn add_pane(&mut self, stretch_factor: f64) -> ChartResult<usize> {
        let index = self.core.model.add_pane(stretch_factor)?;
        self.relayout()?;
        Ok(index)
    }

    /// Removes a pane with its series. Later panes move up one index.
    pub fn remove_pane(&mut self, index: usize) -> ChartResult<()> {
        let removed = self.core.model.remove_pane(index)?;
        // Pane surfaces are renumbered; in-flight gestures on them are void.
        self.core
            .runtime
            .pointer
            .recognizers
            .retain(|surface, _| matches!(surface, SurfaceId::TimeAxis));
        if self
            .core
            .runtime
            .pointer
            .hover
            .is_some_and(|(pane, _)| pane >= index)
        {
            self.hide_crosshair();
        }
        self.relayout()?;
        for series in removed {
            self.emit_plugin_event(PluginEvent::SeriesRemoved { series });
        }
        Ok(())
    }

    pub fn set_pane_stretch_factor(&mut self, index: usize, stretch_factor: f64) -> ChartResult<()> {
        self.core.model.set_pane_stretch_factor(index, stretch_factor)?;
        self.relayout()
    }

    /// Height of every pane after the last layout pass.
    #[must_use]
    pub fn pane_heights(&self) -> Vec<f64> {
        self.core
            .presentation
            .layout
            .panes
            .iter()
            .map(|pane| pane.height)
            .collect()
    }

    /// Attaches a custom drawing to a pane. Its autoscale contribution is
    /// folded in on the next frame.
    pub fn attach_primitive(&mut self, pane_index: usize, primitive: Box<dyn PanePrimitive>) -> ChartResult<()> {
        let id = primitive.id().to_owned();
        if id.is_empty() {
            return Err(ChartError::InvalidData(
                "primitive id must not be empty".to_owned(),
            ));
        }
        let pane = self.core.model.pane_mut(pane_index)?;
        if pane.primitives().iter().any(|existing| existing.id() == id) {
            return Err(ChartError::InvalidData(format!(
                "primitive with id `{id}` is already attached to pane {pane_index}"
            )));
        }
        pane.attach_primitive(primitive);
        debug!(pane = pane_index, primitive = %id, "primitive attached");
        self.core.model.recalculate_pane(pane_index);
        self.core
            .model
            .invalidate_pane(pane_index, InvalidationLevel::Light, true);
        Ok(())
    }

    /// Detaches a primitive by id; `None` when the pane has no such primitive.
    pub fn detach_primitive(
        &mut self,
        pane_index: usize,
        id: &str,
    ) -> ChartResult<Option<Box<dyn PanePrimitive>>> {
        let detached = self.core.model.pane_mut(pane_index)?.detach_primitive(id);
        if detached.is_some() {
            debug!(pane = pane_index, primitive = id, "primitive detached");
            self.core.model.recalculate_pane(pane_index);
            self.core
                .model
                .invalidate_pane(pane_index, InvalidationLevel::Light, true);
        }
        Ok(detached)
    }
}
