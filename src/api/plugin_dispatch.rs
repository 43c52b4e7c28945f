use crate::extensions::{PluginContext, PluginEvent};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    pub(super) fn plugin_context(&mut self) -> PluginContext {
        let visible_logical_range = self.core.model.time_scale_mut().visible_logical_range();
        let time_scale = self.core.model.time_scale();
        PluginContext {
            viewport: self.core.options.viewport,
            visible_logical_range,
            bar_spacing: time_scale.bar_spacing(),
            right_offset: time_scale.right_offset(),
            bars_len: self.core.model.time_index().len(),
            series_count: self.core.model.series_count(),
            interaction_mode: self.core.runtime.pointer.mode,
            crosshair: self.core.runtime.pointer.crosshair,
        }
    }

    pub(super) fn emit_plugin_event(&mut self, event: PluginEvent) {
        if self.core.runtime.plugins.is_empty() {
            return;
        }
        let context = self.plugin_context();
        for plugin in &mut self.core.runtime.plugins {
            plugin.on_event(event, context);
        }
    }
}
