use crate::error::ChartResult;
use crate::render::Renderer;

use super::{
    ChartEngine, EngineSnapshot, PaneSnapshot, PriceScaleSnapshot, SeriesSnapshot,
};

impl<R: Renderer> ChartEngine<R> {
    /// Captures layout, scale and series state for diagnostics.
    pub fn snapshot(&mut self) -> EngineSnapshot {
        let visible_logical_range = self.core.model.time_scale_mut().visible_logical_range();
        let model = &self.core.model;
        let panes = model
            .panes()
            .iter()
            .map(|pane| PaneSnapshot {
                height: pane.height(),
                stretch_factor: pane.stretch_factor(),
                series: pane.series().to_vec(),
                price_scales: pane
                    .price_scales()
                    .map(|scale| {
                        let mode = scale.mode();
                        PriceScaleSnapshot {
                            id: scale.id().as_str().to_owned(),
                            mode: mode.mode,
                            auto_scale: mode.auto_scale,
                            inverted: mode.is_inverted,
                            range: scale.visible_price_range(),
                        }
                    })
                    .collect(),
                primitives: pane
                    .primitives()
                    .iter()
                    .map(|primitive| primitive.id().to_owned())
                    .collect(),
            })
            .collect();
        let series = model
            .series_iter()
            .map(|series| {
                let rows = model.time_index().series_rows(series.id());
                SeriesSnapshot {
                    id: series.id(),
                    kind: series.kind(),
                    pane_index: series.options().pane_index,
                    price_scale_id: series.options().price_scale_id.clone(),
                    rows: rows.map_or(0, |rows| rows.len()),
                    first_index: rows.and_then(|rows| rows.first_index()),
                    last_index: rows.and_then(|rows| rows.last_index()),
                }
            })
            .collect();
        EngineSnapshot {
            viewport: self.core.options.viewport,
            layout: self.core.presentation.layout.clone(),
            bars_len: model.time_index().len(),
            bar_spacing: model.time_scale().bar_spacing(),
            right_offset: model.time_scale().right_offset(),
            visible_logical_range,
            panes,
            series,
            crosshair: self.core.runtime.pointer.crosshair,
            interaction_mode: self.core.runtime.pointer.mode,
            frame_stats: self.core.runtime.frame_stats,
            time_label_cache: model.time_scale().label_cache_stats(),
            text_width_cache: self.core.presentation.text_cache.stats(),
        }
    }

    /// Pretty JSON of `snapshot()` for fixture-based regression checks.
    pub fn snapshot_json_pretty(&mut self) -> ChartResult<String> {
        let snapshot = self.snapshot();
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }
}
