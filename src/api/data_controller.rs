use tracing::debug;

use crate::core::{
    DataChange, MismatchDirection, SeriesDataItem, SeriesId, SeriesKind, SeriesOptions,
    SeriesPoint, TimePointIndex,
};
use crate::error::{ChartError, ChartResult};
use crate::extensions::PluginEvent;
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Creates a series on the pane and price scale named in `options`.
    pub fn add_series(&mut self, kind: SeriesKind, options: SeriesOptions) -> ChartResult<SeriesId> {
        let id = self.core.model.add_series(kind, options)?;
        // A new left/right scale may need an axis.
        self.relayout()?;
        Ok(id)
    }

    /// Drops the series, its rows and the times only it used.
    pub fn remove_series(&mut self, id: SeriesId) -> ChartResult<()> {
        self.core.model.remove_series(id)?;
        self.relayout()?;
        self.emit_plugin_event(PluginEvent::SeriesRemoved { series: id });
        Ok(())
    }

    /// Replaces every row of `id`. Items must be strictly ascending by time.
    pub fn set_series_data(&mut self, id: SeriesId, items: &[SeriesDataItem]) -> ChartResult<DataChange> {
        let change = self.core.model.set_series_data(id, items)?;
        self.emit_data_updated(id);
        Ok(change)
    }

    /// Appends a bar after the last one, or amends the last bar when the time
    /// matches. Older times fail with `OutOfOrderUpdate`.
    pub fn update_series(&mut self, id: SeriesId, item: &SeriesDataItem) -> ChartResult<DataChange> {
        let change = self.core.model.update_series(id, item)?;
        self.emit_data_updated(id);
        Ok(change)
    }

    pub fn apply_series_options(&mut self, id: SeriesId, options: SeriesOptions) -> ChartResult<()> {
        self.core.model.apply_series_options(id, options)
    }

    pub fn series_options(&self, id: SeriesId) -> ChartResult<&SeriesOptions> {
        self.core
            .model
            .series(id)
            .map(|series| series.options())
            .ok_or(ChartError::UnknownSeries(id))
    }

    pub fn series_kind(&self, id: SeriesId) -> ChartResult<SeriesKind> {
        self.core
            .model
            .series(id)
            .map(|series| series.kind())
            .ok_or(ChartError::UnknownSeries(id))
    }

    /// Rows of `id` in index order; whitespace items have no row.
    pub fn series_data(&self, id: SeriesId) -> ChartResult<&[SeriesPoint]> {
        if self.core.model.series(id).is_none() {
            return Err(ChartError::UnknownSeries(id));
        }
        Ok(self
            .core
            .model
            .time_index()
            .series_rows(id)
            .map_or(&[], |rows| rows.rows()))
    }

    /// Row of `id` at logical `index`; `direction` picks a neighbour on a miss.
    pub fn data_by_index(
        &self,
        id: SeriesId,
        index: TimePointIndex,
        direction: MismatchDirection,
    ) -> ChartResult<Option<&SeriesPoint>> {
        if self.core.model.series(id).is_none() {
            return Err(ChartError::UnknownSeries(id));
        }
        Ok(self.core.model.data_by_index(id, index, direction))
    }

    #[must_use]
    pub fn series_ids(&self) -> Vec<SeriesId> {
        self.core.model.series_iter().map(|series| series.id()).collect()
    }

    /// Length of the merged time index across every series.
    #[must_use]
    pub fn bars_len(&self) -> usize {
        self.core.model.time_index().len()
    }

    fn emit_data_updated(&mut self, series: SeriesId) {
        let bars_len = self.bars_len();
        debug!(series = %series, bars_len, "series data changed");
        self.emit_plugin_event(PluginEvent::DataUpdated { series, bars_len });
    }
}
