use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{
    DataChange, MismatchDirection, PreparedItem, Series, SeriesDataItem, SeriesId, SeriesKind,
    SeriesOptions, SeriesPoint, TimeIndex, TimePointIndex,
};
use crate::error::{ChartError, ChartResult};

use super::pane::SeriesSource;
use super::{
    InvalidateMask, InvalidationLevel, LogicalRange, Pane, PaneInvalidation, PriceScale,
    PriceScaleId, PriceScaleOptions, TimeScale, TimeScaleAnimation, TimeScaleInvalidation,
    TimeScaleOptions,
};

/// Owns every piece of chart state and turns mutations into pending
/// invalidation masks for the next frame.
#[derive(Debug)]
pub struct ChartModel {
    time_scale: TimeScale,
    time_index: TimeIndex,
    series: IndexMap<SeriesId, Series>,
    next_series_id: u64,
    panes: Vec<Pane>,
    left_price_scale_options: PriceScaleOptions,
    right_price_scale_options: PriceScaleOptions,
    pending_invalidation: Option<InvalidateMask>,
}

impl ChartModel {
    #[must_use]
    pub fn new(
        time_scale_options: TimeScaleOptions,
        left_price_scale_options: PriceScaleOptions,
        right_price_scale_options: PriceScaleOptions,
    ) -> Self {
        Self {
            time_scale: TimeScale::new(time_scale_options),
            time_index: TimeIndex::new(),
            series: IndexMap::new(),
            next_series_id: 1,
            panes: vec![Pane::new(left_price_scale_options, right_price_scale_options)],
            left_price_scale_options,
            right_price_scale_options,
            pending_invalidation: Some(InvalidateMask::full()),
        }
    }

    #[must_use]
    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    pub fn time_scale_mut(&mut self) -> &mut TimeScale {
        &mut self.time_scale
    }

    #[must_use]
    pub fn time_index(&self) -> &TimeIndex {
        &self.time_index
    }

    #[must_use]
    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    #[must_use]
    pub fn pane(&self, index: usize) -> Option<&Pane> {
        self.panes.get(index)
    }

    pub fn pane_mut(&mut self, index: usize) -> ChartResult<&mut Pane> {
        self.panes.get_mut(index).ok_or(ChartError::UnknownPane(index))
    }

    #[must_use]
    pub fn series(&self, id: SeriesId) -> Option<&Series> {
        self.series.get(&id)
    }

    pub fn series_iter(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn set_width(&mut self, width: f64) -> ChartResult<()> {
        self.time_scale.set_width(width)?;
        self.recalculate_all_panes();
        self.invalidate(InvalidateMask::full());
        Ok(())
    }

    pub fn invalidate(&mut self, mask: InvalidateMask) {
        if let Some(pending) = &mut self.pending_invalidation {
            pending.merge(&mask);
        } else {
            self.pending_invalidation = Some(mask);
        }
    }

    #[must_use]
    pub fn pending_invalidation(&self) -> Option<&InvalidateMask> {
        self.pending_invalidation.as_ref()
    }

    pub fn take_pending_invalidation(&mut self) -> Option<InvalidateMask> {
        self.pending_invalidation.take()
    }

    pub fn full_update(&mut self) {
        self.invalidate(InvalidateMask::full());
    }

    pub fn light_update(&mut self) {
        self.invalidate(InvalidateMask::light());
    }

    pub fn cursor_update(&mut self) {
        self.invalidate(InvalidateMask::cursor());
    }

    pub fn invalidate_pane(&mut self, pane_index: usize, level: InvalidationLevel, auto_scale: bool) {
        let mut mask = InvalidateMask::new(InvalidationLevel::None);
        mask.invalidate_pane(pane_index, PaneInvalidation::new(level, auto_scale));
        self.invalidate(mask);
    }

    // Panes

    pub fn add_pane(&mut self, stretch_factor: f64) -> ChartResult<usize> {
        let mut pane = Pane::new(self.left_price_scale_options, self.right_price_scale_options);
        pane.set_stretch_factor(stretch_factor)?;
        self.panes.push(pane);
        debug!(panes = self.panes.len(), "pane added");
        self.full_update();
        Ok(self.panes.len() - 1)
    }

    /// Removes a pane and every series drawn in it. The last remaining pane
    /// cannot be removed.
    pub fn remove_pane(&mut self, index: usize) -> ChartResult<Vec<SeriesId>> {
        if index >= self.panes.len() {
            return Err(ChartError::UnknownPane(index));
        }
        if self.panes.len() == 1 {
            return Err(ChartError::InvalidData(
                "cannot remove the only pane".to_owned(),
            ));
        }
        let removed: Vec<SeriesId> = self.panes[index].series().to_vec();
        for id in &removed {
            self.remove_series(*id)?;
        }
        self.panes.remove(index);
        for series in self.series.values_mut() {
            let pane_index = series.options().pane_index;
            if pane_index > index {
                series.options_mut().pane_index = pane_index - 1;
            }
        }
        debug!(index, panes = self.panes.len(), "pane removed");
        self.full_update();
        Ok(removed)
    }

    pub fn set_pane_stretch_factor(&mut self, index: usize, stretch_factor: f64) -> ChartResult<()> {
        self.pane_mut(index)?.set_stretch_factor(stretch_factor)?;
        self.full_update();
        Ok(())
    }

    #[must_use]
    pub fn pane_stretch_factors(&self) -> Vec<f64> {
        self.panes.iter().map(Pane::stretch_factor).collect()
    }

    /// Replaces the left and right scale options of every pane, including
    /// panes added later.
    pub fn set_default_price_scale_options(
        &mut self,
        left: PriceScaleOptions,
        right: PriceScaleOptions,
    ) -> ChartResult<()> {
        for index in 0..self.panes.len() {
            self.price_scale_mut(index, &PriceScaleId::left())?.apply_options(left)?;
            self.price_scale_mut(index, &PriceScaleId::right())?.apply_options(right)?;
        }
        self.left_price_scale_options = left;
        self.right_price_scale_options = right;
        self.recalculate_all_panes();
        self.full_update();
        Ok(())
    }

    // Series

    pub fn add_series(&mut self, kind: SeriesKind, options: SeriesOptions) -> ChartResult<SeriesId> {
        let pane_index = options.pane_index;
        let scale_id = PriceScaleId::new(options.price_scale_id.clone());
        let overlay_options = self.right_price_scale_options;
        let id = SeriesId::new(self.next_series_id);
        let pane = self.pane_mut(pane_index)?;
        pane.ensure_price_scale(&scale_id, overlay_options);
        pane.add_series(id);
        self.next_series_id += 1;
        self.series.insert(id, Series::new(id, kind, options));
        debug!(series = %id, ?kind, pane = pane_index, scale = %scale_id, "series added");
        self.full_update();
        Ok(id)
    }

    pub fn remove_series(&mut self, id: SeriesId) -> ChartResult<DataChange> {
        let series = self
            .series
            .shift_remove(&id)
            .ok_or(ChartError::UnknownSeries(id))?;
        let pane_index = series.options().pane_index;
        let change = self.time_index.remove_series(id)?;
        if let Some(pane) = self.panes.get_mut(pane_index) {
            pane.remove_series(id);
            let in_use: Vec<PriceScaleId> = self
                .series
                .values()
                .filter(|other| other.options().pane_index == pane_index)
                .map(|other| PriceScaleId::new(other.options().price_scale_id.clone()))
                .collect();
            pane.drop_unused_overlays(&in_use);
        }
        self.apply_data_change(change)?;
        debug!(series = %id, bars = self.time_index.len(), "series removed");
        self.full_update();
        Ok(change)
    }

    pub fn set_series_data(&mut self, id: SeriesId, items: &[SeriesDataItem]) -> ChartResult<DataChange> {
        let series = self.series.get(&id).ok_or(ChartError::UnknownSeries(id))?;
        let prepared = items
            .iter()
            .map(|item| prepare_item(series, item))
            .collect::<ChartResult<Vec<_>>>()?;
        let change = self.time_index.set_series_data(id, prepared)?;
        self.apply_data_change(change)?;
        debug!(series = %id, points = items.len(), bars = self.time_index.len(), "series data set");
        Ok(change)
    }

    pub fn update_series(&mut self, id: SeriesId, item: &SeriesDataItem) -> ChartResult<DataChange> {
        let series = self.series.get(&id).ok_or(ChartError::UnknownSeries(id))?;
        let prepared = prepare_item(series, item)?;
        let change = self.time_index.update_series_data(id, prepared)?;
        self.apply_data_change(change)?;
        trace!(series = %id, appended = change.appended_bar, "series updated");
        Ok(change)
    }

    pub fn apply_series_options(&mut self, id: SeriesId, options: SeriesOptions) -> ChartResult<()> {
        let series = self.series.get_mut(&id).ok_or(ChartError::UnknownSeries(id))?;
        if options.pane_index != series.options().pane_index
            || options.price_scale_id != series.options().price_scale_id
        {
            return Err(ChartError::InvalidData(
                "series pane and price scale cannot change after creation".to_owned(),
            ));
        }
        *series.options_mut() = options;
        self.recalculate_all_panes();
        self.light_update();
        Ok(())
    }

    /// Row of `series` at `logical`, searching in `direction` on a miss.
    #[must_use]
    pub fn data_by_index(
        &self,
        series: SeriesId,
        logical: TimePointIndex,
        direction: MismatchDirection,
    ) -> Option<&SeriesPoint> {
        self.time_index.series_rows(series)?.search(logical, direction)
    }

    fn apply_data_change(&mut self, change: DataChange) -> ChartResult<()> {
        if change.changes_time_scale() || change.base_index != self.time_scale_base_index() {
            self.time_scale.update_points(
                self.time_index.bars(),
                change.first_changed_index,
                change.base_index,
            )?;
        }
        self.recalculate_all_panes();
        self.light_update();
        Ok(())
    }

    fn time_scale_base_index(&self) -> Option<TimePointIndex> {
        if self.time_scale.points_len() == 0 {
            None
        } else {
            Some(self.time_scale.base_index())
        }
    }

    // Autoscale

    pub fn recalculate_pane(&mut self, index: usize) {
        let Some(visible) = self.time_scale.visible_strict_range() else {
            return;
        };
        let Some(pane) = self.panes.get_mut(index) else {
            return;
        };
        let sources: Vec<SeriesSource<'_>> = pane
            .series()
            .iter()
            .filter_map(|id| self.series.get(id))
            .map(|series| SeriesSource {
                series,
                rows: self.time_index.series_rows(series.id()),
                visible,
            })
            .collect();
        pane.recalculate(visible, &sources);
    }

    pub fn recalculate_all_panes(&mut self) {
        for index in 0..self.panes.len() {
            self.recalculate_pane(index);
        }
    }

    /// Scale `id` of pane `pane_index`.
    pub fn price_scale(&self, pane_index: usize, id: &PriceScaleId) -> Option<&PriceScale> {
        self.panes.get(pane_index)?.price_scale(id)
    }

    pub fn price_scale_mut(&mut self, pane_index: usize, id: &PriceScaleId) -> ChartResult<&mut PriceScale> {
        self.pane_mut(pane_index)?
            .price_scale_mut(id)
            .ok_or_else(|| ChartError::InvalidData(format!("unknown price scale `{id}`")))
    }

    pub fn apply_price_scale_options(
        &mut self,
        pane_index: usize,
        id: &PriceScaleId,
        options: PriceScaleOptions,
    ) -> ChartResult<()> {
        self.price_scale_mut(pane_index, id)?.apply_options(options)?;
        self.recalculate_pane(pane_index);
        self.full_update();
        Ok(())
    }

    // Time scale actions, applied on the next frame

    pub fn fit_content(&mut self) {
        let mut mask = InvalidateMask::light();
        mask.set_fit_content();
        self.invalidate(mask);
    }

    pub fn set_target_logical_range(&mut self, range: LogicalRange) {
        let mut mask = InvalidateMask::light();
        mask.apply_range(range);
        self.invalidate(mask);
    }

    pub fn set_bar_spacing(&mut self, bar_spacing: f64) {
        let mut mask = InvalidateMask::light();
        mask.set_bar_spacing(bar_spacing);
        self.invalidate(mask);
    }

    pub fn set_right_offset(&mut self, right_offset: f64) {
        let mut mask = InvalidateMask::light();
        mask.set_right_offset(right_offset);
        self.invalidate(mask);
    }

    pub fn reset_time_scale(&mut self) {
        let mut mask = InvalidateMask::light();
        mask.reset_time_scale();
        self.invalidate(mask);
    }

    pub fn set_time_scale_animation(&mut self, animation: TimeScaleAnimation) {
        let mut mask = InvalidateMask::light();
        mask.set_time_scale_animation(animation);
        self.invalidate(mask);
    }

    pub fn stop_time_scale_animation(&mut self) {
        let mut mask = InvalidateMask::light();
        mask.stop_time_scale_animation();
        self.invalidate(mask);
    }

    /// Applies drained time-scale actions. Returns the animation that must run
    /// again on the following frame, if any.
    pub fn apply_time_scale_invalidations(
        &mut self,
        invalidations: &[TimeScaleInvalidation],
        now_ms: f64,
    ) -> ChartResult<Option<TimeScaleAnimation>> {
        let mut running = None;
        for invalidation in invalidations {
            match *invalidation {
                TimeScaleInvalidation::FitContent => self.time_scale.fit_content()?,
                TimeScaleInvalidation::ApplyRange(range) => {
                    self.time_scale.set_logical_range(range)?
                }
                TimeScaleInvalidation::ApplyBarSpacing(spacing) => {
                    self.time_scale.set_bar_spacing(spacing)?
                }
                TimeScaleInvalidation::ApplyRightOffset(offset) => {
                    self.time_scale.set_right_offset(offset)?
                }
                TimeScaleInvalidation::Reset => self.time_scale.restore_default()?,
                TimeScaleInvalidation::Animation(animation) => {
                    let animation = animation.started_at(now_ms);
                    if animation.finished(now_ms) {
                        self.time_scale
                            .set_right_offset(animation.final_position())?;
                        trace!(offset = animation.final_position(), "time scale animation finished");
                    } else {
                        self.time_scale.set_right_offset(animation.position(now_ms))?;
                        running = Some(animation);
                    }
                }
                TimeScaleInvalidation::StopAnimation => running = None,
            }
        }
        if !invalidations.is_empty() {
            self.recalculate_all_panes();
        }
        Ok(running)
    }

    // Gesture-driven scale changes, applied immediately

    pub fn start_scroll_time(&mut self, x: f64) {
        self.time_scale.start_scroll(x);
    }

    pub fn scroll_time_to(&mut self, x: f64) {
        self.time_scale.scroll_to(x);
        self.recalculate_all_panes();
        self.light_update();
    }

    pub fn end_scroll_time(&mut self) {
        self.time_scale.end_scroll();
        self.light_update();
    }

    pub fn start_scale_time(&mut self, x: f64) {
        self.time_scale.start_scale(x);
    }

    pub fn scale_time_to(&mut self, x: f64) -> ChartResult<()> {
        self.time_scale.scale_to(x)?;
        self.recalculate_all_panes();
        self.light_update();
        Ok(())
    }

    pub fn end_scale_time(&mut self) {
        self.time_scale.end_scale();
        self.light_update();
    }

    pub fn zoom_time(&mut self, x: f64, scale: f64) -> ChartResult<()> {
        self.time_scale.zoom(x, scale)?;
        self.recalculate_all_panes();
        self.light_update();
        Ok(())
    }

    pub fn scroll_chart(&mut self, pixels: f64) -> ChartResult<()> {
        self.time_scale.scroll_chart(pixels)?;
        self.recalculate_all_panes();
        self.light_update();
        Ok(())
    }

    pub fn start_scale_price(&mut self, pane_index: usize, id: &PriceScaleId, y: f64) -> ChartResult<()> {
        self.price_scale_mut(pane_index, id)?.start_scale(y);
        Ok(())
    }

    pub fn scale_price_to(&mut self, pane_index: usize, id: &PriceScaleId, y: f64) -> ChartResult<()> {
        self.price_scale_mut(pane_index, id)?.scale_to(y);
        self.invalidate_pane(pane_index, InvalidationLevel::Light, false);
        Ok(())
    }

    pub fn end_scale_price(&mut self, pane_index: usize, id: &PriceScaleId) -> ChartResult<()> {
        self.price_scale_mut(pane_index, id)?.end_scale();
        self.invalidate_pane(pane_index, InvalidationLevel::Light, false);
        Ok(())
    }

    pub fn start_scroll_price(&mut self, pane_index: usize, id: &PriceScaleId, y: f64) -> ChartResult<()> {
        let scale = self.price_scale_mut(pane_index, id)?;
        if !scale.is_empty() {
            scale.start_scroll(y);
        }
        Ok(())
    }

    pub fn scroll_price_to(&mut self, pane_index: usize, id: &PriceScaleId, y: f64) -> ChartResult<()> {
        self.price_scale_mut(pane_index, id)?.scroll_to(y);
        self.invalidate_pane(pane_index, InvalidationLevel::Light, false);
        Ok(())
    }

    pub fn end_scroll_price(&mut self, pane_index: usize, id: &PriceScaleId) -> ChartResult<()> {
        self.price_scale_mut(pane_index, id)?.end_scroll();
        Ok(())
    }

    /// Turns autoscale back on after a manual price drag.
    pub fn reset_price_scale(&mut self, pane_index: usize, id: &PriceScaleId) -> ChartResult<()> {
        self.price_scale_mut(pane_index, id)?.set_auto_scale(true);
        self.recalculate_pane(pane_index);
        self.invalidate_pane(pane_index, InvalidationLevel::Light, true);
        Ok(())
    }
}

fn prepare_item(series: &Series, item: &SeriesDataItem) -> ChartResult<PreparedItem> {
    Ok(PreparedItem {
        time: item.time.to_time_point()?,
        original_time: item.time.clone(),
        values: series.convert(item)?,
        colors: item.colors(),
    })
}
