use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::primitives::unix_seconds_to_datetime;
use crate::core::tick_weight::max_tick_mark_weight;
use crate::core::{IndexedBar, TickMarkType, TickMarkWeight, Time, TimePointIndex};
use crate::error::{ChartError, ChartResult};

use super::label_cache::{TimeLabelCache, TimeLabelCacheKey, TimeLabelCacheStats};
use super::tick_marks::{TickMark, TickMarks};

const MIN_VISIBLE_BARS_COUNT: f64 = 2.0;
const DEFAULT_TICK_MARK_MAX_CHARACTER_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalRange {
    pub from: f64,
    pub to: f64,
}

impl LogicalRange {
    #[must_use]
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    #[must_use]
    pub fn left(self) -> f64 {
        self.from
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrictRange {
    left: TimePointIndex,
    right: TimePointIndex,
}

impl StrictRange {
    #[must_use]
    pub fn new(left: TimePointIndex, right: TimePointIndex) -> Self {
        Self { left, right }
    }

    #[must_use]
    pub fn left(self) -> TimePointIndex {
        self.left
    }

    #[must_use]
    pub fn right(self) -> TimePointIndex {
        self.right
    }

    #[must_use]
    pub fn count(self) -> f64 {
        (self.right - self.left + 1) as f64
    }

    #[must_use]
    pub fn contains(self, index: TimePointIndex) -> bool {
        self.left <= index && index <= self.right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeScaleOptions {
    pub right_offset: f64,
    pub right_offset_pixels: Option<f64>,
    pub bar_spacing: f64,
    pub min_bar_spacing: f64,
    /// `0` means half the scale width.
    pub max_bar_spacing: f64,
    pub fix_left_edge: bool,
    pub fix_right_edge: bool,
    pub lock_visible_time_range_on_resize: bool,
    pub right_bar_stays_on_scroll: bool,
    pub shift_visible_range_on_new_bar: bool,
    pub uniform_distribution: bool,
    pub visible: bool,
    pub time_visible: bool,
    pub seconds_visible: bool,
    pub tick_mark_max_character_length: Option<usize>,
}

impl Default for TimeScaleOptions {
    fn default() -> Self {
        Self {
            right_offset: 0.0,
            right_offset_pixels: None,
            bar_spacing: 6.0,
            min_bar_spacing: 0.5,
            max_bar_spacing: 0.0,
            fix_left_edge: false,
            fix_right_edge: false,
            lock_visible_time_range_on_resize: false,
            right_bar_stays_on_scroll: false,
            shift_visible_range_on_new_bar: true,
            uniform_distribution: false,
            visible: true,
            time_visible: false,
            seconds_visible: true,
            tick_mark_max_character_length: None,
        }
    }
}

/// Custom tick label formatter; returning `None` falls back to the default.
pub type TickMarkFormatterFn = Arc<dyn Fn(&Time, TickMarkType) -> Option<String> + Send + Sync>;

#[derive(Clone, Default)]
struct TickMarkFormatter(Option<TickMarkFormatterFn>);

impl fmt::Debug for TickMarkFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() {
            "TickMarkFormatter(custom)"
        } else {
            "TickMarkFormatter(default)"
        })
    }
}

/// Projected time-axis label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxisMark {
    pub coordinate: f64,
    pub label: String,
    pub weight: TickMarkWeight,
    /// The mark carries the heaviest visible weight.
    pub is_major: bool,
    pub need_align_coordinate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TransitionState {
    bar_spacing: f64,
    right_offset: f64,
}

#[derive(Debug, Clone)]
pub struct TimeScale {
    options: TimeScaleOptions,
    width: f64,
    base_index_or_null: Option<TimePointIndex>,
    right_offset: f64,
    points_len: usize,
    first_time_key: Option<i64>,
    bar_spacing: f64,
    scroll_start_point: Option<f64>,
    scale_start_point: Option<f64>,
    common_transition_start_state: Option<TransitionState>,
    visible_range: Option<LogicalRange>,
    visible_range_invalidated: bool,
    tick_marks: TickMarks,
    labels: TimeLabelCache,
    formatter: TickMarkFormatter,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new(TimeScaleOptions::default())
    }
}

impl TimeScale {
    #[must_use]
    pub fn new(options: TimeScaleOptions) -> Self {
        let mut tick_marks = TickMarks::default();
        tick_marks.set_uniform_distribution(options.uniform_distribution);
        Self {
            width: 0.0,
            base_index_or_null: None,
            right_offset: options.right_offset,
            points_len: 0,
            first_time_key: None,
            bar_spacing: options.bar_spacing,
            scroll_start_point: None,
            scale_start_point: None,
            common_transition_start_state: None,
            visible_range: None,
            visible_range_invalidated: true,
            tick_marks,
            labels: TimeLabelCache::default(),
            formatter: TickMarkFormatter::default(),
            options,
        }
    }

    #[must_use]
    pub fn options(&self) -> TimeScaleOptions {
        self.options
    }

    pub fn apply_options(&mut self, options: TimeScaleOptions) -> ChartResult<()> {
        let labels_changed = options.time_visible != self.options.time_visible
            || options.seconds_visible != self.options.seconds_visible;
        self.options = options;
        self.tick_marks
            .set_uniform_distribution(options.uniform_distribution);
        if labels_changed {
            self.labels.invalidate();
        }
        if self.options.fix_left_edge {
            self.do_fix_left_edge()?;
        }
        if self.options.fix_right_edge {
            self.do_fix_right_edge();
        }
        self.set_bar_spacing(self.options.bar_spacing)?;
        if let Some(pixels) = self.options.right_offset_pixels {
            self.set_right_offset(pixels / self.bar_spacing)?;
        } else {
            self.set_right_offset(self.options.right_offset)?;
        }
        Ok(())
    }

    pub fn set_tick_mark_formatter(&mut self, formatter: Option<TickMarkFormatterFn>) {
        self.formatter = TickMarkFormatter(formatter);
        self.labels.invalidate();
    }

    #[must_use]
    pub fn label_cache_stats(&self) -> TimeLabelCacheStats {
        self.labels.stats()
    }

    pub fn set_width(&mut self, new_width: f64) -> ChartResult<()> {
        if !new_width.is_finite() || new_width < 0.0 {
            return Err(ChartError::InvalidData(
                "time scale width must be finite and >= 0".to_owned(),
            ));
        }
        if (self.width - new_width).abs() <= f64::EPSILON {
            return Ok(());
        }

        let previous_visible_range = self.visible_logical_range();
        let old_width = self.width;
        self.width = new_width;
        self.visible_range_invalidated = true;

        if self.options.lock_visible_time_range_on_resize && old_width > 0.0 && new_width > 0.0 {
            self.bar_spacing = self.bar_spacing * new_width / old_width;
        }

        if self.options.fix_left_edge
            && let Some(range) = previous_visible_range
            && range.left() <= 0.0
        {
            let delta = old_width - new_width;
            self.right_offset -= (delta / self.bar_spacing).round() + 1.0;
            self.visible_range_invalidated = true;
        }

        self.correct_bar_spacing();
        self.correct_offset();
        Ok(())
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.points_len == 0 || self.base_index_or_null.is_none()
    }

    #[must_use]
    pub fn points_len(&self) -> usize {
        self.points_len
    }

    /// Syncs with the global time index after a data change.
    ///
    /// When new bars arrive on the right and the view should not follow them,
    /// the right offset is shifted so the visible window stays put.
    pub fn update_points(
        &mut self,
        bars: &[IndexedBar],
        first_changed: Option<usize>,
        new_base_index: Option<TimePointIndex>,
    ) -> ChartResult<()> {
        let old_base_index = self.base_index_or_null;
        let old_points_len = self.points_len;
        let old_first_time = self.first_time_key;
        let old_visible = self.visible_strict_range();

        if let Some(first_changed) = first_changed {
            self.points_len = bars.len();
            self.first_time_key = bars.first().map(|bar| bar.time.key());
            self.tick_marks.set_points(bars, first_changed);
            self.visible_range_invalidated = true;
        }

        if let (Some(visible), Some(old_first), Some(new_first), Some(old_base)) = (
            old_visible,
            old_first_time,
            self.first_time_key,
            old_base_index,
        ) {
            let last_bar_visible = visible.contains(old_base);
            let prepended = old_first > new_first;
            let added_on_right = new_base_index.is_some_and(|base| base > old_base) && !prepended;
            let follow_new_bar = last_bar_visible
                && old_points_len != self.points_len
                && self.options.shift_visible_range_on_new_bar;
            if added_on_right
                && !follow_new_bar
                && let Some(new_base) = new_base_index
            {
                let delta = (new_base - old_base) as f64;
                self.right_offset -= delta;
                trace!(delta, right_offset = self.right_offset, "kept view on new bar");
            }
        }

        self.set_base_index(new_base_index)
    }

    pub fn set_base_index(&mut self, base_index: Option<TimePointIndex>) -> ChartResult<()> {
        self.base_index_or_null = base_index;
        self.visible_range_invalidated = true;
        self.correct_offset();
        self.do_fix_left_edge()?;
        Ok(())
    }

    #[must_use]
    pub fn base_index(&self) -> TimePointIndex {
        self.base_index_or_null.unwrap_or(0)
    }

    #[must_use]
    pub fn right_offset(&self) -> f64 {
        self.right_offset
    }

    pub fn set_right_offset(&mut self, offset: f64) -> ChartResult<()> {
        if !offset.is_finite() {
            return Err(ChartError::InvalidData(
                "time scale right offset must be finite".to_owned(),
            ));
        }
        self.right_offset = offset;
        self.visible_range_invalidated = true;
        self.correct_offset();
        Ok(())
    }

    #[must_use]
    pub fn bar_spacing(&self) -> f64 {
        self.bar_spacing
    }

    pub fn set_bar_spacing(&mut self, new_bar_spacing: f64) -> ChartResult<()> {
        if !new_bar_spacing.is_finite() || new_bar_spacing <= 0.0 {
            return Err(ChartError::InvalidData(
                "time scale bar spacing must be finite and > 0".to_owned(),
            ));
        }
        let old_bar_spacing = self.bar_spacing;
        self.bar_spacing = new_bar_spacing;
        self.correct_bar_spacing();

        if self.options.right_offset_pixels.is_some() && old_bar_spacing > 0.0 {
            self.right_offset = self.right_offset * old_bar_spacing / self.bar_spacing;
        }

        self.correct_offset();
        self.visible_range_invalidated = true;
        Ok(())
    }

    pub fn restore_default(&mut self) -> ChartResult<()> {
        self.visible_range_invalidated = true;
        self.set_bar_spacing(self.options.bar_spacing)?;
        let new_offset = if let Some(px) = self.options.right_offset_pixels {
            px / self.bar_spacing
        } else {
            self.options.right_offset
        };
        self.set_right_offset(new_offset)
    }

    /// Default right offset in logical units.
    #[must_use]
    pub fn default_right_offset(&self) -> f64 {
        match self.options.right_offset_pixels {
            Some(px) if self.bar_spacing > 0.0 => px / self.bar_spacing,
            _ => self.options.right_offset,
        }
    }

    pub fn set_logical_range(&mut self, range: LogicalRange) -> ChartResult<()> {
        self.apply_visible_range(range.from, range.to, false)
    }

    pub fn set_strict_range(&mut self, range: StrictRange, apply_default_offset: bool) -> ChartResult<()> {
        self.apply_visible_range(range.left() as f64, range.right() as f64, apply_default_offset)
    }

    fn apply_visible_range(&mut self, from: f64, to: f64, apply_default_offset: bool) -> ChartResult<()> {
        if self.width <= 0.0 {
            return Ok(());
        }
        if !from.is_finite() || !to.is_finite() {
            return Err(ChartError::InvalidData(
                "visible range bounds must be finite".to_owned(),
            ));
        }
        let length = to - from + 1.0;
        if length <= 0.0 {
            return Err(ChartError::InvalidData(
                "visible range must be non-empty".to_owned(),
            ));
        }
        let pixel_offset = if apply_default_offset {
            self.options.right_offset_pixels.unwrap_or(0.0)
        } else {
            0.0
        };
        self.set_bar_spacing((self.width - pixel_offset).max(1.0) / length)?;
        self.right_offset = to - self.base_index() as f64;
        if apply_default_offset {
            self.right_offset = if pixel_offset > 0.0 {
                pixel_offset / self.bar_spacing
            } else {
                self.options.right_offset
            };
        }
        self.correct_offset();
        self.visible_range_invalidated = true;
        Ok(())
    }

    pub fn fit_content(&mut self) -> ChartResult<()> {
        let (Some(first), Some(last)) = (self.first_index(), self.last_index()) else {
            return Ok(());
        };
        let right_offset_bars = if self.options.right_offset_pixels.is_none() {
            self.options.right_offset
        } else {
            0.0
        };
        self.set_strict_range(
            StrictRange::new(first, last + right_offset_bars as TimePointIndex),
            true,
        )
    }

    /// X coordinate of a (possibly fractional) logical index; `0` when empty.
    #[must_use]
    pub fn logical_to_coordinate(&self, logical: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let delta_from_right = self.base_index() as f64 + self.right_offset - logical;
        self.width - (delta_from_right + 0.5) * self.bar_spacing - 1.0
    }

    /// Exact inverse of `logical_to_coordinate`; `0` when empty.
    #[must_use]
    pub fn coordinate_to_logical(&self, x: f64) -> f64 {
        if self.is_empty() || self.bar_spacing <= 0.0 {
            return 0.0;
        }
        let delta_from_right = (self.width - 1.0 - x) / self.bar_spacing - 0.5;
        self.base_index() as f64 + self.right_offset - delta_from_right
    }

    #[must_use]
    pub fn index_to_coordinate(&self, index: TimePointIndex) -> f64 {
        self.logical_to_coordinate(index as f64)
    }

    /// Nearest bar index under `x`.
    #[must_use]
    pub fn coordinate_to_index(&self, x: f64) -> TimePointIndex {
        self.coordinate_to_logical(x).round() as TimePointIndex
    }

    pub fn zoom(&mut self, zoom_point: f64, scale: f64) -> ChartResult<()> {
        if self.is_empty() || !scale.is_finite() || scale == 0.0 {
            return Ok(());
        }
        if !zoom_point.is_finite() {
            return Err(ChartError::InvalidData(
                "zoom point must be finite".to_owned(),
            ));
        }
        let clamped_zoom_point = zoom_point.clamp(1.0, self.width);
        let logical_at_zoom_point = self.coordinate_to_logical(clamped_zoom_point);
        let bar_spacing = self.bar_spacing;
        let new_bar_spacing = bar_spacing + scale * (bar_spacing / 10.0);
        self.set_bar_spacing(new_bar_spacing)?;
        if !self.options.right_bar_stays_on_scroll {
            let corrected = self.right_offset
                + (logical_at_zoom_point - self.coordinate_to_logical(clamped_zoom_point));
            self.set_right_offset(corrected)?;
        }
        Ok(())
    }

    /// Shifts the view by `pixels`; positive moves towards older bars.
    pub fn scroll_chart(&mut self, pixels: f64) -> ChartResult<()> {
        if self.bar_spacing <= 0.0 {
            return Ok(());
        }
        self.set_right_offset(self.right_offset - pixels / self.bar_spacing)
    }

    pub fn start_scale(&mut self, x: f64) {
        if self.scroll_start_point.is_some() {
            self.end_scroll();
        }
        if self.scale_start_point.is_some() || self.common_transition_start_state.is_some() {
            return;
        }
        if self.is_empty() {
            return;
        }
        self.scale_start_point = Some(x);
        self.save_common_transition_start_state();
    }

    pub fn scale_to(&mut self, x: f64) -> ChartResult<()> {
        let Some(start_state) = self.common_transition_start_state else {
            return Ok(());
        };
        let Some(scale_start) = self.scale_start_point else {
            return Ok(());
        };
        let start_length_from_right = (self.width - x).clamp(0.0, self.width);
        let current_length_from_right = (self.width - scale_start).clamp(0.0, self.width);
        if start_length_from_right == 0.0 || current_length_from_right == 0.0 {
            return Ok(());
        }
        self.set_bar_spacing(
            start_state.bar_spacing * start_length_from_right / current_length_from_right,
        )
    }

    pub fn end_scale(&mut self) {
        if self.scale_start_point.is_none() {
            return;
        }
        self.scale_start_point = None;
        self.clear_common_transition_start_state();
    }

    pub fn start_scroll(&mut self, x: f64) {
        if self.scroll_start_point.is_some() || self.common_transition_start_state.is_some() {
            return;
        }
        if self.is_empty() {
            return;
        }
        self.scroll_start_point = Some(x);
        self.save_common_transition_start_state();
    }

    pub fn scroll_to(&mut self, x: f64) {
        let Some(scroll_start_point) = self.scroll_start_point else {
            return;
        };
        let shift_in_logical = (scroll_start_point - x) / self.bar_spacing;
        let start = self
            .common_transition_start_state
            .unwrap_or(TransitionState {
                bar_spacing: self.bar_spacing,
                right_offset: self.right_offset,
            });
        self.right_offset = start.right_offset + shift_in_logical;
        self.visible_range_invalidated = true;
        self.correct_offset();
    }

    pub fn end_scroll(&mut self) {
        if self.scroll_start_point.is_none() {
            return;
        }
        self.scroll_start_point = None;
        self.clear_common_transition_start_state();
    }

    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.scroll_start_point.is_some()
    }

    pub fn visible_logical_range(&mut self) -> Option<LogicalRange> {
        self.update_visible_range();
        self.visible_range
    }

    pub fn visible_strict_range(&mut self) -> Option<StrictRange> {
        self.update_visible_range();
        self.visible_range.map(|range| {
            StrictRange::new(
                range.left().floor() as TimePointIndex,
                range.right().ceil() as TimePointIndex,
            )
        })
    }

    #[must_use]
    pub fn first_index(&self) -> Option<TimePointIndex> {
        if self.points_len == 0 { None } else { Some(0) }
    }

    #[must_use]
    pub fn last_index(&self) -> Option<TimePointIndex> {
        if self.points_len == 0 {
            None
        } else {
            Some(self.points_len as TimePointIndex - 1)
        }
    }

    /// Width reserved for one label at `font_size`.
    #[must_use]
    pub fn max_label_width(&self, font_size: f64) -> f64 {
        let characters = self
            .options
            .tick_mark_max_character_length
            .unwrap_or(DEFAULT_TICK_MARK_MAX_CHARACTER_LENGTH) as f64;
        (5.0 * (font_size + 4.0) / 8.0) * characters
    }

    /// Decimated, projected and labelled marks for the current view.
    pub fn time_axis_marks(&mut self, font_size: f64) -> Vec<TimeAxisMark> {
        let Some(visible) = self.visible_strict_range() else {
            return Vec::new();
        };
        let max_label_width = self.max_label_width(font_size);
        let padding = (max_label_width / self.bar_spacing).round() as TimePointIndex;
        let from = visible.left() - padding;
        let to = visible.right() + padding;
        let first_aligned = self.first_index().unwrap_or(0) + padding;
        let last_aligned = self.last_index().unwrap_or(0) - padding;
        let align_enabled = self.bar_spacing <= max_label_width / 2.0;

        let bar_spacing = self.bar_spacing;
        let selected: Vec<TickMark> = self
            .tick_marks
            .build(bar_spacing, max_label_width)
            .iter()
            .filter(|mark| from <= mark.index && mark.index <= to)
            .cloned()
            .collect();
        let major = max_tick_mark_weight(selected.iter().map(|mark| mark.weight));

        selected
            .into_iter()
            .map(|mark| {
                let need_align_coordinate = align_enabled
                    && ((self.options.fix_left_edge && mark.index <= first_aligned)
                        || (self.options.fix_right_edge && mark.index >= last_aligned));
                TimeAxisMark {
                    coordinate: self.index_to_coordinate(mark.index),
                    label: self.format_tick_mark(&mark),
                    weight: mark.weight,
                    is_major: max_tick_mark_weight([mark.weight]) >= major,
                    need_align_coordinate,
                }
            })
            .collect()
    }

    fn format_tick_mark(&mut self, mark: &TickMark) -> String {
        let mark_type = TickMarkType::for_weight(
            mark.weight,
            self.options.time_visible,
            self.options.seconds_visible,
        );
        let formatter = self.formatter.0.clone();
        let key = TimeLabelCacheKey {
            weight: mark.weight,
            time_key: mark.time_key,
        };
        self.labels.get_or_insert_with(key, || {
            formatter
                .and_then(|custom| custom(&mark.original_time, mark_type))
                .unwrap_or_else(|| default_tick_label(mark.time_key, mark_type))
        })
    }

    fn update_visible_range(&mut self) {
        if !self.visible_range_invalidated {
            return;
        }
        self.visible_range_invalidated = false;
        if self.is_empty() {
            self.visible_range = None;
            return;
        }
        let new_bars_length = self.width / self.bar_spacing;
        let right_border = self.right_offset + self.base_index() as f64;
        let left_border = right_border - new_bars_length + 1.0;
        self.visible_range = Some(LogicalRange {
            from: left_border,
            to: right_border,
        });
    }

    fn correct_bar_spacing(&mut self) {
        let min = self.min_bar_spacing();
        let max = self.max_bar_spacing().max(min);
        let clamped = self.bar_spacing.clamp(min, max);
        if (clamped - self.bar_spacing).abs() > f64::EPSILON {
            self.bar_spacing = clamped;
            self.visible_range_invalidated = true;
        }
    }

    fn min_bar_spacing(&self) -> f64 {
        if self.options.fix_left_edge && self.options.fix_right_edge && self.points_len > 0 {
            return self.width / self.points_len as f64;
        }
        self.options.min_bar_spacing
    }

    fn max_bar_spacing(&self) -> f64 {
        if self.options.max_bar_spacing > 0.0 {
            self.options.max_bar_spacing
        } else if self.width > 0.0 {
            self.width * 0.5
        } else {
            f64::INFINITY
        }
    }

    fn min_right_offset(&self) -> Option<f64> {
        let first = self.first_index()?;
        let base = self.base_index_or_null?;
        let bars_estimation = if self.options.fix_left_edge {
            self.width / self.bar_spacing
        } else {
            MIN_VISIBLE_BARS_COUNT.min(self.points_len as f64)
        };
        Some(first as f64 - base as f64 - 1.0 + bars_estimation)
    }

    fn max_right_offset(&self) -> f64 {
        if self.options.fix_right_edge {
            0.0
        } else {
            self.width / self.bar_spacing - MIN_VISIBLE_BARS_COUNT.min(self.points_len as f64)
        }
    }

    fn correct_offset(&mut self) {
        if let Some(min_right_offset) = self.min_right_offset()
            && self.right_offset < min_right_offset
        {
            self.right_offset = min_right_offset;
            self.visible_range_invalidated = true;
        }
        let max_right_offset = self.max_right_offset();
        if self.right_offset > max_right_offset {
            self.right_offset = max_right_offset;
            self.visible_range_invalidated = true;
        }
    }

    fn do_fix_left_edge(&mut self) -> ChartResult<()> {
        if !self.options.fix_left_edge {
            return Ok(());
        }
        let Some(first) = self.first_index() else {
            return Ok(());
        };
        let Some(visible) = self.visible_strict_range() else {
            return Ok(());
        };
        let delta = visible.left() - first;
        if delta < 0 {
            let left_edge_offset = self.right_offset - delta as f64 - 1.0;
            self.set_right_offset(left_edge_offset)?;
        }
        self.correct_bar_spacing();
        Ok(())
    }

    fn do_fix_right_edge(&mut self) {
        self.correct_offset();
        self.correct_bar_spacing();
    }

    fn save_common_transition_start_state(&mut self) {
        self.common_transition_start_state = Some(TransitionState {
            bar_spacing: self.bar_spacing,
            right_offset: self.right_offset,
        });
    }

    fn clear_common_transition_start_state(&mut self) {
        self.common_transition_start_state = None;
    }
}

fn default_tick_label(time_key: i64, mark_type: TickMarkType) -> String {
    let Ok(time) = unix_seconds_to_datetime(time_key) else {
        return time_key.to_string();
    };
    let pattern = match mark_type {
        TickMarkType::Year => "%Y",
        TickMarkType::Month => "%b",
        TickMarkType::DayOfMonth => "%-d",
        TickMarkType::Time => "%H:%M",
        TickMarkType::TimeWithSeconds => "%H:%M:%S",
    };
    time.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::{LogicalRange, TimeScale, TimeScaleOptions};
    use crate::core::{IndexedBar, TickMarkWeight, Time, TimePoint};

    const DAY: i64 = 86_400;

    fn bars(count: i64) -> Vec<IndexedBar> {
        let start = 1_577_836_800;
        (0..count)
            .map(|i| IndexedBar {
                index: i,
                time: TimePoint::from_timestamp(start + i * DAY),
                original_time: Time::Timestamp(start + i * DAY),
                tick_weight: TickMarkWeight::DAY,
            })
            .collect()
    }

    fn scale(width: f64, count: i64) -> TimeScale {
        let mut time_scale = TimeScale::new(TimeScaleOptions::default());
        time_scale.set_width(width).expect("width");
        time_scale
            .update_points(&bars(count), Some(0), Some(count - 1))
            .expect("points");
        time_scale
    }

    #[test]
    fn index_coordinate_matches_bar_center_formula() {
        let mut time_scale = scale(1000.0, 200);
        time_scale.set_right_offset(0.0).expect("offset");
        time_scale.set_bar_spacing(6.0).expect("spacing");

        let x = time_scale.index_to_coordinate(199);
        assert!((x - (1000.0 - (0.5 * 6.0) - 1.0)).abs() <= 1e-9);
        let logical = time_scale.coordinate_to_logical(x);
        assert!((logical - 199.0).abs() <= 1e-9);
        assert_eq!(time_scale.coordinate_to_index(x + 2.0), 199);
    }

    #[test]
    fn zoom_preserves_anchor_when_right_bar_does_not_stay() {
        let mut time_scale = scale(800.0, 100);
        time_scale.set_bar_spacing(5.0).expect("spacing");
        let anchor = 400.0;
        let before = time_scale.coordinate_to_logical(anchor);
        time_scale.zoom(anchor, 0.5).expect("zoom");
        let after = time_scale.coordinate_to_logical(anchor);
        assert!((before - after).abs() <= 1e-6);
        assert!((time_scale.bar_spacing() - 5.25).abs() <= 1e-9);
    }

    #[test]
    fn logical_range_is_applied_exactly() {
        let mut time_scale = scale(1000.0, 200);
        time_scale
            .set_logical_range(LogicalRange::new(100.0, 149.0))
            .expect("range");
        let range = time_scale.visible_logical_range().expect("visible");
        assert!((range.from - 100.0).abs() <= 1e-9);
        assert!((range.to - 149.0).abs() <= 1e-9);
        assert!((time_scale.bar_spacing() - 20.0).abs() <= 1e-9);
    }

    #[test]
    fn empty_scale_reports_zero_sentinel() {
        let time_scale = TimeScale::default();
        assert!(time_scale.is_empty());
        assert_eq!(time_scale.logical_to_coordinate(5.0), 0.0);
        assert_eq!(time_scale.coordinate_to_logical(5.0), 0.0);
    }

    #[test]
    fn bar_spacing_is_clamped_to_half_width() {
        let mut time_scale = scale(100.0, 10);
        time_scale.set_bar_spacing(500.0).expect("spacing");
        assert!((time_scale.bar_spacing() - 50.0).abs() <= 1e-9);
        time_scale.set_bar_spacing(0.01).expect("spacing");
        assert!((time_scale.bar_spacing() - 0.5).abs() <= 1e-9);
    }

    #[test]
    fn fix_right_edge_caps_offset_at_zero() {
        let mut time_scale = TimeScale::new(TimeScaleOptions {
            fix_right_edge: true,
            ..TimeScaleOptions::default()
        });
        time_scale.set_width(600.0).expect("width");
        time_scale
            .update_points(&bars(300), Some(0), Some(299))
            .expect("points");
        time_scale.set_right_offset(25.0).expect("offset");
        assert_eq!(time_scale.right_offset(), 0.0);
        time_scale.set_width(300.0).expect("resize");
        assert!(time_scale.right_offset() <= 0.0);
    }

    #[test]
    fn new_bar_keeps_view_when_last_bar_hidden() {
        let mut time_scale = scale(600.0, 300);
        time_scale.set_right_offset(-50.0).expect("offset");
        let before = time_scale.visible_logical_range().expect("range");
        time_scale
            .update_points(&bars(301), Some(300), Some(300))
            .expect("update");
        let after = time_scale.visible_logical_range().expect("range");
        assert!((before.from - after.from).abs() <= 1e-9);
    }

    #[test]
    fn new_bar_shifts_view_when_last_bar_visible() {
        let mut time_scale = scale(600.0, 300);
        let before = time_scale.visible_logical_range().expect("range");
        time_scale
            .update_points(&bars(301), Some(300), Some(300))
            .expect("update");
        let after = time_scale.visible_logical_range().expect("range");
        assert!((after.from - before.from - 1.0).abs() <= 1e-9);
    }

    #[test]
    fn time_axis_marks_are_cached_by_weight() {
        let mut time_scale = scale(600.0, 60);
        let marks = time_scale.time_axis_marks(12.0);
        assert!(!marks.is_empty());
        assert!(marks.windows(2).all(|w| w[0].coordinate < w[1].coordinate));
        let misses = time_scale.label_cache_stats().misses;
        let _ = time_scale.time_axis_marks(12.0);
        assert_eq!(time_scale.label_cache_stats().misses, misses);
        assert!(time_scale.label_cache_stats().hits > 0);
    }
}
