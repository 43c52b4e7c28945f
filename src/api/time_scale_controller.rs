use tracing::debug;

use crate::core::{Time, TimePointIndex};
use crate::error::{ChartError, ChartResult};
use crate::model::{
    LogicalRange, SCROLL_ANIMATION_DURATION_MS, ScrollAnimation, TickMarkFormatterFn,
    TimeScaleAnimation, TimeScaleOptions,
};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn time_scale_options(&self) -> TimeScaleOptions {
        self.core.model.time_scale().options()
    }

    pub fn apply_time_scale_options(&mut self, options: TimeScaleOptions) -> ChartResult<()> {
        self.core.model.time_scale_mut().apply_options(options)?;
        self.core.options.time_scale = options;
        self.relayout()?;
        self.core.model.full_update();
        Ok(())
    }

    /// Installs a custom tick label formatter; `None` restores the default.
    pub fn set_tick_mark_formatter(&mut self, formatter: Option<TickMarkFormatterFn>) {
        self.core
            .model
            .time_scale_mut()
            .set_tick_mark_formatter(formatter);
        self.core.model.light_update();
    }

    /// Shows the bars between two times, each snapped to the nearest bar.
    /// A no-op while there is no data.
    pub fn set_visible_range(&mut self, from: &Time, to: &Time) -> ChartResult<()> {
        let from = from.to_time_point()?;
        let to = to.to_time_point()?;
        if from.key() > to.key() {
            return Err(ChartError::InvalidData(
                "visible range start must not be after its end".to_owned(),
            ));
        }
        let index = self.core.model.time_index();
        let (Some(first), Some(last)) = (index.index_of_time(&from, true), index.index_of_time(&to, true))
        else {
            return Ok(());
        };
        debug!(from = first, to = last, "visible time range requested");
        self.core
            .model
            .set_target_logical_range(LogicalRange::new(first as f64, last as f64));
        Ok(())
    }

    /// Shows a logical range; bounds may lie outside the data.
    pub fn set_visible_logical_range(&mut self, range: LogicalRange) -> ChartResult<()> {
        if !range.from.is_finite() || !range.to.is_finite() {
            return Err(ChartError::InvalidData(
                "logical range bounds must be finite".to_owned(),
            ));
        }
        if range.from > range.to {
            return Err(ChartError::InvalidData(
                "logical range start must not be after its end".to_owned(),
            ));
        }
        debug!(from = range.from, to = range.to, "visible logical range requested");
        self.core.model.set_target_logical_range(range);
        Ok(())
    }

    /// Visible logical range, `None` while the time scale is empty.
    pub fn visible_logical_range(&mut self) -> Option<LogicalRange> {
        self.core.model.time_scale_mut().visible_logical_range()
    }

    /// Times of the first and last bar in view.
    pub fn visible_range(&mut self) -> Option<(Time, Time)> {
        let visible = self.core.model.time_scale_mut().visible_strict_range()?;
        let index = self.core.model.time_index();
        let last = index.len().checked_sub(1)? as TimePointIndex;
        if visible.right() < 0 || visible.left() > last {
            return None;
        }
        let from = visible.left().clamp(0, last);
        let to = visible.right().clamp(0, last);
        Some((
            index.bar(from)?.original_time.clone(),
            index.bar(to)?.original_time.clone(),
        ))
    }

    /// Distance in bars from the last bar to the right edge.
    #[must_use]
    pub fn scroll_position(&self) -> f64 {
        self.core.model.time_scale().right_offset()
    }

    /// Moves the right edge to `position` bars past the last bar, either on
    /// the next frame or over a linear animation.
    pub fn scroll_to_position(&mut self, position: f64, animated: bool) -> ChartResult<()> {
        if !position.is_finite() {
            return Err(ChartError::InvalidData(
                "scroll position must be finite".to_owned(),
            ));
        }
        if !animated {
            self.core.model.set_right_offset(position);
            return Ok(());
        }
        let animation = ScrollAnimation {
            from: self.scroll_position(),
            to: position,
            start_time: None,
            duration: SCROLL_ANIMATION_DURATION_MS,
        };
        debug!(from = animation.from, to = position, "scroll animation started");
        self.core
            .model
            .set_time_scale_animation(TimeScaleAnimation::Scroll(animation));
        Ok(())
    }

    /// Animates back to the latest bar at the default right offset.
    pub fn scroll_to_real_time(&mut self) -> ChartResult<()> {
        let target = self.core.model.time_scale().default_right_offset();
        self.scroll_to_position(target, true)
    }

    pub fn fit_content(&mut self) {
        self.core.model.fit_content();
    }

    /// Restores default bar spacing and right offset.
    pub fn reset_time_scale(&mut self) {
        self.core.model.reset_time_scale();
    }

    pub fn set_bar_spacing(&mut self, bar_spacing: f64) -> ChartResult<()> {
        if !bar_spacing.is_finite() || bar_spacing <= 0.0 {
            return Err(ChartError::InvalidData(
                "bar spacing must be finite and > 0".to_owned(),
            ));
        }
        self.core.model.set_bar_spacing(bar_spacing);
        Ok(())
    }

    pub fn set_right_offset(&mut self, right_offset: f64) -> ChartResult<()> {
        if !right_offset.is_finite() {
            return Err(ChartError::InvalidData(
                "right offset must be finite".to_owned(),
            ));
        }
        self.core.model.set_right_offset(right_offset);
        Ok(())
    }

    #[must_use]
    pub fn bar_spacing(&self) -> f64 {
        self.core.model.time_scale().bar_spacing()
    }

    #[must_use]
    pub fn right_offset(&self) -> f64 {
        self.core.model.time_scale().right_offset()
    }
}
