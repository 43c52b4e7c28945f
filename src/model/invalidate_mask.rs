use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::interaction::kinetic::KineticTrajectory;

use super::LogicalRange;

/// Default duration of an animated `scroll_to_position`.
pub const SCROLL_ANIMATION_DURATION_MS: f64 = 400.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum InvalidationLevel {
    #[default]
    None = 0,
    Cursor = 1,
    Light = 2,
    Full = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaneInvalidation {
    pub level: InvalidationLevel,
    pub auto_scale: bool,
}

impl PaneInvalidation {
    #[must_use]
    pub fn new(level: InvalidationLevel, auto_scale: bool) -> Self {
        Self { level, auto_scale }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeScaleInvalidationType {
    FitContent,
    ApplyRange,
    ApplyBarSpacing,
    ApplyRightOffset,
    Reset,
    Animation,
    StopAnimation,
}

/// Linear right-offset interpolation.
///
/// `start_time` stays unset until the first frame that runs the animation,
/// so elapsed time is measured in the frame timebase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollAnimation {
    pub from: f64,
    pub to: f64,
    pub start_time: Option<f64>,
    pub duration: f64,
}

impl ScrollAnimation {
    fn progress(self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let start = self.start_time.unwrap_or(now);
        (now - start) / self.duration
    }

    #[must_use]
    pub fn finished(self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    #[must_use]
    pub fn position(self, now: f64) -> f64 {
        if self.finished(now) {
            return self.to;
        }
        let progress = self.progress(now).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * progress
    }
}

/// Per-frame right-offset driver polled by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimeScaleAnimation {
    Scroll(ScrollAnimation),
    Kinetic(KineticTrajectory),
}

impl TimeScaleAnimation {
    #[must_use]
    pub fn position(self, now: f64) -> f64 {
        match self {
            Self::Scroll(scroll) => scroll.position(now),
            Self::Kinetic(kinetic) => kinetic.position(now),
        }
    }

    #[must_use]
    pub fn finished(self, now: f64) -> bool {
        match self {
            Self::Scroll(scroll) => scroll.finished(now),
            Self::Kinetic(kinetic) => kinetic.finished(now),
        }
    }

    /// Pins an unstarted scroll animation to `now`.
    #[must_use]
    pub fn started_at(self, now: f64) -> Self {
        match self {
            Self::Scroll(scroll) if scroll.start_time.is_none() => Self::Scroll(ScrollAnimation {
                start_time: Some(now),
                ..scroll
            }),
            other => other,
        }
    }

    /// Offset applied on the frame the animation completes.
    #[must_use]
    pub fn final_position(self) -> f64 {
        match self {
            Self::Scroll(scroll) => scroll.to,
            Self::Kinetic(kinetic) => kinetic.limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeScaleInvalidation {
    FitContent,
    ApplyRange(LogicalRange),
    ApplyBarSpacing(f64),
    ApplyRightOffset(f64),
    Reset,
    Animation(TimeScaleAnimation),
    StopAnimation,
}

impl TimeScaleInvalidation {
    #[must_use]
    pub fn kind(self) -> TimeScaleInvalidationType {
        match self {
            Self::FitContent => TimeScaleInvalidationType::FitContent,
            Self::ApplyRange(_) => TimeScaleInvalidationType::ApplyRange,
            Self::ApplyBarSpacing(_) => TimeScaleInvalidationType::ApplyBarSpacing,
            Self::ApplyRightOffset(_) => TimeScaleInvalidationType::ApplyRightOffset,
            Self::Reset => TimeScaleInvalidationType::Reset,
            Self::Animation(_) => TimeScaleInvalidationType::Animation,
            Self::StopAnimation => TimeScaleInvalidationType::StopAnimation,
        }
    }
}

type TimeScaleInvalidations = SmallVec<[TimeScaleInvalidation; 4]>;

/// Pending work for the next frame: a global level, per-pane levels and the
/// queued time-scale actions.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidateMask {
    invalidated_panes: BTreeMap<usize, PaneInvalidation>,
    global_level: InvalidationLevel,
    time_scale_invalidations: TimeScaleInvalidations,
}

impl Default for InvalidateMask {
    fn default() -> Self {
        Self::new(InvalidationLevel::None)
    }
}

impl InvalidateMask {
    #[must_use]
    pub fn new(global_level: InvalidationLevel) -> Self {
        Self {
            invalidated_panes: BTreeMap::new(),
            global_level,
            time_scale_invalidations: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn full() -> Self {
        Self::new(InvalidationLevel::Full)
    }

    #[must_use]
    pub fn light() -> Self {
        Self::new(InvalidationLevel::Light)
    }

    #[must_use]
    pub fn cursor() -> Self {
        Self::new(InvalidationLevel::Cursor)
    }

    #[must_use]
    pub fn full_invalidation(&self) -> InvalidationLevel {
        self.global_level
    }

    /// Highest level across the global and every pane entry.
    #[must_use]
    pub fn max_level(&self) -> InvalidationLevel {
        self.invalidated_panes
            .values()
            .map(|pane| pane.level)
            .fold(self.global_level, InvalidationLevel::max)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max_level() == InvalidationLevel::None && self.time_scale_invalidations.is_empty()
    }

    pub fn invalidate_pane(&mut self, pane_index: usize, invalidation: PaneInvalidation) {
        let merged = if let Some(previous) = self.invalidated_panes.get(&pane_index) {
            PaneInvalidation {
                level: previous.level.max(invalidation.level),
                auto_scale: previous.auto_scale || invalidation.auto_scale,
            }
        } else {
            invalidation
        };
        self.invalidated_panes.insert(pane_index, merged);
    }

    #[must_use]
    pub fn invalidation_for_pane(&self, pane_index: usize) -> PaneInvalidation {
        if let Some(pane) = self.invalidated_panes.get(&pane_index) {
            PaneInvalidation {
                level: self.global_level.max(pane.level),
                auto_scale: pane.auto_scale,
            }
        } else {
            PaneInvalidation {
                level: self.global_level,
                auto_scale: false,
            }
        }
    }

    #[must_use]
    pub fn explicit_pane_invalidations(&self) -> Vec<(usize, PaneInvalidation)> {
        self.invalidated_panes
            .iter()
            .map(|(pane_index, invalidation)| (*pane_index, *invalidation))
            .collect()
    }

    #[must_use]
    pub fn time_scale_invalidations(&self) -> &[TimeScaleInvalidation] {
        &self.time_scale_invalidations
    }

    pub fn set_fit_content(&mut self) {
        self.stop_time_scale_animation();
        self.time_scale_invalidations = SmallVec::from_elem(TimeScaleInvalidation::FitContent, 1);
    }

    pub fn apply_range(&mut self, range: LogicalRange) {
        self.stop_time_scale_animation();
        self.time_scale_invalidations =
            SmallVec::from_elem(TimeScaleInvalidation::ApplyRange(range), 1);
    }

    pub fn set_bar_spacing(&mut self, spacing: f64) {
        self.stop_time_scale_animation();
        self.time_scale_invalidations
            .push(TimeScaleInvalidation::ApplyBarSpacing(spacing));
    }

    pub fn set_right_offset(&mut self, offset: f64) {
        self.stop_time_scale_animation();
        self.time_scale_invalidations
            .push(TimeScaleInvalidation::ApplyRightOffset(offset));
    }

    pub fn reset_time_scale(&mut self) {
        self.stop_time_scale_animation();
        self.time_scale_invalidations = SmallVec::from_elem(TimeScaleInvalidation::Reset, 1);
    }

    pub fn set_time_scale_animation(&mut self, animation: TimeScaleAnimation) {
        self.remove_time_scale_animation();
        self.time_scale_invalidations
            .push(TimeScaleInvalidation::Animation(animation));
    }

    pub fn stop_time_scale_animation(&mut self) {
        self.remove_time_scale_animation();
        self.time_scale_invalidations
            .push(TimeScaleInvalidation::StopAnimation);
    }

    /// Folds `other` into `self`: levels escalate, pane entries union, and
    /// time-scale actions replay through the same replace/append rules.
    pub fn merge(&mut self, other: &InvalidateMask) {
        for invalidation in &other.time_scale_invalidations {
            self.apply_time_scale_invalidation(*invalidation);
        }
        self.global_level = self.global_level.max(other.global_level);
        for (pane_index, pane) in &other.invalidated_panes {
            self.invalidate_pane(*pane_index, *pane);
        }
    }

    fn apply_time_scale_invalidation(&mut self, invalidation: TimeScaleInvalidation) {
        match invalidation {
            TimeScaleInvalidation::FitContent => self.set_fit_content(),
            TimeScaleInvalidation::ApplyRange(range) => self.apply_range(range),
            TimeScaleInvalidation::ApplyBarSpacing(spacing) => self.set_bar_spacing(spacing),
            TimeScaleInvalidation::ApplyRightOffset(offset) => self.set_right_offset(offset),
            TimeScaleInvalidation::Reset => self.reset_time_scale(),
            TimeScaleInvalidation::Animation(animation) => self.set_time_scale_animation(animation),
            TimeScaleInvalidation::StopAnimation => self.remove_time_scale_animation(),
        }
    }

    fn remove_time_scale_animation(&mut self) {
        if let Some(position) = self
            .time_scale_invalidations
            .iter()
            .position(|inv| matches!(inv, TimeScaleInvalidation::Animation(_)))
        {
            self.time_scale_invalidations.remove(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InvalidateMask, InvalidationLevel, LogicalRange, PaneInvalidation, ScrollAnimation,
        TimeScaleAnimation, TimeScaleInvalidation, TimeScaleInvalidationType,
    };

    fn scroll(from: f64, to: f64, start_time: f64) -> TimeScaleAnimation {
        TimeScaleAnimation::Scroll(ScrollAnimation {
            from,
            to,
            start_time: Some(start_time),
            duration: 100.0,
        })
    }

    #[test]
    fn pane_invalidation_merges_level_and_autoscale() {
        let mut mask = InvalidateMask::new(InvalidationLevel::None);
        mask.invalidate_pane(1, PaneInvalidation::new(InvalidationLevel::Cursor, false));
        mask.invalidate_pane(1, PaneInvalidation::new(InvalidationLevel::Light, true));
        let result = mask.invalidation_for_pane(1);
        assert_eq!(result.level, InvalidationLevel::Light);
        assert!(result.auto_scale);
        assert_eq!(mask.max_level(), InvalidationLevel::Light);
    }

    #[test]
    fn set_fit_content_replaces_previous_time_scale_invalidations() {
        let mut mask = InvalidateMask::light();
        mask.set_bar_spacing(8.0);
        mask.apply_range(LogicalRange::new(10.0, 20.0));
        assert_eq!(
            mask.time_scale_invalidations(),
            &[TimeScaleInvalidation::ApplyRange(LogicalRange::new(10.0, 20.0))]
        );
        mask.set_fit_content();
        assert_eq!(
            mask.time_scale_invalidations(),
            &[TimeScaleInvalidation::FitContent]
        );
    }

    #[test]
    fn animation_is_removed_before_pushing_new_animation_or_stop() {
        let mut mask = InvalidateMask::light();
        mask.set_time_scale_animation(scroll(0.0, 5.0, 0.0));
        mask.set_time_scale_animation(scroll(5.0, 10.0, 10.0));
        assert_eq!(mask.time_scale_invalidations().len(), 1);
        assert_eq!(
            mask.time_scale_invalidations()[0].kind(),
            TimeScaleInvalidationType::Animation
        );

        mask.stop_time_scale_animation();
        assert_eq!(mask.time_scale_invalidations().len(), 1);
        assert_eq!(
            mask.time_scale_invalidations()[0].kind(),
            TimeScaleInvalidationType::StopAnimation
        );
    }

    #[test]
    fn merge_preserves_stronger_global_level_and_combines_panes() {
        let mut a = InvalidateMask::new(InvalidationLevel::Cursor);
        let mut b = InvalidateMask::new(InvalidationLevel::Light);
        a.invalidate_pane(0, PaneInvalidation::new(InvalidationLevel::Cursor, false));
        b.invalidate_pane(0, PaneInvalidation::new(InvalidationLevel::Light, true));
        b.invalidate_pane(1, PaneInvalidation::new(InvalidationLevel::Cursor, false));
        a.merge(&b);
        assert_eq!(a.full_invalidation(), InvalidationLevel::Light);
        assert_eq!(a.invalidation_for_pane(0).level, InvalidationLevel::Light);
        assert!(a.invalidation_for_pane(0).auto_scale);
        assert_eq!(a.invalidation_for_pane(1).level, InvalidationLevel::Light);
    }

    #[test]
    fn merging_same_level_twice_does_not_escalate() {
        let mut mask = InvalidateMask::default();
        mask.merge(&InvalidateMask::light());
        mask.merge(&InvalidateMask::light());
        assert_eq!(mask.full_invalidation(), InvalidationLevel::Light);
    }

    #[test]
    fn scroll_animation_interpolates_then_lands_on_target() {
        let animation = scroll(0.0, 10.0, 100.0);
        assert!((animation.position(150.0) - 5.0).abs() <= 1e-9);
        assert!(!animation.finished(150.0));
        assert!(animation.finished(200.0));
        assert_eq!(animation.final_position(), 10.0);
    }
}
