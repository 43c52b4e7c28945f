use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ChartResult;
use crate::extensions::PluginEvent;
use crate::model::{InvalidateMask, InvalidationLevel};
use crate::render::Renderer;

use super::{ChartEngine, render_coordinator::RenderCoordinator};

/// Cumulative frame-loop counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameStats {
    pub frames: u64,
    pub full_passes: u64,
    pub light_passes: u64,
    pub cursor_passes: u64,
    pub canvases_drawn: u64,
}

/// Outcome of one `on_animation_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameReport {
    pub level: InvalidationLevel,
    pub canvases_drawn: usize,
    /// A time-scale animation is still running and queued the next frame.
    pub animating: bool,
}

impl<R: Renderer> ChartEngine<R> {
    /// Whether work is queued and the host should request an animation frame.
    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        self.core.model.pending_invalidation().is_some()
    }

    #[must_use]
    pub fn pending_invalidation(&self) -> Option<&InvalidateMask> {
        self.core.model.pending_invalidation()
    }

    #[must_use]
    pub fn frame_stats(&self) -> FrameStats {
        self.core.runtime.frame_stats
    }

    /// Drops the pending frame together with any running animation. Nothing
    /// is drawn until the next mutation schedules a new frame.
    pub fn cancel_pending_frame(&mut self) {
        if self.core.model.take_pending_invalidation().is_some() {
            debug!("pending frame cancelled");
        }
    }

    /// Applies everything queued since the previous frame and draws the
    /// affected canvases exactly once.
    pub fn on_animation_frame(&mut self, now_ms: f64) -> ChartResult<FrameReport> {
        let Some(mask) = self.core.model.take_pending_invalidation() else {
            return Ok(FrameReport::default());
        };
        let level = mask.max_level();
        let actions = mask.time_scale_invalidations();

        if level >= InvalidationLevel::Light || !actions.is_empty() {
            self.relayout()?;
        }
        let running = self
            .core
            .model
            .apply_time_scale_invalidations(actions, now_ms)?;
        if !actions.is_empty() {
            // Axis labels follow the new range, which may change axis widths.
            self.relayout()?;
        }
        for (pane_index, invalidation) in mask.explicit_pane_invalidations() {
            if invalidation.auto_scale {
                self.core.model.recalculate_pane(pane_index);
            }
        }
        if level >= InvalidationLevel::Cursor {
            self.refresh_crosshair();
        }

        self.commit_bitmap_sizes();
        let canvases_drawn = RenderCoordinator::render(self, &mask)?;

        let stats = &mut self.core.runtime.frame_stats;
        stats.frames += 1;
        stats.canvases_drawn += canvases_drawn as u64;
        match level {
            InvalidationLevel::Full => stats.full_passes += 1,
            InvalidationLevel::Light => stats.light_passes += 1,
            InvalidationLevel::Cursor => stats.cursor_passes += 1,
            InvalidationLevel::None => {}
        }

        self.emit_visible_range_change();
        self.emit_plugin_event(PluginEvent::Rendered {
            canvases: canvases_drawn,
        });

        let animating = running.is_some();
        if let Some(animation) = running {
            self.core.model.set_time_scale_animation(animation);
        }
        trace!(?level, canvases_drawn, animating, "frame drawn");
        Ok(FrameReport {
            level,
            canvases_drawn,
            animating,
        })
    }

    pub fn invalidate_full(&mut self) {
        self.core.model.full_update();
    }

    pub fn invalidate_light(&mut self) {
        self.core.model.light_update();
    }

    pub fn invalidate_cursor(&mut self) {
        self.core.model.cursor_update();
    }

    pub(super) fn emit_visible_range_change(&mut self) {
        let current = self.core.model.time_scale_mut().visible_logical_range();
        if current == self.core.runtime.last_visible_range {
            return;
        }
        self.core.runtime.last_visible_range = current;
        if let Some(range) = current {
            debug!(from = range.left(), to = range.right(), "visible range changed");
            self.emit_plugin_event(PluginEvent::VisibleRangeChanged {
                from: range.left(),
                to: range.right(),
            });
        }
    }
}
