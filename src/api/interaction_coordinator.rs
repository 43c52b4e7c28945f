use tracing::trace;

use crate::error::ChartResult;
use crate::interaction::{GestureEvent, GestureOutput, GestureRecognizer, InputEvent};
use crate::model::TimeScaleInvalidation;
use crate::render::{Renderer, SurfaceId};

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Feeds one raw input event received by `surface` through that
    /// surface's recognizer and applies the resulting gestures.
    ///
    /// Pane main and top canvases share one recognizer. The returned output
    /// carries the recognized events and whether the host should cancel the
    /// platform default.
    pub fn handle_input(&mut self, surface: SurfaceId, event: &InputEvent) -> ChartResult<GestureOutput> {
        let surface = input_surface(surface);
        let mut output = self.recognizer_mut(surface).handle(event);
        for gesture in output.events.clone() {
            if self.dispatch_gesture(surface, gesture)? {
                output.prevent_default = true;
            }
        }
        Ok(output)
    }

    /// Fires time-based gestures (long taps) whose deadline has passed.
    /// Returns how many were dispatched.
    pub fn poll_gestures(&mut self, now_ms: f64) -> ChartResult<usize> {
        let fired: Vec<(SurfaceId, GestureEvent)> = self
            .core
            .runtime
            .pointer
            .recognizers
            .iter_mut()
            .filter_map(|(surface, recognizer)| recognizer.poll(now_ms).map(|event| (*surface, event)))
            .collect();
        for (surface, event) in &fired {
            self.dispatch_gesture(*surface, *event)?;
        }
        Ok(fired.len())
    }

    /// Pushes gesture thresholds and touch-drag axes to every recognizer.
    pub(super) fn sync_recognizers(&mut self) {
        let gestures = self.core.options.gestures;
        let handle_scroll = self.core.options.handle_scroll;
        for recognizer in self.core.runtime.pointer.recognizers.values_mut() {
            recognizer.set_options(gestures);
            recognizer.set_touch_drag_axes(handle_scroll.horz_touch_drag, handle_scroll.vert_touch_drag);
        }
    }

    fn recognizer_mut(&mut self, surface: SurfaceId) -> &mut GestureRecognizer {
        let gestures = self.core.options.gestures;
        let handle_scroll = self.core.options.handle_scroll;
        self.core
            .runtime
            .pointer
            .recognizers
            .entry(surface)
            .or_insert_with(|| {
                let mut recognizer = GestureRecognizer::new(gestures);
                recognizer.set_touch_drag_axes(handle_scroll.horz_touch_drag, handle_scroll.vert_touch_drag);
                recognizer
            })
    }

    /// Routes a gesture to the handler of its surface; `true` asks the host
    /// to prevent the platform default.
    fn dispatch_gesture(&mut self, surface: SurfaceId, event: GestureEvent) -> ChartResult<bool> {
        trace!(?surface, ?event, "gesture");
        match surface {
            SurfaceId::PaneMain(pane) | SurfaceId::PaneTop(pane) => self.handle_pane_gesture(pane, event),
            SurfaceId::TimeAxis => self.handle_time_axis_gesture(event),
            SurfaceId::PriceAxis { pane, side } => self.handle_price_axis_gesture(pane, side, event),
        }
    }

    /// Cancels a running time-scale animation, if one is queued.
    pub(super) fn stop_time_scale_animation(&mut self) {
        let animating = self.core.model.pending_invalidation().is_some_and(|mask| {
            mask.time_scale_invalidations()
                .iter()
                .any(|action| matches!(action, TimeScaleInvalidation::Animation(_)))
        });
        if animating {
            self.core.model.stop_time_scale_animation();
        }
    }
}

fn input_surface(surface: SurfaceId) -> SurfaceId {
    match surface {
        SurfaceId::PaneMain(pane) => SurfaceId::PaneTop(pane),
        other => other,
    }
}
