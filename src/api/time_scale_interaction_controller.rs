use tracing::debug;

use crate::error::ChartResult;
use crate::interaction::{GestureEvent, InteractionMode};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Time axis gestures: a drag changes bar spacing around the press
    /// point, a double click restores the defaults.
    pub(super) fn handle_time_axis_gesture(&mut self, event: GestureEvent) -> ChartResult<bool> {
        let handle_scale = self.core.options.handle_scale;
        match event {
            GestureEvent::PointerDown(pointer) => {
                if handle_scale.axis_pressed_mouse_move.time
                    && self.core.runtime.pointer.mode == InteractionMode::Idle
                {
                    self.stop_time_scale_animation();
                    self.core.model.start_scale_time(pointer.local().x);
                    self.core.runtime.pointer.mode = InteractionMode::ScalingTime;
                    debug!(x = pointer.local().x, "time axis scale started");
                }
            }
            GestureEvent::PressedMove(pointer) => {
                if self.core.runtime.pointer.mode == InteractionMode::ScalingTime {
                    self.core.model.scale_time_to(pointer.local().x)?;
                }
            }
            GestureEvent::PointerUp(_) => {
                if self.core.runtime.pointer.mode == InteractionMode::ScalingTime {
                    self.core.model.end_scale_time();
                    self.core.runtime.pointer.mode = InteractionMode::Idle;
                }
            }
            GestureEvent::DoubleClick(_) => {
                if handle_scale.axis_double_click_reset.time {
                    self.core.model.reset_time_scale();
                }
            }
            _ => {}
        }
        Ok(false)
    }
}
