use tracing::debug;

use crate::error::ChartResult;
use crate::extensions::PluginEvent;
use crate::interaction::{
    GestureEvent, InteractionMode, KineticAnimation, KineticParams, PointerEvent, resolve_wheel,
};
use crate::model::TimeScaleAnimation;
use crate::render::Renderer;

use super::ChartEngine;

/// Pinch scale delta to time-scale zoom factor.
const PINCH_ZOOM_FACTOR: f64 = 5.0;

impl<R: Renderer> ChartEngine<R> {
    /// Pane canvas gestures: hover drives the crosshair, drags pan, wheel
    /// and pinch zoom.
    pub(super) fn handle_pane_gesture(&mut self, pane_index: usize, event: GestureEvent) -> ChartResult<bool> {
        match event {
            GestureEvent::MouseEnter(pointer) | GestureEvent::MouseMove(pointer) => {
                if self.core.runtime.pointer.mode == InteractionMode::Idle {
                    self.update_crosshair(pane_index, pointer.local());
                }
            }
            GestureEvent::MouseLeave(_) => {
                if self.core.runtime.pointer.mode == InteractionMode::Idle {
                    self.hide_crosshair();
                }
            }
            GestureEvent::PointerDown(_) => {
                self.stop_time_scale_animation();
                self.core.runtime.pointer.kinetic = None;
            }
            GestureEvent::PressedMove(pointer) => self.on_pane_pressed_move(pane_index, pointer)?,
            GestureEvent::PointerUp(pointer) => self.on_pane_pointer_up(pointer)?,
            GestureEvent::Click(pointer) => {
                if self.core.runtime.subscriptions.has_click() {
                    let params = self.mouse_event_params(pane_index, pointer.local());
                    self.notify_click(&params);
                }
            }
            GestureEvent::DoubleClick(pointer) => {
                if self.core.runtime.subscriptions.has_double_click() {
                    let params = self.mouse_event_params(pane_index, pointer.local());
                    self.notify_double_click(&params);
                }
            }
            GestureEvent::LongTap(pointer) => self.update_crosshair(pane_index, pointer.local()),
            GestureEvent::PinchStart => {
                self.finish_pane_scroll(None)?;
                self.stop_time_scale_animation();
                self.core.runtime.pointer.kinetic = None;
                self.core.runtime.pointer.pinch_prev_scale = 1.0;
                self.core.runtime.pointer.mode = InteractionMode::Pinching;
            }
            GestureEvent::Pinch { pivot, scale } => {
                if self.core.options.handle_scale.pinch {
                    let zoom = (scale - self.core.runtime.pointer.pinch_prev_scale) * PINCH_ZOOM_FACTOR;
                    self.core.model.zoom_time(pivot.x, zoom)?;
                }
                self.core.runtime.pointer.pinch_prev_scale = scale;
            }
            GestureEvent::PinchEnd => {
                self.core.runtime.pointer.pinch_prev_scale = 1.0;
                self.core.runtime.pointer.mode = InteractionMode::Idle;
            }
            GestureEvent::Wheel { event, delta } => {
                let action = resolve_wheel(
                    delta,
                    self.core.options.handle_scroll.mouse_wheel,
                    self.core.options.handle_scale.mouse_wheel,
                );
                if let Some(zoom) = action.zoom {
                    self.core.model.zoom_time(event.local().x, zoom)?;
                }
                if let Some(pixels) = action.scroll_px {
                    self.core.model.scroll_chart(pixels)?;
                }
                return Ok(!action.is_empty());
            }
        }
        Ok(false)
    }

    fn on_pane_pressed_move(&mut self, pane_index: usize, pointer: PointerEvent) -> ChartResult<()> {
        let position = pointer.local();
        match self.core.runtime.pointer.mode {
            InteractionMode::Idle => {
                let handle_scroll = self.core.options.handle_scroll;
                let enabled = if pointer.is_touch {
                    handle_scroll.horz_touch_drag || handle_scroll.vert_touch_drag
                } else {
                    handle_scroll.pressed_mouse_move
                };
                if !enabled {
                    return Ok(());
                }
                self.start_pane_scroll(pane_index, pointer)?;
            }
            InteractionMode::Scrolling => {}
            _ => return Ok(()),
        }

        self.core.model.scroll_time_to(position.x);
        if let Some((pane, id)) = self.core.runtime.pointer.scroll_target.clone() {
            self.core.model.scroll_price_to(pane, &id, position.y)?;
        }
        let right_offset = self.core.model.time_scale().right_offset();
        if let Some(kinetic) = self.core.runtime.pointer.kinetic.as_mut() {
            kinetic.add_position(right_offset, pointer.timestamp_ms);
        }
        if !pointer.is_touch {
            self.update_crosshair(pane_index, position);
        }
        Ok(())
    }

    fn start_pane_scroll(&mut self, pane_index: usize, pointer: PointerEvent) -> ChartResult<()> {
        let position = pointer.local();
        let kinetic_options = self.core.options.kinetic_scroll;
        let kinetic_enabled = if pointer.is_touch {
            kinetic_options.touch
        } else {
            kinetic_options.mouse
        };
        self.stop_time_scale_animation();
        let time_scale = self.core.model.time_scale();
        self.core.runtime.pointer.kinetic = kinetic_enabled.then(|| {
            let mut kinetic = KineticAnimation::new(KineticParams::for_bar_spacing(time_scale.bar_spacing()));
            kinetic.add_position(time_scale.right_offset(), pointer.timestamp_ms);
            kinetic
        });

        // Only a manually scaled price scale follows the drag vertically.
        let scroll_target = self.core.model.pane(pane_index).and_then(|pane| {
            let id = pane.default_price_scale_id();
            let scale = pane.price_scale(&id)?;
            (!scale.is_auto_scale() && !scale.is_empty()).then_some((pane_index, id))
        });
        if let Some((pane, id)) = &scroll_target {
            self.core.model.start_scroll_price(*pane, id, position.y)?;
        }
        self.core.runtime.pointer.scroll_target = scroll_target;
        self.core.model.start_scroll_time(position.x);
        self.core.runtime.pointer.mode = InteractionMode::Scrolling;
        debug!(pane = pane_index, x = position.x, touch = pointer.is_touch, "pane scroll started");
        self.emit_plugin_event(PluginEvent::ScrollStarted);
        Ok(())
    }

    fn on_pane_pointer_up(&mut self, pointer: PointerEvent) -> ChartResult<()> {
        if self.core.runtime.pointer.mode != InteractionMode::Scrolling {
            return Ok(());
        }
        self.finish_pane_scroll(Some(pointer.timestamp_ms))
    }

    /// Ends a pane scroll; with a release time the drag may turn into a
    /// kinetic fling.
    fn finish_pane_scroll(&mut self, release_ms: Option<f64>) -> ChartResult<()> {
        if self.core.runtime.pointer.mode != InteractionMode::Scrolling {
            return Ok(());
        }
        self.core.model.end_scroll_time();
        if let Some((pane, id)) = self.core.runtime.pointer.scroll_target.take() {
            self.core.model.end_scroll_price(pane, &id)?;
        }
        let kinetic = self.core.runtime.pointer.kinetic.take();
        if let (Some(kinetic), Some(release_ms)) = (kinetic, release_ms) {
            let right_offset = self.core.model.time_scale().right_offset();
            if let Some(trajectory) = kinetic.start(right_offset, release_ms) {
                debug!(
                    speed = trajectory.speed,
                    limit = trajectory.limit(),
                    "kinetic scroll started"
                );
                self.core
                    .model
                    .set_time_scale_animation(TimeScaleAnimation::Kinetic(trajectory));
            }
        }
        self.core.runtime.pointer.mode = InteractionMode::Idle;
        self.emit_plugin_event(PluginEvent::ScrollEnded);
        Ok(())
    }
}
