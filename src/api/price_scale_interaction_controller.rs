use tracing::debug;

use crate::error::ChartResult;
use crate::interaction::{GestureEvent, InteractionMode};
use crate::model::PriceScaleId;
use crate::render::{PriceAxisSide, Renderer};

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Price axis gestures: a drag stretches the price range and turns
    /// autoscale off, a double click turns it back on.
    pub(super) fn handle_price_axis_gesture(
        &mut self,
        pane_index: usize,
        side: PriceAxisSide,
        event: GestureEvent,
    ) -> ChartResult<bool> {
        let handle_scale = self.core.options.handle_scale;
        let id = match side {
            PriceAxisSide::Left => PriceScaleId::left(),
            PriceAxisSide::Right => PriceScaleId::right(),
        };
        match event {
            GestureEvent::PointerDown(pointer) => {
                let scalable = self
                    .core
                    .model
                    .price_scale(pane_index, &id)
                    .is_some_and(|scale| !scale.is_empty());
                if handle_scale.axis_pressed_mouse_move.price
                    && scalable
                    && self.core.runtime.pointer.mode == InteractionMode::Idle
                {
                    self.core.model.start_scale_price(pane_index, &id, pointer.local().y)?;
                    self.core.runtime.pointer.price_axis_target = Some((pane_index, id));
                    self.core.runtime.pointer.mode = InteractionMode::ScalingPrice;
                    debug!(pane = pane_index, ?side, "price axis scale started");
                }
            }
            GestureEvent::PressedMove(pointer) => {
                if let Some((pane, id)) = &self.core.runtime.pointer.price_axis_target {
                    let (pane, id) = (*pane, id.clone());
                    self.core.model.scale_price_to(pane, &id, pointer.local().y)?;
                }
            }
            GestureEvent::PointerUp(_) => {
                if let Some((pane, id)) = self.core.runtime.pointer.price_axis_target.take() {
                    self.core.model.end_scale_price(pane, &id)?;
                    self.core.runtime.pointer.mode = InteractionMode::Idle;
                }
            }
            GestureEvent::DoubleClick(_) => {
                if handle_scale.axis_double_click_reset.price
                    && self.core.model.price_scale(pane_index, &id).is_some()
                {
                    self.core.model.reset_price_scale(pane_index, &id)?;
                    debug!(pane = pane_index, ?side, "price scale reset");
                }
            }
            _ => {}
        }
        Ok(false)
    }
}
