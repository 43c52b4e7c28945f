use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Point, SeriesId, Time};
use crate::render::Renderer;

use super::ChartEngine;

/// Handle returned by `subscribe_*`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

/// Value of one series at the hovered bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeriesDataValue {
    Ohlc {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
    Value(f64),
}

/// Payload delivered to click, double-click and crosshair-move subscribers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MouseEventParams {
    /// Time of the hovered bar, `None` outside the data.
    pub time: Option<Time>,
    pub logical: Option<f64>,
    /// Pointer position in pane coordinates, `None` once the pointer left.
    pub point: Option<Point>,
    pub pane_index: Option<usize>,
    pub series_data: IndexMap<SeriesId, SeriesDataValue>,
    pub hovered_series: Option<SeriesId>,
    pub hovered_object_id: Option<String>,
}

type MouseEventHandler = Box<dyn FnMut(&MouseEventParams)>;

#[derive(Default)]
struct HandlerList(Vec<(SubscriptionId, MouseEventHandler)>);

impl HandlerList {
    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.0.len();
        self.0.retain(|(entry, _)| *entry != id);
        before != self.0.len()
    }

    fn notify(&mut self, params: &MouseEventParams) {
        for (_, handler) in &mut self.0 {
            handler(params);
        }
    }
}

#[derive(Default)]
pub(super) struct Subscriptions {
    next_id: u64,
    click: HandlerList,
    double_click: HandlerList,
    crosshair_move: HandlerList,
}

impl Subscriptions {
    fn next_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    pub(super) fn has_crosshair_move(&self) -> bool {
        !self.crosshair_move.0.is_empty()
    }

    pub(super) fn has_click(&self) -> bool {
        !self.click.0.is_empty()
    }

    pub(super) fn has_double_click(&self) -> bool {
        !self.double_click.0.is_empty()
    }
}

impl<R: Renderer> ChartEngine<R> {
    pub fn subscribe_click(&mut self, handler: impl FnMut(&MouseEventParams) + 'static) -> SubscriptionId {
        let subscriptions = &mut self.core.runtime.subscriptions;
        let id = subscriptions.next_id();
        subscriptions.click.0.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe_click(&mut self, id: SubscriptionId) -> bool {
        self.core.runtime.subscriptions.click.remove(id)
    }

    pub fn subscribe_double_click(
        &mut self,
        handler: impl FnMut(&MouseEventParams) + 'static,
    ) -> SubscriptionId {
        let subscriptions = &mut self.core.runtime.subscriptions;
        let id = subscriptions.next_id();
        subscriptions.double_click.0.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe_double_click(&mut self, id: SubscriptionId) -> bool {
        self.core.runtime.subscriptions.double_click.remove(id)
    }

    pub fn subscribe_crosshair_move(
        &mut self,
        handler: impl FnMut(&MouseEventParams) + 'static,
    ) -> SubscriptionId {
        let subscriptions = &mut self.core.runtime.subscriptions;
        let id = subscriptions.next_id();
        subscriptions.crosshair_move.0.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe_crosshair_move(&mut self, id: SubscriptionId) -> bool {
        self.core.runtime.subscriptions.crosshair_move.remove(id)
    }

    pub(super) fn notify_click(&mut self, params: &MouseEventParams) {
        trace!(time = ?params.time, "click");
        self.core.runtime.subscriptions.click.notify(params);
    }

    pub(super) fn notify_double_click(&mut self, params: &MouseEventParams) {
        trace!(time = ?params.time, "double click");
        self.core.runtime.subscriptions.double_click.notify(params);
    }

    pub(super) fn notify_crosshair_move(&mut self, params: &MouseEventParams) {
        self.core.runtime.subscriptions.crosshair_move.notify(params);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{MouseEventParams, Subscriptions};

    #[test]
    fn handlers_run_in_order_until_removed() {
        let mut subscriptions = Subscriptions::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let first = subscriptions.next_id();
        let log = Rc::clone(&seen);
        subscriptions
            .click
            .0
            .push((first, Box::new(move |_| log.borrow_mut().push(1))));
        let second = subscriptions.next_id();
        let log = Rc::clone(&seen);
        subscriptions
            .click
            .0
            .push((second, Box::new(move |_| log.borrow_mut().push(2))));

        subscriptions.click.notify(&MouseEventParams::default());
        assert!(subscriptions.click.remove(first));
        assert!(!subscriptions.click.remove(first));
        subscriptions.click.notify(&MouseEventParams::default());
        assert_eq!(*seen.borrow(), vec![1, 2, 2]);
        assert_ne!(first, second);
    }
}
