//! Mouse and touch gesture recognition.
//!
//! `GestureRecognizer` turns raw `InputEvent`s into one normalized event
//! stream: press, pressed-move, release, click, double click, long tap, pinch
//! and wheel. Timers are not owned here; time-based decisions use the event
//! timestamps and the host polls `poll(now_ms)` for long taps.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::core::Point;
use crate::interaction::{
    InputEvent, InputEventKind, InputOrigin, Modifiers, PointerCoordinates, TouchPoint, WheelDelta,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureOptions {
    /// Manhattan distance a press may travel and still count as a click.
    pub click_distance_px: f64,
    /// Movement after which a press becomes a drag.
    pub drag_threshold_px: f64,
    pub double_click_window_ms: f64,
    pub double_click_distance_mouse_px: f64,
    pub double_click_distance_touch_px: f64,
    pub long_tap_ms: f64,
    /// Unknown-origin mouse events closer than this to the last touch are
    /// touch emulation.
    pub synthetic_mouse_window_ms: f64,
}

impl Default for GestureOptions {
    fn default() -> Self {
        Self {
            click_distance_px: 5.0,
            drag_threshold_px: 5.0,
            double_click_window_ms: 500.0,
            double_click_distance_mouse_px: 5.0,
            double_click_distance_touch_px: 30.0,
            long_tap_ms: 240.0,
            synthetic_mouse_window_ms: 500.0,
        }
    }
}

/// Normalized pointer payload shared by mouse and touch gestures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub coordinates: PointerCoordinates,
    pub modifiers: Modifiers,
    pub is_touch: bool,
    pub timestamp_ms: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn local(&self) -> Point {
        self.coordinates.local
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureEvent {
    MouseEnter(PointerEvent),
    MouseMove(PointerEvent),
    MouseLeave(PointerEvent),
    PointerDown(PointerEvent),
    PressedMove(PointerEvent),
    PointerUp(PointerEvent),
    Click(PointerEvent),
    DoubleClick(PointerEvent),
    LongTap(PointerEvent),
    PinchStart,
    Pinch { pivot: Point, scale: f64 },
    PinchEnd,
    Wheel { event: PointerEvent, delta: WheelDelta },
}

/// Events produced by one input, plus whether the host should cancel the
/// platform default (page scroll, emulated mouse events).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GestureOutput {
    pub events: SmallVec<[GestureEvent; 4]>,
    pub prevent_default: bool,
}

impl GestureOutput {
    fn push(&mut self, event: GestureEvent) {
        self.events.push(event);
    }
}

/// Pending multi-click detection: first press position and time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ClickWindow {
    started_ms: f64,
    position: Point,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchState {
    start_distance: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    options: GestureOptions,
    allow_horz_touch_drag: bool,
    allow_vert_touch_drag: bool,

    mouse_pressed: bool,
    mouse_down_position: Option<Point>,
    mouse_moved_beyond_click: bool,
    mouse_click_window: Option<ClickWindow>,
    mouse_inside: bool,

    tracked_touch: Option<u64>,
    touch_start_position: Option<Point>,
    last_touch: Option<TouchPoint>,
    touch_dragging: bool,
    touch_rejected: bool,
    touch_cancel_click: bool,
    touch_moved: bool,
    long_tap_deadline: Option<f64>,
    long_tap_active: bool,
    tap_window: Option<ClickWindow>,
    last_touch_time_ms: Option<f64>,
    pinch: Option<PinchState>,
}

impl GestureRecognizer {
    #[must_use]
    pub fn new(options: GestureOptions) -> Self {
        Self {
            options,
            allow_horz_touch_drag: true,
            allow_vert_touch_drag: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn options(&self) -> GestureOptions {
        self.options
    }

    pub fn set_options(&mut self, options: GestureOptions) {
        self.options = options;
    }

    /// Axes on which a one-finger drag is handled by the chart. A drag that
    /// starts along a disallowed axis is left to the page.
    pub fn set_touch_drag_axes(&mut self, horizontal: bool, vertical: bool) {
        self.allow_horz_touch_drag = horizontal;
        self.allow_vert_touch_drag = vertical;
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.mouse_pressed || self.tracked_touch.is_some()
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    pub fn handle(&mut self, event: &InputEvent) -> GestureOutput {
        let mut out = GestureOutput::default();
        self.expire_click_windows(event.timestamp_ms);
        match event.kind {
            InputEventKind::MouseEnter => self.on_mouse_enter(event, &mut out),
            InputEventKind::MouseMove => self.on_mouse_move(event, &mut out),
            InputEventKind::MouseDown => self.on_mouse_down(event, &mut out),
            InputEventKind::MouseUp => self.on_mouse_up(event, &mut out),
            InputEventKind::MouseLeave => self.on_mouse_leave(event, &mut out),
            InputEventKind::TouchStart => self.on_touch_start(event, &mut out),
            InputEventKind::TouchMove => self.on_touch_move(event, &mut out),
            InputEventKind::TouchEnd => self.on_touch_end(event, &mut out),
            InputEventKind::TouchCancel => self.on_touch_cancel(&mut out),
            InputEventKind::Wheel => {
                if let Some(delta) = event.wheel {
                    out.prevent_default = delta.delta_x != 0.0 || delta.delta_y != 0.0;
                    out.push(GestureEvent::Wheel {
                        event: pointer(event, event.coordinates, false),
                        delta,
                    });
                }
            }
        }
        if !out.events.is_empty() {
            trace!(kind = ?event.kind, produced = out.events.len(), "gesture input");
        }
        out
    }

    /// Fires a pending long tap once its deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<GestureEvent> {
        let deadline = self.long_tap_deadline?;
        if now_ms < deadline {
            return None;
        }
        self.long_tap_deadline = None;
        let touch = self.last_touch?;
        self.touch_cancel_click = true;
        self.long_tap_active = true;
        Some(GestureEvent::LongTap(PointerEvent {
            coordinates: touch.coordinates,
            modifiers: Modifiers::default(),
            is_touch: true,
            timestamp_ms: now_ms,
        }))
    }

    /// Drops every in-flight gesture.
    pub fn reset(&mut self) {
        *self = Self {
            options: self.options,
            allow_horz_touch_drag: self.allow_horz_touch_drag,
            allow_vert_touch_drag: self.allow_vert_touch_drag,
            ..Self::default()
        };
    }

    fn expire_click_windows(&mut self, now_ms: f64) {
        let window = self.options.double_click_window_ms;
        if self
            .mouse_click_window
            .is_some_and(|w| now_ms - w.started_ms >= window)
        {
            self.mouse_click_window = None;
        }
        if self.tap_window.is_some_and(|w| now_ms - w.started_ms >= window) {
            self.tap_window = None;
        }
    }

    fn is_emulated_mouse(&self, event: &InputEvent) -> bool {
        match event.origin {
            InputOrigin::Touch => true,
            InputOrigin::Mouse | InputOrigin::Pen => false,
            InputOrigin::Unknown => self.last_touch_time_ms.is_some_and(|last| {
                event.timestamp_ms < last + self.options.synthetic_mouse_window_ms
            }),
        }
    }

    fn on_mouse_enter(&mut self, event: &InputEvent, out: &mut GestureOutput) {
        if self.is_emulated_mouse(event) {
            return;
        }
        self.mouse_inside = true;
        out.push(GestureEvent::MouseEnter(pointer(event, event.coordinates, false)));
    }

    fn on_mouse_leave(&mut self, event: &InputEvent, out: &mut GestureOutput) {
        if self.is_emulated_mouse(event) || !self.mouse_inside {
            return;
        }
        self.mouse_inside = false;
        out.push(GestureEvent::MouseLeave(pointer(event, event.coordinates, false)));
    }

    fn on_mouse_move(&mut self, event: &InputEvent, out: &mut GestureOutput) {
        if self.mouse_pressed {
            let Some(down) = self.mouse_down_position else {
                return;
            };
            if down.manhattan_distance(event.local()) >= self.options.drag_threshold_px {
                self.mouse_moved_beyond_click = true;
                self.mouse_click_window = None;
            }
            if self.mouse_moved_beyond_click {
                out.push(GestureEvent::PressedMove(pointer(event, event.coordinates, false)));
            }
            return;
        }
        if self.tracked_touch.is_some() || self.is_emulated_mouse(event) {
            return;
        }
        self.mouse_inside = true;
        out.push(GestureEvent::MouseMove(pointer(event, event.coordinates, false)));
    }

    fn on_mouse_down(&mut self, event: &InputEvent, out: &mut GestureOutput) {
        if event.button != 0 || self.is_emulated_mouse(event) {
            return;
        }
        self.mouse_pressed = true;
        self.mouse_moved_beyond_click = false;
        self.mouse_down_position = Some(event.local());
        out.push(GestureEvent::PointerDown(pointer(event, event.coordinates, false)));
        if self.mouse_click_window.is_none() {
            self.mouse_click_window = Some(ClickWindow {
                started_ms: event.timestamp_ms,
                position: event.local(),
                count: 0,
            });
        }
    }

    fn on_mouse_up(&mut self, event: &InputEvent, out: &mut GestureOutput) {
        if event.button != 0 || !self.mouse_pressed {
            return;
        }
        self.mouse_pressed = false;
        self.mouse_down_position = None;
        if self.is_emulated_mouse(event) {
            return;
        }
        let payload = pointer(event, event.coordinates, false);
        out.push(GestureEvent::PointerUp(payload));

        let moved = self.mouse_moved_beyond_click;
        match self.mouse_click_window.as_mut() {
            Some(window) => {
                window.count += 1;
                if window.count > 1 {
                    let distance = window.position.manhattan_distance(event.local());
                    if distance < self.options.double_click_distance_mouse_px && !moved {
                        out.push(GestureEvent::DoubleClick(payload));
                    }
                    self.mouse_click_window = None;
                } else if !moved {
                    out.push(GestureEvent::Click(payload));
                }
            }
            None if !moved => out.push(GestureEvent::Click(payload)),
            None => {}
        }
    }

    fn tracked_in<'a>(&self, touches: &'a [TouchPoint]) -> Option<&'a TouchPoint> {
        let id = self.tracked_touch?;
        touches.iter().find(|touch| touch.id == id)
    }

    fn on_touch_start(&mut self, event: &InputEvent, out: &mut GestureOutput) {
        self.last_touch_time_ms = Some(event.timestamp_ms);
        if self.tracked_touch.is_none()
            && let Some(touch) = event.changed_touches.first().copied()
        {
            self.tracked_touch = Some(touch.id);
            self.last_touch = Some(touch);
            self.touch_start_position = Some(touch.coordinates.local);
            self.touch_cancel_click = false;
            self.touch_dragging = false;
            self.touch_rejected = false;
            self.long_tap_deadline = Some(event.timestamp_ms + self.options.long_tap_ms);
            out.push(GestureEvent::PointerDown(pointer(event, touch.coordinates, true)));
            if self.tap_window.is_none() {
                self.tap_window = Some(ClickWindow {
                    started_ms: event.timestamp_ms,
                    position: touch.coordinates.local,
                    count: 0,
                });
            }
        }
        self.update_pinch(&event.touches, out);
    }

    fn on_touch_move(&mut self, event: &InputEvent, out: &mut GestureOutput) {
        self.last_touch_time_ms = Some(event.timestamp_ms);
        if let (Some(pinch), [first, second]) = (self.pinch, event.touches.as_slice()) {
            let distance = touch_distance(first, second);
            if pinch.start_distance > 0.0 {
                out.push(GestureEvent::Pinch {
                    pivot: midpoint(first, second),
                    scale: distance / pinch.start_distance,
                });
                out.prevent_default = true;
            }
        }

        let Some(touch) = self.tracked_in(&event.changed_touches).copied() else {
            return;
        };
        self.last_touch = Some(touch);
        if self.pinch.is_some() || self.touch_rejected {
            return;
        }
        self.touch_moved = true;

        let Some(start) = self.touch_start_position else {
            return;
        };
        let local = touch.coordinates.local;
        let x_offset = (local.x - start.x).abs();
        let y_offset = (local.y - start.y).abs();
        if !self.touch_dragging && x_offset + y_offset < self.options.drag_threshold_px {
            return;
        }
        if !self.touch_dragging {
            let half_x = 0.5 * x_offset;
            let vertical = y_offset >= half_x && self.allow_vert_touch_drag;
            let horizontal = half_x > y_offset && self.allow_horz_touch_drag;
            if !vertical && !horizontal {
                self.touch_rejected = true;
            }
            self.touch_dragging = true;
            self.touch_cancel_click = true;
            self.long_tap_deadline = None;
            self.tap_window = None;
        }
        if !self.touch_rejected {
            out.push(GestureEvent::PressedMove(pointer(event, touch.coordinates, true)));
            out.prevent_default = true;
        }
    }

    fn on_touch_end(&mut self, event: &InputEvent, out: &mut GestureOutput) {
        let touch = match self.tracked_in(&event.changed_touches) {
            Some(touch) => Some(*touch),
            None if event.touches.is_empty() => event.changed_touches.first().copied(),
            None => None,
        };
        if let Some(touch) = touch {
            self.tracked_touch = None;
            self.last_touch = None;
            self.touch_start_position = None;
            self.last_touch_time_ms = Some(event.timestamp_ms);
            self.long_tap_deadline = None;

            let payload = pointer(event, touch.coordinates, true);
            out.push(GestureEvent::PointerUp(payload));
            let cancel_click = self.touch_cancel_click;
            match self.tap_window.as_mut() {
                Some(window) => {
                    window.count += 1;
                    if window.count > 1 {
                        let distance = window.position.manhattan_distance(touch.coordinates.local);
                        if distance < self.options.double_click_distance_touch_px && !cancel_click {
                            out.push(GestureEvent::DoubleClick(payload));
                        }
                        self.tap_window = None;
                    } else if !cancel_click {
                        out.push(GestureEvent::Click(payload));
                        out.prevent_default = true;
                    }
                }
                None if !cancel_click => {
                    out.push(GestureEvent::Click(payload));
                    out.prevent_default = true;
                }
                None => {}
            }
            if event.touches.is_empty() && self.long_tap_active {
                self.long_tap_active = false;
                out.prevent_default = true;
            }
        }
        self.update_pinch(&event.touches, out);
    }

    fn on_touch_cancel(&mut self, out: &mut GestureOutput) {
        self.long_tap_deadline = None;
        self.tracked_touch = None;
        self.last_touch = None;
        self.touch_start_position = None;
        if self.pinch.take().is_some() {
            out.push(GestureEvent::PinchEnd);
        }
    }

    fn update_pinch(&mut self, touches: &[TouchPoint], out: &mut GestureOutput) {
        if touches.len() == 1 {
            self.touch_moved = false;
        }
        match touches {
            [first, second] if !self.touch_moved && !self.long_tap_active => {
                self.pinch = Some(PinchState {
                    start_distance: touch_distance(first, second),
                });
                self.long_tap_deadline = None;
                out.push(GestureEvent::PinchStart);
            }
            _ => {
                if self.pinch.take().is_some() {
                    out.push(GestureEvent::PinchEnd);
                }
            }
        }
    }
}

fn pointer(event: &InputEvent, coordinates: PointerCoordinates, is_touch: bool) -> PointerEvent {
    PointerEvent {
        coordinates,
        modifiers: event.modifiers,
        is_touch,
        timestamp_ms: event.timestamp_ms,
    }
}

fn touch_distance(first: &TouchPoint, second: &TouchPoint) -> f64 {
    let dx = first.coordinates.client.x - second.coordinates.client.x;
    let dy = first.coordinates.client.y - second.coordinates.client.y;
    (dx * dx + dy * dy).sqrt()
}

fn midpoint(first: &TouchPoint, second: &TouchPoint) -> Point {
    Point::new(
        (first.coordinates.local.x + second.coordinates.local.x) / 2.0,
        (first.coordinates.local.y + second.coordinates.local.y) / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::{GestureEvent, GestureOptions, GestureRecognizer};
    use crate::core::Point;
    use crate::interaction::{InputEvent, InputEventKind, InputOrigin, TouchPoint};

    fn mouse(kind: InputEventKind, x: f64, y: f64, t: f64) -> InputEvent {
        InputEvent::mouse(kind, Point::new(x, y), t).with_origin(InputOrigin::Mouse)
    }

    fn kinds(events: &[GestureEvent]) -> Vec<&'static str> {
        events
            .iter()
            .map(|event| match event {
                GestureEvent::MouseEnter(_) => "enter",
                GestureEvent::MouseMove(_) => "move",
                GestureEvent::MouseLeave(_) => "leave",
                GestureEvent::PointerDown(_) => "down",
                GestureEvent::PressedMove(_) => "pressed_move",
                GestureEvent::PointerUp(_) => "up",
                GestureEvent::Click(_) => "click",
                GestureEvent::DoubleClick(_) => "double_click",
                GestureEvent::LongTap(_) => "long_tap",
                GestureEvent::PinchStart => "pinch_start",
                GestureEvent::Pinch { .. } => "pinch",
                GestureEvent::PinchEnd => "pinch_end",
                GestureEvent::Wheel { .. } => "wheel",
            })
            .collect()
    }

    #[test]
    fn short_press_is_a_click() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        let down = recognizer.handle(&mouse(InputEventKind::MouseDown, 10.0, 10.0, 0.0));
        assert_eq!(kinds(&down.events), ["down"]);
        let moved = recognizer.handle(&mouse(InputEventKind::MouseMove, 12.0, 11.0, 10.0));
        assert!(moved.events.is_empty());
        let up = recognizer.handle(&mouse(InputEventKind::MouseUp, 12.0, 11.0, 20.0));
        assert_eq!(kinds(&up.events), ["up", "click"]);
    }

    #[test]
    fn movement_past_threshold_becomes_drag_without_click() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        recognizer.handle(&mouse(InputEventKind::MouseDown, 10.0, 10.0, 0.0));
        let moved = recognizer.handle(&mouse(InputEventKind::MouseMove, 16.0, 10.0, 10.0));
        assert_eq!(kinds(&moved.events), ["pressed_move"]);
        let up = recognizer.handle(&mouse(InputEventKind::MouseUp, 16.0, 10.0, 20.0));
        assert_eq!(kinds(&up.events), ["up"]);
    }

    #[test]
    fn two_clicks_inside_window_make_double_click() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        recognizer.handle(&mouse(InputEventKind::MouseDown, 10.0, 10.0, 0.0));
        recognizer.handle(&mouse(InputEventKind::MouseUp, 10.0, 10.0, 50.0));
        recognizer.handle(&mouse(InputEventKind::MouseDown, 11.0, 10.0, 200.0));
        let up = recognizer.handle(&mouse(InputEventKind::MouseUp, 11.0, 10.0, 250.0));
        assert_eq!(kinds(&up.events), ["up", "double_click"]);
    }

    #[test]
    fn second_click_after_window_starts_a_new_gesture() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        recognizer.handle(&mouse(InputEventKind::MouseDown, 10.0, 10.0, 0.0));
        recognizer.handle(&mouse(InputEventKind::MouseUp, 10.0, 10.0, 50.0));
        recognizer.handle(&mouse(InputEventKind::MouseDown, 10.0, 10.0, 700.0));
        let up = recognizer.handle(&mouse(InputEventKind::MouseUp, 10.0, 10.0, 750.0));
        assert_eq!(kinds(&up.events), ["up", "click"]);
    }

    #[test]
    fn far_second_click_is_not_a_double_click() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        recognizer.handle(&mouse(InputEventKind::MouseDown, 10.0, 10.0, 0.0));
        recognizer.handle(&mouse(InputEventKind::MouseUp, 10.0, 10.0, 50.0));
        recognizer.handle(&mouse(InputEventKind::MouseDown, 30.0, 10.0, 200.0));
        let up = recognizer.handle(&mouse(InputEventKind::MouseUp, 30.0, 10.0, 250.0));
        assert_eq!(kinds(&up.events), ["up"]);
    }

    #[test]
    fn unknown_origin_mouse_after_touch_is_ignored() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        let touch = TouchPoint::new(7, Point::new(5.0, 5.0));
        recognizer.handle(&InputEvent::touch(
            InputEventKind::TouchStart,
            &[touch],
            &[touch],
            0.0,
        ));
        recognizer.handle(&InputEvent::touch(InputEventKind::TouchEnd, &[], &[touch], 40.0));
        let emulated = InputEvent::mouse(InputEventKind::MouseMove, Point::new(5.0, 5.0), 100.0);
        assert!(recognizer.handle(&emulated).events.is_empty());
        let later = InputEvent::mouse(InputEventKind::MouseMove, Point::new(5.0, 5.0), 800.0);
        assert_eq!(kinds(&recognizer.handle(&later).events), ["move"]);
    }

    #[test]
    fn long_tap_fires_on_poll_and_suppresses_click() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        let touch = TouchPoint::new(1, Point::new(20.0, 20.0));
        recognizer.handle(&InputEvent::touch(
            InputEventKind::TouchStart,
            &[touch],
            &[touch],
            0.0,
        ));
        assert!(recognizer.poll(100.0).is_none());
        assert!(matches!(recognizer.poll(240.0), Some(GestureEvent::LongTap(_))));
        assert!(recognizer.poll(300.0).is_none());
        let end = recognizer.handle(&InputEvent::touch(InputEventKind::TouchEnd, &[], &[touch], 400.0));
        assert_eq!(kinds(&end.events), ["up"]);
        assert!(end.prevent_default);
    }

    #[test]
    fn vertical_touch_drag_is_rejected_when_axis_is_left_to_page() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        recognizer.set_touch_drag_axes(true, false);
        let start = TouchPoint::new(1, Point::new(50.0, 50.0));
        recognizer.handle(&InputEvent::touch(
            InputEventKind::TouchStart,
            &[start],
            &[start],
            0.0,
        ));
        let moved = TouchPoint::new(1, Point::new(51.0, 70.0));
        let out = recognizer.handle(&InputEvent::touch(
            InputEventKind::TouchMove,
            &[moved],
            &[moved],
            16.0,
        ));
        assert!(out.events.is_empty());
        assert!(!out.prevent_default);

        let horizontal = TouchPoint::new(1, Point::new(90.0, 52.0));
        let out = recognizer.handle(&InputEvent::touch(
            InputEventKind::TouchMove,
            &[horizontal],
            &[horizontal],
            32.0,
        ));
        assert!(out.events.is_empty());
    }

    #[test]
    fn two_fingers_pinch_relative_to_initial_distance() {
        let mut recognizer = GestureRecognizer::new(GestureOptions::default());
        let a = TouchPoint::new(1, Point::new(0.0, 0.0));
        let b = TouchPoint::new(2, Point::new(100.0, 0.0));
        recognizer.handle(&InputEvent::touch(InputEventKind::TouchStart, &[a], &[a], 0.0));
        let start = recognizer.handle(&InputEvent::touch(
            InputEventKind::TouchStart,
            &[a, b],
            &[b],
            10.0,
        ));
        assert_eq!(kinds(&start.events), ["pinch_start"]);
        let b_moved = TouchPoint::new(2, Point::new(200.0, 0.0));
        let out = recognizer.handle(&InputEvent::touch(
            InputEventKind::TouchMove,
            &[a, b_moved],
            &[b_moved],
            20.0,
        ));
        match out.events.as_slice() {
            [GestureEvent::Pinch { pivot, scale }] => {
                assert!((scale - 2.0).abs() <= 1e-12);
                assert_eq!(*pivot, Point::new(100.0, 0.0));
            }
            other => panic!("unexpected events {other:?}"),
        }
        let end = recognizer.handle(&InputEvent::touch(
            InputEventKind::TouchEnd,
            &[a],
            &[b_moved],
            30.0,
        ));
        assert!(kinds(&end.events).contains(&"pinch_end"));
    }
}
