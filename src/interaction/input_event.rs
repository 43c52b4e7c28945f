use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Point;

/// Device that produced an input event, tagged at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputOrigin {
    Mouse,
    Touch,
    Pen,
    /// The host could not tell; mouse events right after a touch are then
    /// treated as touch emulation.
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEventKind {
    MouseEnter,
    MouseMove,
    MouseDown,
    MouseUp,
    MouseLeave,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    Wheel,
}

impl InputEventKind {
    #[must_use]
    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            Self::MouseEnter | Self::MouseMove | Self::MouseDown | Self::MouseUp | Self::MouseLeave
        )
    }

    #[must_use]
    pub fn is_touch(self) -> bool {
        matches!(
            self,
            Self::TouchStart | Self::TouchMove | Self::TouchEnd | Self::TouchCancel
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// One pointer location in every coordinate space the host knows about.
///
/// `local` is relative to the surface that received the event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerCoordinates {
    pub client: Point,
    pub page: Point,
    pub screen: Point,
    pub local: Point,
}

impl PointerCoordinates {
    /// Coordinates for hosts that only track surface-local positions.
    #[must_use]
    pub fn local(local: Point) -> Self {
        Self {
            client: local,
            page: local,
            screen: local,
            local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub coordinates: PointerCoordinates,
}

impl TouchPoint {
    #[must_use]
    pub fn new(id: u64, local: Point) -> Self {
        Self {
            id,
            coordinates: PointerCoordinates::local(local),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WheelDelta {
    pub delta_x: f64,
    pub delta_y: f64,
    pub mode: WheelDeltaMode,
}

pub type TouchList = SmallVec<[TouchPoint; 2]>;

/// Raw host input, before gesture recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub kind: InputEventKind,
    pub origin: InputOrigin,
    pub timestamp_ms: f64,
    /// Pointer position for mouse and wheel events.
    pub coordinates: PointerCoordinates,
    pub modifiers: Modifiers,
    /// Mouse button, `0` for the primary one.
    pub button: u8,
    /// Touches still on the surface after this event.
    pub touches: TouchList,
    /// Touches that started, moved or ended in this event.
    pub changed_touches: TouchList,
    pub wheel: Option<WheelDelta>,
}

impl InputEvent {
    #[must_use]
    pub fn mouse(kind: InputEventKind, local: Point, timestamp_ms: f64) -> Self {
        Self {
            kind,
            origin: InputOrigin::Unknown,
            timestamp_ms,
            coordinates: PointerCoordinates::local(local),
            modifiers: Modifiers::default(),
            button: 0,
            touches: TouchList::new(),
            changed_touches: TouchList::new(),
            wheel: None,
        }
    }

    #[must_use]
    pub fn touch(
        kind: InputEventKind,
        touches: &[TouchPoint],
        changed_touches: &[TouchPoint],
        timestamp_ms: f64,
    ) -> Self {
        let coordinates = changed_touches
            .first()
            .map(|touch| touch.coordinates)
            .unwrap_or_default();
        Self {
            kind,
            origin: InputOrigin::Touch,
            timestamp_ms,
            coordinates,
            modifiers: Modifiers::default(),
            button: 0,
            touches: touches.iter().copied().collect(),
            changed_touches: changed_touches.iter().copied().collect(),
            wheel: None,
        }
    }

    #[must_use]
    pub fn wheel(local: Point, delta: WheelDelta, timestamp_ms: f64) -> Self {
        Self {
            wheel: Some(delta),
            ..Self::mouse(InputEventKind::Wheel, local, timestamp_ms)
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: InputOrigin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_coordinates(mut self, coordinates: PointerCoordinates) -> Self {
        self.coordinates = coordinates;
        self
    }

    #[must_use]
    pub fn local(&self) -> Point {
        self.coordinates.local
    }
}
