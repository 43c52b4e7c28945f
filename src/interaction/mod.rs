mod gesture;
mod input_event;
pub mod kinetic;
mod wheel;

use serde::{Deserialize, Serialize};

use crate::core::TimePointIndex;
use crate::render::Color;

pub use gesture::{GestureEvent, GestureOptions, GestureOutput, GestureRecognizer, PointerEvent};
pub use input_event::{
    InputEvent, InputEventKind, InputOrigin, Modifiers, PointerCoordinates, TouchList, TouchPoint,
    WheelDelta, WheelDeltaMode,
};
pub use kinetic::{KineticAnimation, KineticParams, KineticSample, KineticTrajectory};
pub use wheel::{WheelAction, resolve_wheel, wheel_delta_multiplier};

/// What an in-progress press is manipulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Pane drag scrolling the time scale (and a manual price scale).
    Scrolling,
    /// Time-axis drag changing bar spacing.
    ScalingTime,
    /// Price-axis drag changing the price range.
    ScalingPrice,
    Pinching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrosshairMode {
    /// Follows the pointer freely.
    #[default]
    Normal,
    /// Snaps the horizontal line to the close of the hovered bar.
    Magnet,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosshairLineOptions {
    pub visible: bool,
    pub width: f64,
    pub color: Color,
    pub label_visible: bool,
}

impl Default for CrosshairLineOptions {
    fn default() -> Self {
        Self {
            visible: true,
            width: 1.0,
            color: Color::rgb(0.59, 0.60, 0.62),
            label_visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrosshairOptions {
    pub mode: CrosshairMode,
    pub vert_line: CrosshairLineOptions,
    pub horz_line: CrosshairLineOptions,
}

/// Resolved crosshair position, in pane media coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CrosshairState {
    pub visible: bool,
    pub pane_index: usize,
    pub x: f64,
    pub y: f64,
    /// Bar under the pointer, `None` when the time scale is empty.
    pub index: Option<TimePointIndex>,
    /// Price at `y` on the pane's default price scale.
    pub price: Option<f64>,
}

impl CrosshairState {
    pub fn hide(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{CrosshairMode, CrosshairOptions, CrosshairState};

    #[test]
    fn crosshair_options_deserialize_partially() {
        let options: CrosshairOptions =
            serde_json::from_str(r#"{"mode":"Magnet","horz_line":{"visible":false}}"#)
                .expect("options");
        assert_eq!(options.mode, CrosshairMode::Magnet);
        assert!(!options.horz_line.visible);
        assert!(options.vert_line.visible);
        assert!((options.horz_line.width - 1.0).abs() <= f64::EPSILON);
    }

    #[test]
    fn hide_clears_position() {
        let mut state = CrosshairState {
            visible: true,
            pane_index: 1,
            x: 4.0,
            y: 5.0,
            index: Some(3),
            price: Some(10.0),
        };
        state.hide();
        assert_eq!(state, CrosshairState::default());
    }
}
