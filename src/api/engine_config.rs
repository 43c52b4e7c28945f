use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::interaction::{CrosshairOptions, GestureOptions};
use crate::model::{PriceScaleOptions, TimeScaleOptions};
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub background: Color,
    pub text_color: Color,
    /// Axis label font size in media pixels.
    pub font_size: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            background: Color::rgb(1.0, 1.0, 1.0),
            text_color: Color::rgb(0.1, 0.1, 0.1),
            font_size: 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLineOptions {
    pub visible: bool,
    pub color: Color,
}

impl Default for GridLineOptions {
    fn default() -> Self {
        Self {
            visible: true,
            color: Color::rgb(0.85, 0.88, 0.92),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub vert_lines: GridLineOptions,
    pub horz_lines: GridLineOptions,
}

/// Which gestures may scroll the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleScrollOptions {
    pub mouse_wheel: bool,
    pub pressed_mouse_move: bool,
    pub horz_touch_drag: bool,
    pub vert_touch_drag: bool,
}

impl Default for HandleScrollOptions {
    fn default() -> Self {
        Self {
            mouse_wheel: true,
            pressed_mouse_move: true,
            horz_touch_drag: true,
            vert_touch_drag: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisInteractionOptions {
    pub time: bool,
    pub price: bool,
}

impl Default for AxisInteractionOptions {
    fn default() -> Self {
        Self {
            time: true,
            price: true,
        }
    }
}

/// Which gestures may scale the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleScaleOptions {
    pub mouse_wheel: bool,
    pub pinch: bool,
    pub axis_pressed_mouse_move: AxisInteractionOptions,
    pub axis_double_click_reset: AxisInteractionOptions,
}

impl Default for HandleScaleOptions {
    fn default() -> Self {
        Self {
            mouse_wheel: true,
            pinch: true,
            axis_pressed_mouse_move: AxisInteractionOptions::default(),
            axis_double_click_reset: AxisInteractionOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticScrollOptions {
    pub mouse: bool,
    pub touch: bool,
}

impl Default for KineticScrollOptions {
    fn default() -> Self {
        Self {
            mouse: false,
            touch: true,
        }
    }
}

/// Chart-wide options. Every field has a default, so JSON input may be partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub viewport: Viewport,
    /// Size follows `on_container_resized` instead of `viewport`.
    pub auto_size: bool,
    pub device_pixel_ratio: f64,
    pub layout: LayoutOptions,
    pub time_scale: TimeScaleOptions,
    pub left_price_scale: PriceScaleOptions,
    pub right_price_scale: PriceScaleOptions,
    pub crosshair: CrosshairOptions,
    pub grid: GridOptions,
    pub handle_scroll: HandleScrollOptions,
    pub handle_scale: HandleScaleOptions,
    pub kinetic_scroll: KineticScrollOptions,
    pub gestures: GestureOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(800, 600),
            auto_size: false,
            device_pixel_ratio: 1.0,
            layout: LayoutOptions::default(),
            time_scale: TimeScaleOptions::default(),
            left_price_scale: PriceScaleOptions {
                visible: false,
                ..PriceScaleOptions::default()
            },
            right_price_scale: PriceScaleOptions::default(),
            crosshair: CrosshairOptions::default(),
            grid: GridOptions::default(),
            handle_scroll: HandleScrollOptions::default(),
            handle_scale: HandleScaleOptions::default(),
            kinetic_scroll: KineticScrollOptions::default(),
            gestures: GestureOptions::default(),
        }
    }
}

impl ChartOptions {
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Parses options from JSON; missing fields take their defaults.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let options: Self = serde_json::from_str(input)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns a copy of `self` with the fields present in `patch` replaced.
    /// Nested objects merge field by field.
    pub fn merged_with_json(&self, patch: &str) -> ChartResult<Self> {
        let mut current = serde_json::to_value(self)?;
        let patch: serde_json::Value = serde_json::from_str(patch)?;
        merge_json(&mut current, patch);
        let merged: Self = serde_json::from_value(current)?;
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.auto_size && !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "device pixel ratio must be finite and > 0".to_owned(),
            ));
        }
        if !self.layout.font_size.is_finite() || self.layout.font_size <= 0.0 {
            return Err(ChartError::InvalidData(
                "layout font size must be finite and > 0".to_owned(),
            ));
        }
        self.left_price_scale.scale_margins.validate()?;
        self.right_price_scale.scale_margins.validate()?;
        Ok(())
    }
}

fn merge_json(target: &mut serde_json::Value, patch: serde_json::Value) {
    match (target, patch) {
        (serde_json::Value::Object(target), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::ChartOptions;
    use crate::error::ChartError;
    use crate::interaction::CrosshairMode;

    #[test]
    fn partial_json_keeps_defaults() {
        let options = ChartOptions::from_json_str(
            r#"{"viewport":{"width":640,"height":480},"kinetic_scroll":{"mouse":true}}"#,
        )
        .expect("options");
        assert_eq!(options.viewport.width, 640);
        assert!(options.kinetic_scroll.mouse);
        assert!(options.kinetic_scroll.touch);
        assert!(options.handle_scale.pinch);
        assert!(!options.left_price_scale.visible);
    }

    #[test]
    fn merge_replaces_only_present_fields() {
        let base = ChartOptions::default();
        let merged = base
            .merged_with_json(r#"{"crosshair":{"mode":"Magnet"},"layout":{"font_size":14}}"#)
            .expect("merge");
        assert_eq!(merged.crosshair.mode, CrosshairMode::Magnet);
        assert!(merged.crosshair.vert_line.visible);
        assert!((merged.layout.font_size - 14.0).abs() <= f64::EPSILON);
        assert_eq!(merged.viewport, base.viewport);
    }

    #[test]
    fn malformed_json_is_invalid_options() {
        let err = ChartOptions::from_json_str("{ not json").expect_err("must fail");
        assert!(matches!(err, ChartError::InvalidOptions(_)));
    }

    #[test]
    fn rejects_bad_margins_and_font() {
        let err = ChartOptions::from_json_str(
            r#"{"right_price_scale":{"scale_margins":{"top":0.7,"bottom":0.6}}}"#,
        )
        .expect_err("margins");
        assert!(matches!(err, ChartError::InvalidScaleMargins { .. }));

        let err = ChartOptions::from_json_str(r#"{"layout":{"font_size":0}}"#).expect_err("font");
        assert!(matches!(err, ChartError::InvalidData(_)));
    }

    #[test]
    fn json_round_trip_is_stable() {
        let options = ChartOptions::default();
        let json = options.to_json_pretty().expect("json");
        let parsed = ChartOptions::from_json_str(&json).expect("parse");
        assert_eq!(parsed, options);
    }
}
