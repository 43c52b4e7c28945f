use crate::interaction::{WheelDelta, WheelDeltaMode};

/// Pixels per wheel unit for each delta mode.
#[must_use]
pub fn wheel_delta_multiplier(mode: WheelDeltaMode) -> f64 {
    match mode {
        WheelDeltaMode::Page => 120.0,
        WheelDeltaMode::Line => 32.0,
        WheelDeltaMode::Pixel => 1.0,
    }
}

/// Time-scale change requested by one wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelAction {
    /// Zoom factor in `[-1, 1]` around the pointer.
    pub zoom: Option<f64>,
    /// Pixels to scroll the chart by.
    pub scroll_px: Option<f64>,
}

impl WheelAction {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.zoom.is_none() && self.scroll_px.is_none()
    }
}

/// Maps a wheel delta to zoom and scroll, honouring which of them are enabled.
///
/// Vertical delta zooms, horizontal delta scrolls.
#[must_use]
pub fn resolve_wheel(delta: WheelDelta, scroll_enabled: bool, scale_enabled: bool) -> WheelAction {
    let multiplier = wheel_delta_multiplier(delta.mode);
    let scroll = multiplier * delta.delta_x / 100.0;
    let zoom = -multiplier * delta.delta_y / 100.0;

    let mut action = WheelAction::default();
    if zoom != 0.0 && scale_enabled {
        action.zoom = Some(zoom.signum() * zoom.abs().min(1.0));
    }
    if scroll != 0.0 && scroll_enabled {
        action.scroll_px = Some(-80.0 * scroll);
    }
    action
}

#[cfg(test)]
mod tests {
    use super::resolve_wheel;
    use crate::interaction::{WheelDelta, WheelDeltaMode};

    #[test]
    fn line_mode_zoom_is_clamped_to_one() {
        let action = resolve_wheel(
            WheelDelta {
                delta_x: 0.0,
                delta_y: -5.0,
                mode: WheelDeltaMode::Line,
            },
            true,
            true,
        );
        assert_eq!(action.zoom, Some(1.0));
        assert!(action.scroll_px.is_none());
    }

    #[test]
    fn pixel_mode_scroll_and_zoom_respect_switches() {
        let delta = WheelDelta {
            delta_x: 50.0,
            delta_y: 20.0,
            mode: WheelDeltaMode::Pixel,
        };
        let action = resolve_wheel(delta, true, true);
        assert_eq!(action.zoom, Some(-0.2));
        assert_eq!(action.scroll_px, Some(-40.0));

        let disabled = resolve_wheel(delta, false, false);
        assert!(disabled.is_empty());
    }
}
