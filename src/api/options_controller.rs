use tracing::debug;

use crate::error::ChartResult;
use crate::interaction::CrosshairMode;
use crate::render::Renderer;

use super::{ChartEngine, ChartOptions};

impl<R: Renderer> ChartEngine<R> {
    /// Replaces the whole option set. Scales keep their data and visible
    /// window; only the changed behavior takes effect.
    ///
    /// With `auto_size` the viewport stays whatever the container last
    /// reported.
    pub fn apply_options(&mut self, mut options: ChartOptions) -> ChartResult<()> {
        options.validate()?;
        if options.auto_size {
            options.viewport = self.core.options.viewport;
        }

        if options.time_scale != self.core.options.time_scale {
            self.core.model.time_scale_mut().apply_options(options.time_scale)?;
        }
        if options.left_price_scale != self.core.options.left_price_scale
            || options.right_price_scale != self.core.options.right_price_scale
        {
            self.core
                .model
                .set_default_price_scale_options(options.left_price_scale, options.right_price_scale)?;
        }
        if options.device_pixel_ratio != self.core.presentation.device_pixel_ratio {
            self.set_device_pixel_ratio(options.device_pixel_ratio)?;
        }

        let crosshair_mode = options.crosshair.mode;
        self.core.options = options;
        self.sync_recognizers();
        if crosshair_mode == CrosshairMode::Hidden {
            self.hide_crosshair();
        } else {
            self.refresh_crosshair();
        }
        self.relayout()?;
        self.core.model.full_update();
        debug!(
            width = self.core.options.viewport.width,
            height = self.core.options.viewport.height,
            auto_size = self.core.options.auto_size,
            "chart options applied"
        );
        Ok(())
    }

    /// Merges a partial JSON object into the current options and applies
    /// the result. Invalid patches leave the engine untouched.
    pub fn apply_options_json(&mut self, patch: &str) -> ChartResult<()> {
        let merged = self.core.options.merged_with_json(patch)?;
        self.apply_options(merged)
    }
}
