use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Point, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::model::{PriceScaleId, distribute_pane_heights};
use crate::render::{
    BitmapSize, CanvasBinding, MediaSize, PriceAxisSide, Renderer, SurfaceId,
};

use super::ChartEngine;

/// Space between the time axis labels and the axis edges.
const TIME_AXIS_PADDING: f64 = 16.0;
pub(super) const PRICE_AXIS_BORDER: f64 = 1.0;
pub(super) const PRICE_AXIS_TICK_LENGTH: f64 = 5.0;

/// Horizontal label padding on each side of a price axis label.
pub(super) fn price_axis_label_padding(font_size: f64) -> f64 {
    font_size / 12.0 * 4.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PaneLayout {
    pub top: f64,
    pub height: f64,
}

/// Media-space placement of every chart surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub left_axis_width: f64,
    pub right_axis_width: f64,
    pub pane_width: f64,
    pub time_axis_height: f64,
    pub panes: Vec<PaneLayout>,
}

impl ChartLayout {
    /// Origin and size of `surface`, `None` when it is not laid out.
    #[must_use]
    pub fn surface_rect(&self, surface: SurfaceId) -> Option<((f64, f64), MediaSize)> {
        match surface {
            SurfaceId::PaneMain(index) | SurfaceId::PaneTop(index) => {
                let pane = self.panes.get(index)?;
                Some((
                    (self.left_axis_width, pane.top),
                    MediaSize::new(self.pane_width, pane.height),
                ))
            }
            SurfaceId::PriceAxis { pane, side } => {
                let pane = self.panes.get(pane)?;
                let (x, width) = match side {
                    PriceAxisSide::Left => (0.0, self.left_axis_width),
                    PriceAxisSide::Right => {
                        (self.left_axis_width + self.pane_width, self.right_axis_width)
                    }
                };
                (width > 0.0).then_some(((x, pane.top), MediaSize::new(width, pane.height)))
            }
            SurfaceId::TimeAxis => (self.time_axis_height > 0.0).then_some((
                (self.left_axis_width, self.height - self.time_axis_height),
                MediaSize::new(self.pane_width, self.time_axis_height),
            )),
        }
    }

    /// Every surface with a non-empty rectangle, panes first.
    #[must_use]
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        let mut surfaces = Vec::with_capacity(self.panes.len() * 4 + 1);
        for pane in 0..self.panes.len() {
            surfaces.push(SurfaceId::PaneMain(pane));
            surfaces.push(SurfaceId::PaneTop(pane));
            for side in [PriceAxisSide::Left, PriceAxisSide::Right] {
                let surface = SurfaceId::PriceAxis { pane, side };
                if self.surface_rect(surface).is_some() {
                    surfaces.push(surface);
                }
            }
        }
        if self.surface_rect(SurfaceId::TimeAxis).is_some() {
            surfaces.push(SurfaceId::TimeAxis);
        }
        surfaces
    }

    /// Surface under a chart-level point and the point in that surface's
    /// local coordinates. Pane hits resolve to the top canvas, which receives
    /// input.
    #[must_use]
    pub fn hit_surface(&self, point: Point) -> Option<(SurfaceId, Point)> {
        self.surfaces()
            .into_iter()
            .filter(|surface| !matches!(surface, SurfaceId::PaneMain(_)))
            .find_map(|surface| {
                let ((x, y), size) = self.surface_rect(surface)?;
                let inside = point.x >= x
                    && point.x < x + size.width
                    && point.y >= y
                    && point.y < y + size.height;
                inside.then(|| (surface, Point::new(point.x - x, point.y - y)))
            })
    }
}

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn layout(&self) -> &ChartLayout {
        &self.core.presentation.layout
    }

    /// Explicit resize of the whole chart.
    pub fn resize(&mut self, width: u32, height: u32) -> ChartResult<()> {
        let viewport = Viewport::new(width, height);
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport { width, height });
        }
        self.apply_size(viewport)
    }

    /// Size observed on the host container; honoured only with `auto_size`.
    /// A zero size (hidden container) keeps the previous layout.
    pub fn on_container_resized(&mut self, width: u32, height: u32) -> ChartResult<bool> {
        if !self.core.options.auto_size {
            return Ok(false);
        }
        let viewport = Viewport::new(width, height);
        if !viewport.is_valid() || viewport == self.core.options.viewport {
            return Ok(false);
        }
        self.apply_size(viewport)?;
        Ok(true)
    }

    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.core.presentation.device_pixel_ratio
    }

    pub fn set_device_pixel_ratio(&mut self, device_pixel_ratio: f64) -> ChartResult<()> {
        if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "device pixel ratio must be finite and > 0".to_owned(),
            ));
        }
        self.core.presentation.device_pixel_ratio = device_pixel_ratio;
        self.core.options.device_pixel_ratio = device_pixel_ratio;
        for binding in self.core.presentation.bindings.values_mut() {
            binding.on_device_pixel_ratio(device_pixel_ratio);
        }
        self.core.model.full_update();
        Ok(())
    }

    /// Exact device-pixel box the host observed for one surface.
    pub fn on_device_pixel_content_box(
        &mut self,
        surface: SurfaceId,
        size: BitmapSize,
    ) -> ChartResult<()> {
        let binding = self
            .core
            .presentation
            .bindings
            .get_mut(&surface)
            .ok_or_else(|| ChartError::InvalidData(format!("unknown surface {surface:?}")))?;
        binding.on_device_pixel_content_box(size);
        self.core.model.full_update();
        Ok(())
    }

    #[must_use]
    pub fn canvas_binding(&self, surface: SurfaceId) -> Option<&CanvasBinding> {
        self.core.presentation.bindings.get(&surface)
    }

    pub fn canvas_binding_mut(&mut self, surface: SurfaceId) -> Option<&mut CanvasBinding> {
        self.core.presentation.bindings.get_mut(&surface)
    }

    fn apply_size(&mut self, viewport: Viewport) -> ChartResult<()> {
        debug!(
            width = viewport.width,
            height = viewport.height,
            "chart resized"
        );
        self.core.options.viewport = viewport;
        self.relayout()?;
        self.core.model.full_update();
        Ok(())
    }

    /// Recomputes pane heights, axis sizes and the time scale width, then
    /// moves every canvas binding to its new rectangle.
    pub(super) fn relayout(&mut self) -> ChartResult<()> {
        let width = f64::from(self.core.options.viewport.width);
        let height = f64::from(self.core.options.viewport.height);
        let font_size = self.core.options.layout.font_size;
        let time_axis_height = if self.core.options.time_scale.visible {
            font_size + TIME_AXIS_PADDING
        } else {
            0.0
        };

        let pane_area = (height - time_axis_height).max(0.0);
        let heights = distribute_pane_heights(&self.core.model.pane_stretch_factors(), pane_area);
        for (index, pane_height) in heights.iter().enumerate() {
            self.core.model.pane_mut(index)?.set_height(*pane_height);
        }
        self.core.model.recalculate_all_panes();

        let left_axis_width = self.price_axis_width(PriceAxisSide::Left)?;
        let right_axis_width = self.price_axis_width(PriceAxisSide::Right)?;
        let pane_width = (width - left_axis_width - right_axis_width).max(0.0);
        self.core.model.time_scale_mut().set_width(pane_width)?;
        self.core.model.recalculate_all_panes();

        let mut top = 0.0;
        let panes = heights
            .iter()
            .map(|pane_height| {
                let pane = PaneLayout {
                    top,
                    height: *pane_height,
                };
                top += pane_height;
                pane
            })
            .collect();
        let layout = ChartLayout {
            width,
            height,
            left_axis_width,
            right_axis_width,
            pane_width,
            time_axis_height,
            panes,
        };
        if layout != self.core.presentation.layout {
            debug!(
                pane_width,
                left_axis_width,
                right_axis_width,
                panes = layout.panes.len(),
                "layout changed"
            );
        }
        self.core.presentation.layout = layout;
        self.sync_canvas_bindings()
    }

    /// Commits pending bitmap size suggestions; done once per frame before
    /// drawing.
    pub(super) fn commit_bitmap_sizes(&mut self) {
        for binding in self.core.presentation.bindings.values_mut() {
            binding.apply_suggested_bitmap_size();
        }
    }

    fn sync_canvas_bindings(&mut self) -> ChartResult<()> {
        let presentation = &mut self.core.presentation;
        let surfaces = presentation.layout.surfaces();
        presentation.bindings.retain(|surface, binding| {
            let keep = surfaces.contains(surface);
            if !keep {
                binding.dispose();
            }
            keep
        });
        for surface in surfaces {
            let Some((origin, size)) = presentation.layout.surface_rect(surface) else {
                continue;
            };
            let ratio = presentation.device_pixel_ratio;
            presentation
                .bindings
                .entry(surface)
                .or_insert_with(|| CanvasBinding::new(surface, ratio))
                .set_media_size(size, origin)?;
        }
        Ok(())
    }

    /// Widest tick label over every pane's visible scale on `side`, plus
    /// border, tick and padding; zero when no pane shows that side.
    fn price_axis_width(&mut self, side: PriceAxisSide) -> ChartResult<f64> {
        let id = match side {
            PriceAxisSide::Left => PriceScaleId::left(),
            PriceAxisSide::Right => PriceScaleId::right(),
        };
        let font_size = self.core.options.layout.font_size;
        let text_cache = &mut self.core.presentation.text_cache;
        let mut visible = false;
        let mut minimum_width: f64 = 0.0;
        let mut max_label_width: f64 = 0.0;
        for pane_index in 0..self.core.model.panes().len() {
            let scale = self.core.model.price_scale_mut(pane_index, &id)?;
            let options = scale.options();
            if !options.visible {
                continue;
            }
            visible = true;
            minimum_width = minimum_width.max(options.minimum_width);
            let marks = scale.tick_marks(font_size);
            let width = if marks.is_empty() {
                let placeholder = scale.format_price(0.0);
                text_cache.measure(&placeholder, font_size)
            } else {
                text_cache.max_width(marks.iter().map(|mark| mark.label.as_str()), font_size)
            };
            max_label_width = max_label_width.max(width);
        }
        if !visible {
            return Ok(0.0);
        }
        let padding = price_axis_label_padding(font_size);
        let mut width = (PRICE_AXIS_BORDER
            + PRICE_AXIS_TICK_LENGTH
            + 2.0 * padding
            + max_label_width)
            .ceil();
        // Round up to an even width.
        width += width % 2.0;
        Ok(width.max(minimum_width))
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartLayout, PaneLayout};
    use crate::core::Point;
    use crate::render::{PriceAxisSide, SurfaceId};

    fn layout() -> ChartLayout {
        ChartLayout {
            width: 400.0,
            height: 328.0,
            left_axis_width: 0.0,
            right_axis_width: 60.0,
            pane_width: 340.0,
            time_axis_height: 28.0,
            panes: vec![
                PaneLayout {
                    top: 0.0,
                    height: 200.0,
                },
                PaneLayout {
                    top: 200.0,
                    height: 100.0,
                },
            ],
        }
    }

    #[test]
    fn surfaces_skip_empty_axes() {
        let surfaces = layout().surfaces();
        assert!(surfaces.contains(&SurfaceId::PriceAxis {
            pane: 1,
            side: PriceAxisSide::Right
        }));
        assert!(!surfaces.contains(&SurfaceId::PriceAxis {
            pane: 0,
            side: PriceAxisSide::Left
        }));
        assert_eq!(surfaces.last(), Some(&SurfaceId::TimeAxis));
    }

    #[test]
    fn hit_surface_returns_local_point() {
        let layout = layout();
        assert_eq!(
            layout.hit_surface(Point::new(100.0, 250.0)),
            Some((SurfaceId::PaneTop(1), Point::new(100.0, 50.0)))
        );
        assert_eq!(
            layout.hit_surface(Point::new(350.0, 10.0)),
            Some((
                SurfaceId::PriceAxis {
                    pane: 0,
                    side: PriceAxisSide::Right
                },
                Point::new(10.0, 10.0)
            ))
        );
        assert_eq!(
            layout.hit_surface(Point::new(20.0, 310.0)),
            Some((SurfaceId::TimeAxis, Point::new(20.0, 10.0)))
        );
    }
}
