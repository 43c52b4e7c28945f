use crate::core::SeriesPoint;
use crate::extensions::PrimitiveDrawContext;
use crate::interaction::CrosshairMode;
use crate::model::{PriceScaleId, StrictRange};
use crate::render::{
    CanvasLayerKind, LinePrimitive, MediaSize, PriceAxisSide, RectPrimitive, RenderFrame, Renderer,
    RenderingTarget, SeriesPaintContext, SurfaceId, bitmap_line_width, crisp_position,
};

use super::{ChartEngine, render_coordinator::SceneInputs};

/// Rows whose logical index lies in `[from, to]`.
fn rows_in_range(rows: &[SeriesPoint], from: i64, to: i64) -> &[SeriesPoint] {
    let start = rows.partition_point(|row| row.index < from);
    let end = rows.partition_point(|row| row.index <= to);
    &rows[start..end.max(start)]
}

impl<R: Renderer> ChartEngine<R> {
    /// Background, grid, series and primitives of one pane.
    pub(super) fn pane_main_frame(
        &self,
        pane_index: usize,
        inputs: &SceneInputs,
    ) -> Option<RenderFrame> {
        let target = self
            .core
            .presentation
            .bindings
            .get(&SurfaceId::PaneMain(pane_index))?
            .rendering_target()?;
        let pane = self.core.model.pane(pane_index)?;
        let options = &self.core.options;
        let mut frame = RenderFrame::new(target);
        let bitmap_width = f64::from(target.bitmap_size.width);
        let bitmap_height = f64::from(target.bitmap_size.height);

        frame.layer_mut(CanvasLayerKind::Background).push_rect(RectPrimitive::new(
            0.0,
            0.0,
            bitmap_width,
            bitmap_height,
            options.layout.background,
        ));

        let grid = frame.layer_mut(CanvasLayerKind::Grid);
        if options.grid.vert_lines.visible {
            let width = bitmap_line_width(1.0, target.horizontal_pixel_ratio);
            for mark in &inputs.time_marks {
                let x = crisp_position(mark.coordinate, target.horizontal_pixel_ratio, width);
                grid.push_line(LinePrimitive::new(
                    x,
                    0.0,
                    x,
                    bitmap_height,
                    width,
                    options.grid.vert_lines.color,
                ));
            }
        }
        if options.grid.horz_lines.visible {
            let width = bitmap_line_width(1.0, target.vertical_pixel_ratio);
            let side = match pane.default_price_scale_id().as_str() {
                PriceScaleId::LEFT => PriceAxisSide::Left,
                _ => PriceAxisSide::Right,
            };
            for mark in inputs.price_marks(pane_index, side) {
                let y = crisp_position(mark.coordinate, target.vertical_pixel_ratio, width);
                grid.push_line(LinePrimitive::new(
                    0.0,
                    y,
                    bitmap_width,
                    y,
                    width,
                    options.grid.horz_lines.color,
                ));
            }
        }

        if let Some(visible) = inputs.visible {
            self.paint_pane_series(pane_index, visible, &target, &mut frame);
        }

        if let Some(context) = self.primitive_context(pane_index, &target) {
            let overlay = frame.layer_mut(CanvasLayerKind::Overlay);
            for primitive in pane.primitives() {
                primitive.draw(&context, overlay);
            }
        }
        Some(frame)
    }

    fn paint_pane_series(
        &self,
        pane_index: usize,
        visible: StrictRange,
        target: &RenderingTarget,
        frame: &mut RenderFrame,
    ) {
        let model = &self.core.model;
        let Some(pane) = model.pane(pane_index) else {
            return;
        };
        let time_scale = model.time_scale();
        let x_of = |index| time_scale.index_to_coordinate(index);
        for id in pane.series() {
            let Some(series) = model.series(*id) else {
                continue;
            };
            if !series.options().visible {
                continue;
            }
            let Some(rows) = model.time_index().series_rows(*id) else {
                continue;
            };
            let scale_id = PriceScaleId::new(series.options().price_scale_id.clone());
            let Some(scale) = pane.price_scale(&scale_id) else {
                continue;
            };
            let Some(base) = scale.mapping_base().filter(|_| !scale.is_empty()) else {
                continue;
            };
            // One extra bar on each side so lines run off the pane edges.
            let rows = rows_in_range(rows.rows(), visible.left() - 1, visible.right() + 1);
            if rows.is_empty() {
                continue;
            }
            let y_of = |price| scale.price_to_coordinate(price, base);
            let context = SeriesPaintContext {
                rows,
                options: series.options(),
                bar_spacing: time_scale.bar_spacing(),
                x_of: &x_of,
                y_of: &y_of,
                pane_height: target.media_size.height,
                horizontal_pixel_ratio: target.horizontal_pixel_ratio,
                vertical_pixel_ratio: target.vertical_pixel_ratio,
            };
            (series.behavior().paint)(&context, frame.layer_mut(CanvasLayerKind::Series));
        }
    }

    /// Crosshair lines and top-canvas primitive content of one pane.
    pub(super) fn pane_top_frame(&self, pane_index: usize) -> Option<RenderFrame> {
        let target = self
            .core
            .presentation
            .bindings
            .get(&SurfaceId::PaneTop(pane_index))?
            .rendering_target()?;
        let pane = self.core.model.pane(pane_index)?;
        let mut frame = RenderFrame::new(target);
        let crosshair = self.core.runtime.pointer.crosshair;
        let options = self.core.options.crosshair;
        let layer = frame.layer_mut(CanvasLayerKind::Crosshair);

        if crosshair.visible && options.mode != CrosshairMode::Hidden {
            let bitmap_width = f64::from(target.bitmap_size.width);
            let bitmap_height = f64::from(target.bitmap_size.height);
            if options.vert_line.visible {
                let width =
                    bitmap_line_width(options.vert_line.width, target.horizontal_pixel_ratio);
                let x = crisp_position(crosshair.x, target.horizontal_pixel_ratio, width);
                layer.push_line(LinePrimitive::new(
                    x,
                    0.0,
                    x,
                    bitmap_height,
                    width,
                    options.vert_line.color,
                ));
            }
            if options.horz_line.visible && crosshair.pane_index == pane_index {
                let width = bitmap_line_width(options.horz_line.width, target.vertical_pixel_ratio);
                let y = crisp_position(crosshair.y, target.vertical_pixel_ratio, width);
                layer.push_line(LinePrimitive::new(
                    0.0,
                    y,
                    bitmap_width,
                    y,
                    width,
                    options.horz_line.color,
                ));
            }
        }

        if let Some(context) = self.primitive_context(pane_index, &target) {
            for primitive in pane.primitives() {
                primitive.draw_top(&context, layer);
            }
        }
        Some(frame)
    }

    /// Draw context on the pane's default scale; `None` while that scale
    /// cannot map prices.
    pub(super) fn primitive_context(
        &self,
        pane_index: usize,
        target: &RenderingTarget,
    ) -> Option<PrimitiveDrawContext<'_>> {
        self.primitive_context_for(
            pane_index,
            target.media_size,
            target.horizontal_pixel_ratio,
            target.vertical_pixel_ratio,
        )
    }

    pub(super) fn primitive_context_for(
        &self,
        pane_index: usize,
        media_size: MediaSize,
        horizontal_pixel_ratio: f64,
        vertical_pixel_ratio: f64,
    ) -> Option<PrimitiveDrawContext<'_>> {
        let pane = self.core.model.pane(pane_index)?;
        let price_scale = pane.default_price_scale()?;
        Some(PrimitiveDrawContext {
            pane_index,
            media_size,
            horizontal_pixel_ratio,
            vertical_pixel_ratio,
            time_scale: self.core.model.time_scale(),
            price_scale,
            base_value: price_scale.mapping_base()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::rows_in_range;
    use crate::core::{PointColors, SeriesPoint, TimePoint};

    fn row(index: i64) -> SeriesPoint {
        SeriesPoint {
            index,
            time: TimePoint::from_timestamp(index * 60),
            values: [1.0; 4],
            colors: PointColors::default(),
        }
    }

    #[test]
    fn rows_in_range_is_inclusive_and_handles_gaps() {
        let rows: Vec<SeriesPoint> = [0, 2, 3, 7, 9].into_iter().map(row).collect();
        let indices: Vec<i64> = rows_in_range(&rows, 2, 7).iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![2, 3, 7]);
        assert!(rows_in_range(&rows, 4, 6).is_empty());
        assert_eq!(rows_in_range(&rows, -5, 100).len(), 5);
    }
}
