use crate::model::{PriceTickMark, TimeAxisMark};
use crate::render::{
    CanvasLayerKind, LinePrimitive, PriceAxisSide, RectPrimitive, RenderFrame, Renderer,
    SurfaceId, TextHAlign, TextPrimitive, bitmap_line_width, crisp_position,
};

use super::ChartEngine;
use super::layout_coordinator::{
    PRICE_AXIS_BORDER, PRICE_AXIS_TICK_LENGTH, price_axis_label_padding,
};

const TIME_AXIS_TICK_LENGTH: f64 = 5.0;
const AXIS_LINE_ALPHA: f64 = 0.35;

impl<R: Renderer> ChartEngine<R> {
    /// Price labels of one pane's left or right scale.
    pub(super) fn price_axis_frame(
        &self,
        pane_index: usize,
        side: PriceAxisSide,
        marks: &[PriceTickMark],
    ) -> Option<RenderFrame> {
        let target = self
            .core
            .presentation
            .bindings
            .get(&SurfaceId::PriceAxis {
                pane: pane_index,
                side,
            })?
            .rendering_target()?;
        let layout = self.core.options.layout;
        let line_color = layout.text_color.with_alpha(AXIS_LINE_ALPHA);
        let media_width = target.media_size.width;
        let bitmap_width = f64::from(target.bitmap_size.width);
        let bitmap_height = f64::from(target.bitmap_size.height);
        let hr = target.horizontal_pixel_ratio;
        let vr = target.vertical_pixel_ratio;
        let mut frame = RenderFrame::new(target);

        frame.layer_mut(CanvasLayerKind::Background).push_rect(RectPrimitive::new(
            0.0,
            0.0,
            bitmap_width,
            bitmap_height,
            layout.background,
        ));

        let border_width = bitmap_line_width(PRICE_AXIS_BORDER, hr);
        // The border and ticks sit on the edge facing the pane.
        let (border_x, tick_from, tick_to) = match side {
            PriceAxisSide::Left => (
                media_width - PRICE_AXIS_BORDER,
                media_width - PRICE_AXIS_BORDER - PRICE_AXIS_TICK_LENGTH,
                media_width - PRICE_AXIS_BORDER,
            ),
            PriceAxisSide::Right => (
                0.0,
                PRICE_AXIS_BORDER,
                PRICE_AXIS_BORDER + PRICE_AXIS_TICK_LENGTH,
            ),
        };
        let grid = frame.layer_mut(CanvasLayerKind::Grid);
        let x = crisp_position(border_x, hr, border_width);
        grid.push_line(LinePrimitive::new(
            x,
            0.0,
            x,
            bitmap_height,
            border_width,
            line_color,
        ));
        let tick_width = bitmap_line_width(1.0, vr);
        for mark in marks {
            let y = crisp_position(mark.coordinate, vr, tick_width);
            grid.push_line(LinePrimitive::new(
                tick_from * hr,
                y,
                tick_to * hr,
                y,
                tick_width,
                line_color,
            ));
        }

        let padding = price_axis_label_padding(layout.font_size);
        let (label_x, align) = match side {
            PriceAxisSide::Left => (tick_from - padding, TextHAlign::Right),
            PriceAxisSide::Right => (tick_to + padding, TextHAlign::Left),
        };
        let labels = frame.layer_mut(CanvasLayerKind::Overlay);
        for mark in marks.iter().filter(|mark| !mark.label.is_empty()) {
            labels.push_text(TextPrimitive::new(
                mark.label.clone(),
                label_x,
                mark.coordinate,
                layout.font_size,
                layout.text_color,
                align,
            ));
        }
        Some(frame)
    }

    /// Time labels under the panes.
    pub(super) fn time_axis_frame(&self, marks: &[TimeAxisMark]) -> Option<RenderFrame> {
        let target = self
            .core
            .presentation
            .bindings
            .get(&SurfaceId::TimeAxis)?
            .rendering_target()?;
        let layout = self.core.options.layout;
        let line_color = layout.text_color.with_alpha(AXIS_LINE_ALPHA);
        let bitmap_width = f64::from(target.bitmap_size.width);
        let bitmap_height = f64::from(target.bitmap_size.height);
        let hr = target.horizontal_pixel_ratio;
        let vr = target.vertical_pixel_ratio;
        let label_y = TIME_AXIS_TICK_LENGTH + (target.media_size.height - TIME_AXIS_TICK_LENGTH) / 2.0;
        let mut frame = RenderFrame::new(target);

        frame.layer_mut(CanvasLayerKind::Background).push_rect(RectPrimitive::new(
            0.0,
            0.0,
            bitmap_width,
            bitmap_height,
            layout.background,
        ));

        let grid = frame.layer_mut(CanvasLayerKind::Grid);
        let border_width = bitmap_line_width(1.0, vr);
        let y = crisp_position(0.0, vr, border_width);
        grid.push_line(LinePrimitive::new(
            0.0,
            y,
            bitmap_width,
            y,
            border_width,
            line_color,
        ));
        let tick_width = bitmap_line_width(1.0, hr);
        for mark in marks {
            let x = crisp_position(mark.coordinate, hr, tick_width);
            grid.push_line(LinePrimitive::new(
                x,
                0.0,
                x,
                TIME_AXIS_TICK_LENGTH * vr,
                tick_width,
                line_color,
            ));
        }

        let labels = frame.layer_mut(CanvasLayerKind::Overlay);
        for mark in marks.iter().filter(|mark| !mark.label.is_empty()) {
            labels.push_text(TextPrimitive::new(
                mark.label.clone(),
                mark.coordinate,
                label_y,
                layout.font_size,
                layout.text_color,
                TextHAlign::Center,
            ));
        }
        Some(frame)
    }
}
