//! Primitive emitters for each `SeriesKind`.
//!
//! Painters receive already-visible rows plus media-space mappings and write
//! bitmap-space shapes into the series layer. They hold no state.

use crate::core::{ProjectedPoint, SeriesOptions, SeriesPoint, TimePointIndex, project_rows};
use crate::render::{
    Color, LayerPrimitives, LinePrimitive, PolygonPrimitive, RectPrimitive, bitmap_line_width,
    crisp_position,
};

const AREA_FILL_ALPHA: f64 = 0.28;

/// Inputs shared by every series painter.
pub struct SeriesPaintContext<'a> {
    pub rows: &'a [SeriesPoint],
    pub options: &'a SeriesOptions,
    /// Media pixels per logical bar.
    pub bar_spacing: f64,
    pub x_of: &'a (dyn Fn(TimePointIndex) -> f64 + Sync),
    pub y_of: &'a (dyn Fn(f64) -> f64 + Sync),
    /// Media-space pane height, the floor of area fills.
    pub pane_height: f64,
    pub horizontal_pixel_ratio: f64,
    pub vertical_pixel_ratio: f64,
}

impl std::fmt::Debug for SeriesPaintContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesPaintContext")
            .field("rows", &self.rows.len())
            .field("bar_spacing", &self.bar_spacing)
            .field("pane_height", &self.pane_height)
            .finish_non_exhaustive()
    }
}

impl SeriesPaintContext<'_> {
    fn project(&self) -> Vec<ProjectedPoint> {
        project_rows(self.rows, self.x_of, self.y_of)
    }

    fn bx(&self, x: f64) -> f64 {
        x * self.horizontal_pixel_ratio
    }

    fn by(&self, y: f64) -> f64 {
        y * self.vertical_pixel_ratio
    }

    fn stroke_width(&self) -> f64 {
        bitmap_line_width(self.options.line_width, self.horizontal_pixel_ratio)
    }

    fn direction_color(&self, point: &ProjectedPoint) -> Color {
        // Screen y grows downwards, so a smaller close coordinate is a rise.
        if point.close <= point.open {
            self.options.up_color
        } else {
            self.options.down_color
        }
    }
}

/// Candle body width in device pixels for a bar spacing in media pixels.
#[must_use]
pub fn optimal_candlestick_width(bar_spacing: f64, pixel_ratio: f64) -> f64 {
    const SPECIAL_CASE_FROM: f64 = 2.5;
    const SPECIAL_CASE_TO: f64 = 4.0;
    const SPECIAL_CASE_COEFF: f64 = 3.0;
    const REDUCING_COEFF: f64 = 0.2;

    if (SPECIAL_CASE_FROM..=SPECIAL_CASE_TO).contains(&bar_spacing) {
        return (SPECIAL_CASE_COEFF * pixel_ratio).floor();
    }
    let coeff = 1.0
        - REDUCING_COEFF * (bar_spacing.max(4.0) - 4.0).atan() / std::f64::consts::FRAC_PI_2;
    let reduced = (bar_spacing * coeff * pixel_ratio).floor();
    let scaled = (bar_spacing * pixel_ratio).floor();
    reduced.min(scaled).max(pixel_ratio.floor())
}

pub fn paint_candlesticks(ctx: &SeriesPaintContext<'_>, out: &mut LayerPrimitives) {
    let body_width = optimal_candlestick_width(ctx.bar_spacing, ctx.horizontal_pixel_ratio);
    let wick_width = bitmap_line_width(1.0, ctx.horizontal_pixel_ratio);
    for point in ctx.project() {
        let base = ctx.direction_color(&point);
        let body = point.colors.color.unwrap_or(base);
        let wick = point.colors.wick_color.unwrap_or(body);
        let center = crisp_position(point.x, ctx.horizontal_pixel_ratio, wick_width);
        out.push_line(LinePrimitive::new(
            center,
            ctx.by(point.high),
            center,
            ctx.by(point.low),
            wick_width,
            wick,
        ));

        let top = ctx.by(point.open.min(point.close));
        let bottom = ctx.by(point.open.max(point.close));
        let left = (ctx.bx(point.x) - body_width / 2.0).round();
        let mut rect = RectPrimitive::new(left, top, body_width, (bottom - top).max(1.0), body);
        if let Some(border) = point.colors.border_color {
            rect = rect.with_border(border);
        }
        out.push_rect(rect);
    }
}

pub fn paint_bars(ctx: &SeriesPaintContext<'_>, out: &mut LayerPrimitives) {
    let stroke = ctx.stroke_width().min(optimal_candlestick_width(
        ctx.bar_spacing,
        ctx.horizontal_pixel_ratio,
    ));
    let tick = (ctx.bar_spacing * ctx.horizontal_pixel_ratio / 2.0).floor().max(stroke);
    for point in ctx.project() {
        let color = point.colors.color.unwrap_or_else(|| ctx.direction_color(&point));
        let center = crisp_position(point.x, ctx.horizontal_pixel_ratio, stroke);
        out.push_line(LinePrimitive::new(
            center,
            ctx.by(point.high),
            center,
            ctx.by(point.low),
            stroke,
            color,
        ));
        let open_y = ctx.by(point.open);
        let close_y = ctx.by(point.close);
        out.push_line(LinePrimitive::new(center - tick, open_y, center, open_y, stroke, color));
        out.push_line(LinePrimitive::new(center, close_y, center + tick, close_y, stroke, color));
    }
}

fn paint_polyline(
    ctx: &SeriesPaintContext<'_>,
    points: &[ProjectedPoint],
    out: &mut LayerPrimitives,
    color_of: impl Fn(&ProjectedPoint, &ProjectedPoint) -> Color,
) {
    let stroke = ctx.stroke_width();
    for pair in points.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        out.push_line(LinePrimitive::new(
            ctx.bx(from.x),
            ctx.by(from.close),
            ctx.bx(to.x),
            ctx.by(to.close),
            stroke,
            color_of(from, to),
        ));
    }
}

pub fn paint_line(ctx: &SeriesPaintContext<'_>, out: &mut LayerPrimitives) {
    let points = ctx.project();
    paint_polyline(ctx, &points, out, |_, to| {
        to.colors.color.unwrap_or(ctx.options.color)
    });
}

pub fn paint_area(ctx: &SeriesPaintContext<'_>, out: &mut LayerPrimitives) {
    let points = ctx.project();
    if points.len() >= 2 {
        let floor = ctx.by(ctx.pane_height);
        let mut outline: Vec<(f64, f64)> = points
            .iter()
            .map(|point| (ctx.bx(point.x), ctx.by(point.close)))
            .collect();
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            outline.push((ctx.bx(last.x), floor));
            outline.push((ctx.bx(first.x), floor));
        }
        out.push_polygon(PolygonPrimitive {
            points: outline,
            fill: ctx.options.color.with_alpha(AREA_FILL_ALPHA),
        });
    }
    paint_polyline(ctx, &points, out, |_, _| ctx.options.color);
}

pub fn paint_baseline(ctx: &SeriesPaintContext<'_>, out: &mut LayerPrimitives) {
    let points = ctx.project();
    let base = (ctx.y_of)(ctx.options.base_value);
    let side_color = |from: &ProjectedPoint, to: &ProjectedPoint| {
        if (from.close + to.close) / 2.0 <= base {
            ctx.options.up_color
        } else {
            ctx.options.down_color
        }
    };
    let base_bitmap = ctx.by(base);
    for pair in points.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        out.push_polygon(PolygonPrimitive {
            points: vec![
                (ctx.bx(from.x), ctx.by(from.close)),
                (ctx.bx(to.x), ctx.by(to.close)),
                (ctx.bx(to.x), base_bitmap),
                (ctx.bx(from.x), base_bitmap),
            ],
            fill: side_color(from, to).with_alpha(AREA_FILL_ALPHA),
        });
    }
    paint_polyline(ctx, &points, out, side_color);
}

pub fn paint_histogram(ctx: &SeriesPaintContext<'_>, out: &mut LayerPrimitives) {
    let base = ctx.by((ctx.y_of)(ctx.options.base_value));
    let width = (ctx.bar_spacing * ctx.horizontal_pixel_ratio * 0.8)
        .floor()
        .max(1.0);
    for point in ctx.project() {
        let color = point.colors.color.unwrap_or(ctx.options.color);
        let value = ctx.by(point.close);
        let left = (ctx.bx(point.x) - width / 2.0).round();
        out.push_rect(RectPrimitive::new(
            left,
            value.min(base),
            width,
            (value - base).abs(),
            color,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::{SeriesPaintContext, optimal_candlestick_width, paint_area, paint_candlesticks};
    use crate::core::{PointColors, SeriesOptions, SeriesPoint, TimePoint};
    use crate::render::{CanvasLayerKind, Color, LayerPrimitives};

    fn rows() -> Vec<SeriesPoint> {
        (0..3)
            .map(|index| SeriesPoint {
                index,
                time: TimePoint::from_timestamp(index * 86_400),
                values: [10.0, 12.0, 9.0, 11.0 - index as f64],
                colors: PointColors::default(),
            })
            .collect()
    }

    fn paint(
        rows: &[SeriesPoint],
        painter: fn(&SeriesPaintContext<'_>, &mut LayerPrimitives),
    ) -> LayerPrimitives {
        let options = SeriesOptions::default();
        let x_of = |index: i64| index as f64 * 10.0 + 5.0;
        let y_of = |price: f64| 100.0 - price * 5.0;
        let ctx = SeriesPaintContext {
            rows,
            options: &options,
            bar_spacing: 10.0,
            x_of: &x_of,
            y_of: &y_of,
            pane_height: 100.0,
            horizontal_pixel_ratio: 2.0,
            vertical_pixel_ratio: 2.0,
        };
        let mut out = LayerPrimitives::new(CanvasLayerKind::Series);
        painter(&ctx, &mut out);
        out
    }

    #[test]
    fn candle_width_follows_bar_spacing() {
        assert!((optimal_candlestick_width(3.0, 1.0) - 3.0).abs() <= f64::EPSILON);
        assert!((optimal_candlestick_width(1.0, 2.0) - 2.0).abs() <= f64::EPSILON);
        let wide = optimal_candlestick_width(20.0, 1.0);
        assert!(wide < 20.0 && wide >= 15.0);
    }

    #[test]
    fn candles_emit_wick_and_body_with_direction_colors() {
        let out = paint(&rows(), paint_candlesticks);
        assert_eq!(out.lines.len(), 3);
        assert_eq!(out.rects.len(), 3);
        let options = SeriesOptions::default();
        assert_eq!(out.rects[0].fill, options.up_color);
        assert_eq!(out.rects[2].fill, options.down_color);
        for rect in &out.rects {
            assert!(rect.validate().is_ok());
        }
    }

    #[test]
    fn point_color_override_wins() {
        let mut rows = rows();
        rows[1].colors.color = Some(Color::rgb(1.0, 1.0, 0.0));
        let out = paint(&rows, paint_candlesticks);
        assert_eq!(out.rects[1].fill, Color::rgb(1.0, 1.0, 0.0));
    }

    #[test]
    fn area_closes_polygon_at_pane_floor() {
        let out = paint(&rows(), paint_area);
        assert_eq!(out.polygons.len(), 1);
        let polygon = &out.polygons[0];
        assert_eq!(polygon.points.len(), 5);
        assert!((polygon.points[3].1 - 200.0).abs() <= f64::EPSILON);
        assert_eq!(out.lines.len(), 2);
    }
}
