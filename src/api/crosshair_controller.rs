use indexmap::IndexMap;
use tracing::trace;

use crate::core::{MismatchDirection, Point, SeriesId, SeriesPoint, TimePointIndex};
use crate::extensions::PluginEvent;
use crate::interaction::{CrosshairMode, CrosshairState};
use crate::model::{PriceScale, PriceScaleId};
use crate::render::{Renderer, SurfaceId};

use super::{ChartEngine, MouseEventParams, SeriesDataValue};

/// Pointer distance within which a series counts as hovered.
const HOVER_DISTANCE_PX: f64 = 4.0;

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn crosshair_mode(&self) -> CrosshairMode {
        self.core.options.crosshair.mode
    }

    pub fn set_crosshair_mode(&mut self, mode: CrosshairMode) {
        self.core.options.crosshair.mode = mode;
        if mode == CrosshairMode::Hidden {
            self.hide_crosshair();
        } else {
            self.refresh_crosshair();
        }
        self.core.model.cursor_update();
    }

    /// Moves the crosshair as if the pointer hovered `point` in `pane_index`.
    pub fn set_crosshair_position(&mut self, pane_index: usize, point: Point) {
        self.update_crosshair(pane_index, point);
    }

    pub fn clear_crosshair(&mut self) {
        self.hide_crosshair();
    }

    /// Tracks the pointer and notifies crosshair subscribers.
    pub(super) fn update_crosshair(&mut self, pane_index: usize, point: Point) {
        if self.core.options.crosshair.mode == CrosshairMode::Hidden
            || self.core.model.pane(pane_index).is_none()
        {
            self.hide_crosshair();
            return;
        }
        self.core.runtime.pointer.hover = Some((pane_index, point));
        let state = self.compute_crosshair(pane_index, point);
        self.core.runtime.pointer.crosshair = state;
        self.core.model.cursor_update();
        trace!(pane = pane_index, x = state.x, y = state.y, "crosshair moved");
        self.emit_plugin_event(PluginEvent::CrosshairMoved {
            x: state.x,
            y: state.y,
        });
        if self.core.runtime.subscriptions.has_crosshair_move() {
            let params = self.mouse_event_params(pane_index, point);
            self.notify_crosshair_move(&params);
        }
    }

    pub(super) fn hide_crosshair(&mut self) {
        self.core.runtime.pointer.hover = None;
        if !self.core.runtime.pointer.crosshair.visible {
            return;
        }
        self.core.runtime.pointer.crosshair.hide();
        self.core.model.cursor_update();
        self.emit_plugin_event(PluginEvent::CrosshairHidden);
        if self.core.runtime.subscriptions.has_crosshair_move() {
            self.notify_crosshair_move(&MouseEventParams::default());
        }
    }

    /// Re-resolves the crosshair after scales moved under a still pointer.
    pub(super) fn refresh_crosshair(&mut self) {
        let Some((pane_index, point)) = self.core.runtime.pointer.hover else {
            return;
        };
        if self.core.model.pane(pane_index).is_none()
            || self.core.options.crosshair.mode == CrosshairMode::Hidden
        {
            self.core.runtime.pointer.hover = None;
            self.core.runtime.pointer.crosshair.hide();
            return;
        }
        self.core.runtime.pointer.crosshair = self.compute_crosshair(pane_index, point);
    }

    fn compute_crosshair(&self, pane_index: usize, point: Point) -> CrosshairState {
        let model = &self.core.model;
        let time_scale = model.time_scale();
        let index = (!time_scale.is_empty()).then(|| time_scale.coordinate_to_index(point.x));
        let x = index.map_or(point.x, |index| time_scale.index_to_coordinate(index));
        let mut y = point.y;
        let mut price = model
            .pane(pane_index)
            .and_then(|pane| pane.default_price_scale())
            .and_then(|scale| {
                mapping_base(scale).map(|base| scale.coordinate_to_price(point.y, base))
            });

        if self.core.options.crosshair.mode == CrosshairMode::Magnet
            && let Some(index) = index
            && let Some((close, close_y)) = self.magnet_target(pane_index, index)
        {
            y = close_y;
            price = Some(close);
        }

        CrosshairState {
            visible: true,
            pane_index,
            x,
            y,
            index,
            price,
        }
    }

    /// Close and its y of the first visible series in the pane with a bar at
    /// `index`.
    fn magnet_target(&self, pane_index: usize, index: TimePointIndex) -> Option<(f64, f64)> {
        let model = &self.core.model;
        let pane = model.pane(pane_index)?;
        pane.series().iter().find_map(|id| {
            let series = model.series(*id)?;
            if !series.options().visible {
                return None;
            }
            let row = model.data_by_index(*id, index, MismatchDirection::None)?;
            let scale = self.series_scale(*id)?;
            let base = mapping_base(scale)?;
            Some((row.close(), scale.price_to_coordinate(row.close(), base)))
        })
    }

    fn series_scale(&self, id: SeriesId) -> Option<&PriceScale> {
        let options = self.core.model.series(id)?.options();
        self.core.model.price_scale(
            options.pane_index,
            &PriceScaleId::new(options.price_scale_id.clone()),
        )
    }

    /// Subscriber payload for a pointer at `point` in `pane_index`.
    pub(super) fn mouse_event_params(&self, pane_index: usize, point: Point) -> MouseEventParams {
        let model = &self.core.model;
        let time_scale = model.time_scale();
        let mut params = MouseEventParams {
            point: Some(point),
            pane_index: Some(pane_index),
            ..MouseEventParams::default()
        };
        if time_scale.is_empty() {
            return params;
        }
        let index = time_scale.coordinate_to_index(point.x);
        params.logical = Some(time_scale.coordinate_to_logical(point.x));
        params.time = model.time_index().bar(index).map(|bar| bar.original_time.clone());

        let mut series_data = IndexMap::new();
        for series in model.series_iter() {
            let Some(row) = model.data_by_index(series.id(), index, MismatchDirection::None) else {
                continue;
            };
            let value = if series.kind().is_ohlc() {
                SeriesDataValue::Ohlc {
                    open: row.open(),
                    high: row.high(),
                    low: row.low(),
                    close: row.close(),
                }
            } else {
                SeriesDataValue::Value(row.close())
            };
            series_data.insert(series.id(), value);
        }
        params.series_data = series_data;
        params.hovered_series = self.hovered_series(pane_index, index, point.y);
        params.hovered_object_id = self.hovered_object(pane_index, point);
        params
    }

    fn hovered_series(&self, pane_index: usize, index: TimePointIndex, y: f64) -> Option<SeriesId> {
        let model = &self.core.model;
        let pane = model.pane(pane_index)?;
        let mut best: Option<(SeriesId, f64)> = None;
        for id in pane.series() {
            let Some(series) = model.series(*id) else {
                continue;
            };
            if !series.options().visible {
                continue;
            }
            let Some(row) = model.data_by_index(*id, index, MismatchDirection::None) else {
                continue;
            };
            let Some(scale) = self.series_scale(*id) else {
                continue;
            };
            let Some(base) = mapping_base(scale) else {
                continue;
            };
            let distance = row_distance(row, series.kind().is_ohlc(), y, |price| {
                scale.price_to_coordinate(price, base)
            });
            if distance <= HOVER_DISTANCE_PX && best.is_none_or(|(_, nearest)| distance < nearest) {
                best = Some((*id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    fn hovered_object(&self, pane_index: usize, point: Point) -> Option<String> {
        let ((_, _), media_size) = self
            .core
            .presentation
            .layout
            .surface_rect(SurfaceId::PaneMain(pane_index))?;
        let ratio = self.core.presentation.device_pixel_ratio;
        let context = self.primitive_context_for(pane_index, media_size, ratio, ratio)?;
        self.core
            .model
            .pane(pane_index)?
            .primitives()
            .iter()
            .find_map(|primitive| primitive.hit_test(point.x, point.y, &context))
    }
}

fn mapping_base(scale: &PriceScale) -> Option<f64> {
    if scale.is_empty() {
        return None;
    }
    scale.mapping_base()
}

/// Vertical pointer distance to a row: zero inside a bar's high-low span.
fn row_distance(row: &SeriesPoint, ohlc: bool, y: f64, y_of: impl Fn(f64) -> f64) -> f64 {
    if !ohlc {
        return (y - y_of(row.close())).abs();
    }
    let high = y_of(row.high());
    let low = y_of(row.low());
    let (top, bottom) = if high <= low { (high, low) } else { (low, high) };
    if (top..=bottom).contains(&y) {
        0.0
    } else {
        (y - top).abs().min((y - bottom).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::row_distance;
    use crate::core::{PointColors, SeriesPoint, TimePoint};

    fn bar(open: f64, high: f64, low: f64, close: f64) -> SeriesPoint {
        SeriesPoint {
            index: 0,
            time: TimePoint::from_timestamp(0),
            values: [open, high, low, close],
            colors: PointColors::default(),
        }
    }

    #[test]
    fn ohlc_distance_is_zero_inside_the_wick() {
        // Price 100 maps to y 0, price 0 to y 100.
        let y_of = |price: f64| 100.0 - price;
        let row = bar(50.0, 60.0, 40.0, 55.0);
        assert_eq!(row_distance(&row, true, 50.0, y_of), 0.0);
        assert!((row_distance(&row, true, 35.0, y_of) - 5.0).abs() <= 1e-9);
        assert!((row_distance(&row, true, 63.0, y_of) - 3.0).abs() <= 1e-9);
    }

    #[test]
    fn value_distance_uses_close() {
        let y_of = |price: f64| 100.0 - price;
        let row = bar(55.0, 55.0, 55.0, 55.0);
        assert!((row_distance(&row, false, 47.0, y_of) - 2.0).abs() <= 1e-9);
    }
}
