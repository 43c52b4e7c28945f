use crate::core::{SeriesId, Time};
use crate::error::{ChartError, ChartResult};
use crate::model::{PriceScale, PriceScaleId};
use crate::render::Renderer;

use super::ChartEngine;

/// Coordinate queries. Each returns `None` while the scale it needs is empty;
/// arguments that can never be mapped are errors.
impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn logical_to_coordinate(&self, logical: f64) -> Option<f64> {
        let time_scale = self.core.model.time_scale();
        (!time_scale.is_empty() && logical.is_finite())
            .then(|| time_scale.logical_to_coordinate(logical))
    }

    #[must_use]
    pub fn coordinate_to_logical(&self, x: f64) -> Option<f64> {
        let time_scale = self.core.model.time_scale();
        (!time_scale.is_empty() && x.is_finite()).then(|| time_scale.coordinate_to_logical(x))
    }

    /// X of the bar at exactly `time`; `None` when no bar has that time.
    pub fn time_to_coordinate(&self, time: &Time) -> ChartResult<Option<f64>> {
        let point = time.to_time_point()?;
        let time_scale = self.core.model.time_scale();
        if time_scale.is_empty() {
            return Ok(None);
        }
        Ok(self
            .core
            .model
            .time_index()
            .index_of_time(&point, false)
            .map(|index| time_scale.index_to_coordinate(index)))
    }

    /// Time of the bar nearest to `x`; `None` outside the data.
    #[must_use]
    pub fn coordinate_to_time(&self, x: f64) -> Option<Time> {
        let time_scale = self.core.model.time_scale();
        if time_scale.is_empty() || !x.is_finite() {
            return None;
        }
        let index = time_scale.coordinate_to_index(x);
        self.core
            .model
            .time_index()
            .bar(index)
            .map(|bar| bar.original_time.clone())
    }

    /// Y of `price` on the scale `series` is attached to.
    pub fn price_to_coordinate(&self, series: SeriesId, price: f64) -> ChartResult<Option<f64>> {
        if !price.is_finite() {
            return Err(ChartError::InvalidData("price must be finite".to_owned()));
        }
        let Some(scale) = self.series_price_scale(series)? else {
            return Ok(None);
        };
        Ok(mapping_base(scale).map(|base| scale.price_to_coordinate(price, base)))
    }

    /// Price at `y` on the scale `series` is attached to.
    pub fn coordinate_to_price(&self, series: SeriesId, y: f64) -> ChartResult<Option<f64>> {
        if !y.is_finite() {
            return Err(ChartError::InvalidData(
                "coordinate must be finite".to_owned(),
            ));
        }
        let Some(scale) = self.series_price_scale(series)? else {
            return Ok(None);
        };
        Ok(mapping_base(scale).map(|base| scale.coordinate_to_price(y, base)))
    }

    fn series_price_scale(&self, series: SeriesId) -> ChartResult<Option<&PriceScale>> {
        let options = self
            .core
            .model
            .series(series)
            .ok_or(ChartError::UnknownSeries(series))?
            .options();
        let id = PriceScaleId::new(options.price_scale_id.clone());
        Ok(self.core.model.price_scale(options.pane_index, &id))
    }
}

fn mapping_base(scale: &PriceScale) -> Option<f64> {
    if scale.is_empty() {
        return None;
    }
    scale.mapping_base()
}
