use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::plot_list::{PlotList, PlotValue, PointColors, SeriesPoint};
use crate::core::primitives::decimal_to_f64;
use crate::core::{MismatchDirection, SeriesId, Time, TimePointIndex};
use crate::error::{ChartError, ChartResult};
use crate::model::{AutoScaleInfo, PriceRange, StrictRange};
use crate::render::{Color, LayerPrimitives, SeriesPaintContext, series_painters};

/// Series presentation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    Candlestick,
    Bar,
    Line,
    Area,
    Baseline,
    Histogram,
}

/// Data-transform and draw functions for one `SeriesKind`.
pub struct SeriesKindBehavior {
    pub kind: SeriesKind,
    pub convert: fn(&SeriesDataItem) -> ChartResult<Option<[f64; 4]>>,
    /// Values that drive autoscale and hover hit-testing.
    pub autoscale_values: &'static [PlotValue],
    pub paint: fn(&SeriesPaintContext<'_>, &mut LayerPrimitives),
}

impl std::fmt::Debug for SeriesKindBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesKindBehavior")
            .field("kind", &self.kind)
            .field("autoscale_values", &self.autoscale_values)
            .finish_non_exhaustive()
    }
}

const OHLC_VALUES: &[PlotValue] = &[PlotValue::High, PlotValue::Low];
const CLOSE_VALUE: &[PlotValue] = &[PlotValue::Close];

static CANDLESTICK: SeriesKindBehavior = SeriesKindBehavior {
    kind: SeriesKind::Candlestick,
    convert: convert_ohlc,
    autoscale_values: OHLC_VALUES,
    paint: series_painters::paint_candlesticks,
};

static BAR: SeriesKindBehavior = SeriesKindBehavior {
    kind: SeriesKind::Bar,
    convert: convert_ohlc,
    autoscale_values: OHLC_VALUES,
    paint: series_painters::paint_bars,
};

static LINE: SeriesKindBehavior = SeriesKindBehavior {
    kind: SeriesKind::Line,
    convert: convert_single_value,
    autoscale_values: CLOSE_VALUE,
    paint: series_painters::paint_line,
};

static AREA: SeriesKindBehavior = SeriesKindBehavior {
    kind: SeriesKind::Area,
    convert: convert_single_value,
    autoscale_values: CLOSE_VALUE,
    paint: series_painters::paint_area,
};

static BASELINE: SeriesKindBehavior = SeriesKindBehavior {
    kind: SeriesKind::Baseline,
    convert: convert_single_value,
    autoscale_values: CLOSE_VALUE,
    paint: series_painters::paint_baseline,
};

static HISTOGRAM: SeriesKindBehavior = SeriesKindBehavior {
    kind: SeriesKind::Histogram,
    convert: convert_single_value,
    autoscale_values: CLOSE_VALUE,
    paint: series_painters::paint_histogram,
};

impl SeriesKind {
    #[must_use]
    pub fn behavior(self) -> &'static SeriesKindBehavior {
        match self {
            Self::Candlestick => &CANDLESTICK,
            Self::Bar => &BAR,
            Self::Line => &LINE,
            Self::Area => &AREA,
            Self::Baseline => &BASELINE,
            Self::Histogram => &HISTOGRAM,
        }
    }

    #[must_use]
    pub fn is_ohlc(self) -> bool {
        matches!(self, Self::Candlestick | Self::Bar)
    }
}

/// One input item for `set_data`/`update`; an item without values is whitespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDataItem {
    pub time: Time,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wick_color: Option<Color>,
}

impl SeriesDataItem {
    #[must_use]
    pub fn whitespace(time: impl Into<Time>) -> Self {
        Self {
            time: time.into(),
            open: None,
            high: None,
            low: None,
            close: None,
            value: None,
            color: None,
            border_color: None,
            wick_color: None,
        }
    }

    #[must_use]
    pub fn value(time: impl Into<Time>, value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::whitespace(time)
        }
    }

    #[must_use]
    pub fn ohlc(time: impl Into<Time>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            ..Self::whitespace(time)
        }
    }

    pub fn from_decimal_ohlc(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> ChartResult<Self> {
        Ok(Self::ohlc(
            time,
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
        ))
    }

    pub fn from_decimal_value(time: DateTime<Utc>, value: Decimal) -> ChartResult<Self> {
        Ok(Self::value(time, decimal_to_f64(value, "value")?))
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.value.is_none()
    }

    #[must_use]
    pub fn colors(&self) -> PointColors {
        PointColors {
            color: self.color,
            border_color: self.border_color,
            wick_color: self.wick_color,
        }
    }
}

fn convert_ohlc(item: &SeriesDataItem) -> ChartResult<Option<[f64; 4]>> {
    if item.is_whitespace() {
        return Ok(None);
    }
    let (Some(open), Some(high), Some(low), Some(close)) =
        (item.open, item.high, item.low, item.close)
    else {
        return Err(ChartError::InvalidData(
            "ohlc series items need open, high, low and close".to_owned(),
        ));
    };
    if !open.is_finite() || !high.is_finite() || !low.is_finite() || !close.is_finite() {
        return Err(ChartError::InvalidData(
            "ohlc values must be finite".to_owned(),
        ));
    }
    if low > high {
        return Err(ChartError::InvalidData(
            "ohlc low must be <= high".to_owned(),
        ));
    }
    if open < low || open > high || close < low || close > high {
        return Err(ChartError::InvalidData(
            "ohlc open/close must be within low/high range".to_owned(),
        ));
    }
    Ok(Some([open, high, low, close]))
}

fn convert_single_value(item: &SeriesDataItem) -> ChartResult<Option<[f64; 4]>> {
    let Some(value) = item.value else {
        return Ok(None);
    };
    if !value.is_finite() {
        return Err(ChartError::InvalidData(
            "series value must be finite".to_owned(),
        ));
    }
    Ok(Some([value; 4]))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceFormat {
    pub precision: u32,
    pub min_move: f64,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            precision: 2,
            min_move: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesOptions {
    pub title: String,
    pub visible: bool,
    /// `right`, `left`, or an overlay id.
    pub price_scale_id: String,
    pub pane_index: usize,
    pub color: Color,
    pub up_color: Color,
    pub down_color: Color,
    pub line_width: f64,
    /// Reference value for baseline and histogram bases.
    pub base_value: f64,
    pub price_format: PriceFormat,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            visible: true,
            price_scale_id: "right".to_owned(),
            pane_index: 0,
            color: Color::rgb(0.16, 0.38, 1.0),
            up_color: Color::rgb(0.15, 0.65, 0.60),
            down_color: Color::rgb(0.94, 0.33, 0.31),
            line_width: 2.0,
            base_value: 0.0,
            price_format: PriceFormat::default(),
        }
    }
}

/// Registry entry for one series; its rows live in the time index.
#[derive(Debug, Clone)]
pub struct Series {
    id: SeriesId,
    behavior: &'static SeriesKindBehavior,
    options: SeriesOptions,
}

impl Series {
    #[must_use]
    pub fn new(id: SeriesId, kind: SeriesKind, options: SeriesOptions) -> Self {
        Self {
            id,
            behavior: kind.behavior(),
            options,
        }
    }

    #[must_use]
    pub fn id(&self) -> SeriesId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        self.behavior.kind
    }

    #[must_use]
    pub fn behavior(&self) -> &'static SeriesKindBehavior {
        self.behavior
    }

    #[must_use]
    pub fn options(&self) -> &SeriesOptions {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut SeriesOptions {
        &mut self.options
    }

    pub fn convert(&self, item: &SeriesDataItem) -> ChartResult<Option<[f64; 4]>> {
        (self.behavior.convert)(item)
    }

    /// Close of the first row at or right of the visible range's left edge.
    #[must_use]
    pub fn first_value(&self, rows: &PlotList, visible: StrictRange) -> Option<f64> {
        rows.search(visible.left(), MismatchDirection::NearestRight)
            .filter(|row| row.index <= visible.right())
            .map(SeriesPoint::close)
    }

    #[must_use]
    pub fn autoscale_info(&self, rows: &PlotList, visible: StrictRange) -> Option<AutoScaleInfo> {
        if !self.options.visible {
            return None;
        }
        let min_max =
            rows.min_max_on_range(visible.left(), visible.right(), self.behavior.autoscale_values)?;
        let mut range = PriceRange::new(min_max.min, min_max.max);
        if matches!(self.kind(), SeriesKind::Baseline | SeriesKind::Histogram) {
            range = range.merge(PriceRange::new(self.options.base_value, self.options.base_value));
        }
        Some(AutoScaleInfo {
            price_range: Some(range),
            margins: None,
        })
    }
}

/// Pixel-space view of one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub index: TimePointIndex,
    pub x: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub colors: PointColors,
}

/// Projects rows through caller-provided x/y mappings.
pub fn project_rows<X, Y>(rows: &[SeriesPoint], x_of: X, y_of: Y) -> Vec<ProjectedPoint>
where
    X: Fn(TimePointIndex) -> f64 + Sync,
    Y: Fn(f64) -> f64 + Sync,
{
    let project = |row: &SeriesPoint| ProjectedPoint {
        index: row.index,
        x: x_of(row.index),
        open: y_of(row.open()),
        high: y_of(row.high()),
        low: y_of(row.low()),
        close: y_of(row.close()),
        colors: row.colors,
    };

    #[cfg(feature = "parallel-projection")]
    {
        rows.par_iter().map(project).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        rows.iter().map(project).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{SeriesDataItem, SeriesKind};

    #[test]
    fn ohlc_kinds_reject_partial_items() {
        let behavior = SeriesKind::Candlestick.behavior();
        let mut item = SeriesDataItem::ohlc(1, 10.0, 12.0, 9.0, 11.0);
        item.close = None;
        assert!((behavior.convert)(&item).is_err());
        let whitespace = SeriesDataItem::whitespace(1);
        assert_eq!((behavior.convert)(&whitespace).expect("whitespace"), None);
    }

    #[test]
    fn ohlc_validation_matches_candle_invariants() {
        let behavior = SeriesKind::Bar.behavior();
        let inverted = SeriesDataItem::ohlc(1, 10.0, 9.0, 12.0, 11.0);
        assert!((behavior.convert)(&inverted).is_err());
        let valid = SeriesDataItem::ohlc(1, 10.0, 12.0, 9.0, 11.0);
        assert_eq!(
            (behavior.convert)(&valid).expect("valid"),
            Some([10.0, 12.0, 9.0, 11.0])
        );
    }

    #[test]
    fn value_kinds_repeat_value() {
        for kind in [
            SeriesKind::Line,
            SeriesKind::Area,
            SeriesKind::Baseline,
            SeriesKind::Histogram,
        ] {
            let converted = (kind.behavior().convert)(&SeriesDataItem::value(5, 3.5))
                .expect("value item");
            assert_eq!(converted, Some([3.5; 4]));
        }
        let nan = SeriesDataItem::value(5, f64::NAN);
        assert!((SeriesKind::Line.behavior().convert)(&nan).is_err());
    }

    #[test]
    fn json_items_deserialize_with_optional_fields() {
        let item: SeriesDataItem =
            serde_json::from_str(r#"{"time":"2022-05-01","value":12.5}"#).expect("json");
        assert_eq!(item.value, Some(12.5));
        assert!(item.open.is_none());
        assert!(!item.is_whitespace());
    }
}
