use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::PriceFormat;
use crate::error::{ChartError, ChartResult};

use super::StrictRange;
use super::price_tick_marks::{PriceTickMark, price_tick_span, walk_price_ticks};

/// `right`, `left`, or an overlay id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceScaleId(String);

impl PriceScaleId {
    pub const RIGHT: &'static str = "right";
    pub const LEFT: &'static str = "left";

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn right() -> Self {
        Self::new(Self::RIGHT)
    }

    #[must_use]
    pub fn left() -> Self {
        Self::new(Self::LEFT)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_overlay(&self) -> bool {
        self.0 != Self::RIGHT && self.0 != Self::LEFT
    }
}

impl fmt::Display for PriceScaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PriceScaleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceScaleMode {
    #[default]
    Normal,
    Logarithmic,
    Percentage,
    IndexedTo100,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceScaleState {
    pub auto_scale: bool,
    pub is_inverted: bool,
    pub mode: PriceScaleMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct PriceScaleStateChange {
    pub auto_scale: Option<bool>,
    pub is_inverted: Option<bool>,
    pub mode: Option<PriceScaleMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceScaleMargins {
    pub top: f64,
    pub bottom: f64,
}

impl PriceScaleMargins {
    pub fn validate(self) -> ChartResult<()> {
        let in_unit = |value: f64| value.is_finite() && (0.0..=1.0).contains(&value);
        if !in_unit(self.top) || !in_unit(self.bottom) || self.top + self.bottom > 1.0 {
            return Err(ChartError::InvalidScaleMargins {
                top: self.top,
                bottom: self.bottom,
            });
        }
        Ok(())
    }
}

impl Default for PriceScaleMargins {
    fn default() -> Self {
        Self {
            top: 0.2,
            bottom: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceScaleOptions {
    pub auto_scale: bool,
    pub mode: PriceScaleMode,
    pub invert_scale: bool,
    pub scale_margins: PriceScaleMargins,
    pub ensure_edge_tick_marks_visible: bool,
    pub visible: bool,
    pub minimum_width: f64,
}

impl Default for PriceScaleOptions {
    fn default() -> Self {
        Self {
            auto_scale: true,
            mode: PriceScaleMode::Normal,
            invert_scale: false,
            scale_margins: PriceScaleMargins::default(),
            ensure_edge_tick_marks_visible: false,
            visible: true,
            minimum_width: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    min: f64,
    max: f64,
}

impl PriceRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.min == self.max || self.min.is_nan() || self.max.is_nan()
    }

    #[must_use]
    pub fn contains(self, value: f64, tolerance: f64) -> bool {
        self.min - tolerance <= value && value <= self.max + tolerance
    }

    #[must_use]
    pub fn merge(self, other: PriceRange) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn scale_around_center(&mut self, coeff: f64) {
        if !coeff.is_finite() || self.length() == 0.0 {
            return;
        }
        let center = (self.max + self.min) * 0.5;
        let max_delta = (self.max - center) * coeff;
        let min_delta = (self.min - center) * coeff;
        self.max = center + max_delta;
        self.min = center + min_delta;
    }

    pub fn shift(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.max += delta;
        self.min += delta;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoScaleMargins {
    pub above: f64,
    pub below: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoScaleInfo {
    pub price_range: Option<PriceRange>,
    pub margins: Option<AutoScaleMargins>,
}

/// Anything that contributes to a price scale's autoscale pass.
pub trait AutoScaleSource {
    fn visible(&self) -> bool;
    fn first_value(&self) -> Option<f64>;
    fn autoscale_info(&self, visible_bars: StrictRange) -> Option<AutoScaleInfo>;
    fn min_move(&self) -> f64 {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LogFormula {
    logical_offset: f64,
    coord_offset: f64,
}

impl Default for LogFormula {
    fn default() -> Self {
        Self {
            logical_offset: 4.0,
            coord_offset: 0.0001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TickMarksKey {
    range: PriceRange,
    height: f64,
    mode: PriceScaleMode,
    inverted: bool,
    font_size: f64,
    base_value: f64,
    min_move: f64,
}

#[derive(Debug, Clone)]
pub struct PriceScale {
    id: PriceScaleId,
    options: PriceScaleOptions,
    height: f64,
    price_range: Option<PriceRange>,
    price_range_snapshot: Option<PriceRange>,
    invalidated_for_range: Option<StrictRange>,
    margin_above: f64,
    margin_below: f64,
    scale_start_point: Option<f64>,
    scroll_start_point: Option<f64>,
    log_formula: LogFormula,
    price_format: PriceFormat,
    base_value: Option<f64>,
    tick_marks: Option<(TickMarksKey, Vec<PriceTickMark>)>,
}

impl PriceScale {
    #[must_use]
    pub fn new(id: impl Into<PriceScaleId>, options: PriceScaleOptions) -> Self {
        Self {
            id: id.into(),
            options,
            height: 0.0,
            price_range: None,
            price_range_snapshot: None,
            invalidated_for_range: None,
            margin_above: 0.0,
            margin_below: 0.0,
            scale_start_point: None,
            scroll_start_point: None,
            log_formula: LogFormula::default(),
            price_format: PriceFormat::default(),
            base_value: None,
            tick_marks: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &PriceScaleId {
        &self.id
    }

    #[must_use]
    pub fn options(&self) -> PriceScaleOptions {
        self.options
    }

    pub fn apply_options(&mut self, options: PriceScaleOptions) -> ChartResult<()> {
        options.scale_margins.validate()?;
        let change = PriceScaleStateChange {
            auto_scale: Some(options.auto_scale),
            is_inverted: Some(options.invert_scale),
            mode: Some(options.mode),
        };
        self.options.scale_margins = options.scale_margins;
        self.options.ensure_edge_tick_marks_visible = options.ensure_edge_tick_marks_visible;
        self.options.visible = options.visible;
        self.options.minimum_width = options.minimum_width;
        self.set_mode(change);
        Ok(())
    }

    #[must_use]
    pub fn mode(&self) -> PriceScaleState {
        PriceScaleState {
            auto_scale: self.options.auto_scale,
            is_inverted: self.options.invert_scale,
            mode: self.options.mode,
        }
    }

    /// Switches mode, keeping the visible window stable across log transforms.
    pub fn set_mode(&mut self, change: PriceScaleStateChange) {
        let old_mode = self.mode();
        if let Some(auto_scale) = change.auto_scale {
            self.options.auto_scale = auto_scale;
        }
        if let Some(mode) = change.mode {
            self.options.mode = mode;
            if matches!(
                mode,
                PriceScaleMode::Percentage | PriceScaleMode::IndexedTo100
            ) {
                self.options.auto_scale = true;
            }
        }
        if old_mode.mode == PriceScaleMode::Logarithmic && self.options.mode != old_mode.mode {
            if let Some(raw) = convert_price_range_from_log(self.price_range, self.log_formula) {
                self.price_range = Some(raw);
            } else {
                self.options.auto_scale = true;
            }
        }
        if self.options.mode == PriceScaleMode::Logarithmic && self.options.mode != old_mode.mode {
            self.log_formula = log_formula_for_price_range(self.price_range);
            self.price_range = convert_price_range_to_log(self.price_range, self.log_formula);
        }
        if let Some(inverted) = change.is_inverted {
            self.options.invert_scale = inverted;
        }
        if self.mode() != old_mode {
            trace!(scale = %self.id, mode = ?self.options.mode, "price scale mode changed");
            self.tick_marks = None;
        }
    }

    pub fn set_auto_scale(&mut self, on: bool) {
        self.set_mode(PriceScaleStateChange {
            auto_scale: Some(on),
            ..PriceScaleStateChange::default()
        });
    }

    #[must_use]
    pub fn is_auto_scale(&self) -> bool {
        self.options.auto_scale
    }

    #[must_use]
    pub fn is_log(&self) -> bool {
        self.options.mode == PriceScaleMode::Logarithmic
    }

    #[must_use]
    pub fn is_percentage(&self) -> bool {
        self.options.mode == PriceScaleMode::Percentage
    }

    #[must_use]
    pub fn is_indexed_to_100(&self) -> bool {
        self.options.mode == PriceScaleMode::IndexedTo100
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.options.invert_scale
    }

    pub fn set_height(&mut self, value: f64) {
        if (self.height - value).abs() <= f64::EPSILON {
            return;
        }
        self.height = value;
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Height available to data once margins are removed.
    #[must_use]
    pub fn internal_height(&self) -> f64 {
        self.height - self.top_margin_px() - self.bottom_margin_px()
    }

    /// Current range in internal units (log space for logarithmic scales).
    #[must_use]
    pub fn price_range(&self) -> Option<PriceRange> {
        self.price_range
    }

    pub fn set_price_range(&mut self, range: Option<PriceRange>) {
        if self.price_range == range {
            return;
        }
        self.price_range = range;
    }

    /// Visible range in display units: prices, or percent for the
    /// percentage modes.
    #[must_use]
    pub fn visible_price_range(&self) -> Option<PriceRange> {
        if self.is_log() {
            convert_price_range_from_log(self.price_range, self.log_formula)
        } else {
            self.price_range
        }
    }

    /// Pins the scale to `range`, given in display units, and turns autoscale
    /// off.
    pub fn set_visible_price_range(&mut self, range: PriceRange) {
        self.set_auto_scale(false);
        let internal = if self.is_log() {
            convert_price_range_to_log(Some(range), self.log_formula)
        } else {
            Some(range)
        };
        self.set_price_range(internal);
    }

    /// Zero height or no usable range; coordinate queries return `0`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.height == 0.0 || self.price_range.is_none_or(|range| range.is_empty())
    }

    pub fn set_price_format(&mut self, format: PriceFormat) {
        if self.price_format != format {
            self.price_format = format;
            self.tick_marks = None;
        }
    }

    #[must_use]
    pub fn price_format(&self) -> PriceFormat {
        self.price_format
    }

    #[must_use]
    pub fn min_move(&self) -> f64 {
        if self.price_format.min_move > 0.0 {
            self.price_format.min_move
        } else {
            1.0
        }
    }

    /// Base value used for percentage modes; the first visible value of the
    /// scale's first series.
    #[must_use]
    pub fn base_value(&self) -> Option<f64> {
        self.base_value
    }

    /// Base to pass to the coordinate mappings; `None` while a percentage or
    /// indexed scale has no first value to anchor on.
    #[must_use]
    pub fn mapping_base(&self) -> Option<f64> {
        if self.is_percentage() || self.is_indexed_to_100() {
            self.base_value.filter(|base| *base != 0.0)
        } else {
            Some(self.base_value.unwrap_or(0.0))
        }
    }

    pub fn recalculate_price_range(
        &mut self,
        visible_bars: StrictRange,
        sources: &[&dyn AutoScaleSource],
    ) {
        self.invalidated_for_range = Some(visible_bars);
        self.base_value = sources
            .iter()
            .filter(|source| source.visible())
            .find_map(|source| source.first_value());
        self.recalculate_price_range_impl(sources);
    }

    pub fn price_to_coordinate(&self, price: f64, base_value: f64) -> f64 {
        let logical = if self.is_percentage() {
            to_percent(price, base_value)
        } else if self.is_indexed_to_100() {
            to_indexed_to_100(price, base_value)
        } else {
            price
        };
        self.logical_to_coordinate(logical)
    }

    pub fn coordinate_to_price(&self, coordinate: f64, base_value: f64) -> f64 {
        let logical = self.coordinate_to_logical(coordinate);
        self.logical_to_price(logical, base_value)
    }

    #[must_use]
    pub fn logical_to_price(&self, logical: f64, base_value: f64) -> f64 {
        if self.is_percentage() {
            from_percent(logical, base_value)
        } else if self.is_indexed_to_100() {
            from_indexed_to_100(logical, base_value)
        } else {
            logical
        }
    }

    /// Maps a mode-space value to y; `0` when the scale is empty.
    #[must_use]
    pub fn logical_to_coordinate(&self, mut logical: f64) -> f64 {
        let Some(range) = self.usable_range() else {
            return 0.0;
        };
        if self.is_log() && logical != 0.0 {
            logical = to_log(logical, self.log_formula);
        }
        let inv_coordinate = self.bottom_margin_px()
            + (self.internal_height() - 1.0) * (logical - range.min()) / range.length();
        self.inverted_coordinate(inv_coordinate)
    }

    #[must_use]
    pub fn coordinate_to_logical(&self, coordinate: f64) -> f64 {
        let Some(range) = self.usable_range() else {
            return 0.0;
        };
        let inv_coordinate = self.inverted_coordinate(coordinate);
        let logical = range.min()
            + range.length()
                * ((inv_coordinate - self.bottom_margin_px()) / (self.internal_height() - 1.0));
        if self.is_log() {
            from_log(logical, self.log_formula)
        } else {
            logical
        }
    }

    pub fn start_scale(&mut self, x: f64) {
        if self.is_percentage() || self.is_indexed_to_100() {
            return;
        }
        if self.scale_start_point.is_some() || self.price_range_snapshot.is_some() {
            return;
        }
        if self.is_empty() {
            return;
        }
        self.scale_start_point = Some(self.height - x);
        self.price_range_snapshot = self.price_range;
    }

    /// Axis drag; turns autoscale off until it is re-enabled.
    pub fn scale_to(&mut self, mut x: f64) {
        if self.is_percentage() || self.is_indexed_to_100() {
            return;
        }
        let Some(scale_start) = self.scale_start_point else {
            return;
        };
        self.options.auto_scale = false;
        x = self.height - x;
        if x < 0.0 {
            x = 0.0;
        }
        let mut coeff = (scale_start + (self.height - 1.0) * 0.2) / (x + (self.height - 1.0) * 0.2);
        coeff = coeff.max(0.1);
        if let Some(mut range) = self.price_range_snapshot {
            range.scale_around_center(coeff);
            self.price_range = Some(range);
        }
    }

    pub fn end_scale(&mut self) {
        if self.is_percentage() || self.is_indexed_to_100() {
            return;
        }
        self.scale_start_point = None;
        self.price_range_snapshot = None;
    }

    pub fn start_scroll(&mut self, x: f64) {
        if self.options.auto_scale {
            return;
        }
        if self.scroll_start_point.is_some() || self.price_range_snapshot.is_some() {
            return;
        }
        if self.is_empty() {
            return;
        }
        self.scroll_start_point = Some(x);
        self.price_range_snapshot = self.price_range;
    }

    pub fn scroll_to(&mut self, x: f64) {
        if self.options.auto_scale {
            return;
        }
        let Some(scroll_start) = self.scroll_start_point else {
            return;
        };
        let Some(current_range) = self.price_range else {
            return;
        };
        let mut pixel_delta = x - scroll_start;
        if self.is_inverted() {
            pixel_delta *= -1.0;
        }
        let price_units_per_pixel = current_range.length() / (self.internal_height() - 1.0);
        let price_delta = pixel_delta * price_units_per_pixel;
        if let Some(mut snapshot) = self.price_range_snapshot {
            snapshot.shift(price_delta);
            self.price_range = Some(snapshot);
        }
    }

    pub fn end_scroll(&mut self) {
        if self.options.auto_scale {
            return;
        }
        self.scroll_start_point = None;
        self.price_range_snapshot = None;
    }

    #[must_use]
    pub fn has_visible_edge_marks(&self) -> bool {
        self.options.ensure_edge_tick_marks_visible && self.options.auto_scale
    }

    #[must_use]
    pub fn edge_marks_padding(&self) -> f64 {
        6.0
    }

    /// Formats a real price with the scale's precision.
    #[must_use]
    pub fn format_price(&self, price: f64) -> String {
        format!("{price:.prec$}", prec = self.price_format.precision as usize)
    }

    /// Formats a mode-space value the way the axis labels it.
    #[must_use]
    pub fn format_logical(&self, logical: f64) -> String {
        match self.options.mode {
            PriceScaleMode::Percentage => format!("{logical:.2}%"),
            PriceScaleMode::IndexedTo100 => format!("{logical:.2}"),
            PriceScaleMode::Normal | PriceScaleMode::Logarithmic => self.format_price(logical),
        }
    }

    /// Axis labels for the current range, cached until the range, height,
    /// mode or format change.
    pub fn tick_marks(&mut self, font_size: f64) -> &[PriceTickMark] {
        let Some(range) = self.usable_range() else {
            self.tick_marks = None;
            return &[];
        };
        let key = TickMarksKey {
            range,
            height: self.height,
            mode: self.options.mode,
            inverted: self.options.invert_scale,
            font_size,
            base_value: self.base_value.unwrap_or(0.0),
            min_move: self.min_move(),
        };
        let stale = self
            .tick_marks
            .as_ref()
            .is_none_or(|(cached, _)| *cached != key);
        if stale {
            let marks = self.build_tick_marks(font_size);
            self.tick_marks = Some((key, marks));
        }
        self.tick_marks
            .as_ref()
            .map_or(&[], |(_, marks)| marks.as_slice())
    }

    fn build_tick_marks(&self, font_size: f64) -> Vec<PriceTickMark> {
        let edge = if self.has_visible_edge_marks() {
            font_size / 2.0
        } else {
            0.0
        };
        let bounds = (edge, self.height - 1.0 - edge);
        let top = self.coordinate_to_logical(0.0);
        let bottom = self.coordinate_to_logical(self.height - 1.0);
        let (high, low) = (top.max(bottom), top.min(bottom));
        if high == low {
            return Vec::new();
        }
        let min_move = match self.options.mode {
            PriceScaleMode::Percentage | PriceScaleMode::IndexedTo100 => 0.01,
            _ => self.min_move(),
        };
        let height = self.height;
        let span = price_tick_span(high, low, height, font_size, min_move);
        let to_coordinate = |value: f64| self.logical_to_coordinate(value);
        let marks = if self.is_log() {
            let respan = |value: f64| price_tick_span(value, low, height, font_size, min_move);
            walk_price_ticks(high, low, span, font_size, bounds, to_coordinate, Some(&respan))
        } else {
            walk_price_ticks(high, low, span, font_size, bounds, to_coordinate, None)
        };
        marks
            .into_iter()
            .map(|(logical, coordinate)| PriceTickMark {
                coordinate,
                logical,
                label: self.format_logical(logical),
            })
            .collect()
    }

    fn usable_range(&self) -> Option<PriceRange> {
        if self.is_empty() {
            return None;
        }
        self.price_range
    }

    fn recalculate_price_range_impl(&mut self, sources: &[&dyn AutoScaleSource]) {
        if !self.options.auto_scale && self.price_range.is_some() {
            return;
        }
        let Some(visible_bars) = self.invalidated_for_range else {
            return;
        };
        let mut price_range: Option<PriceRange> = None;
        let mut margin_above: f64 = 0.0;
        let mut margin_below: f64 = 0.0;

        for source in sources {
            if !source.visible() {
                continue;
            }
            let Some(first_value) = source.first_value() else {
                continue;
            };
            let Some(info) = source.autoscale_info(visible_bars) else {
                continue;
            };
            if let Some(margins) = info.margins {
                margin_above = margin_above.max(margins.above);
                margin_below = margin_below.max(margins.below);
            }
            let Some(mut source_range) = info.price_range else {
                continue;
            };
            source_range = match self.options.mode {
                PriceScaleMode::Logarithmic => {
                    convert_price_range_to_log(Some(source_range), self.log_formula)
                        .unwrap_or(source_range)
                }
                PriceScaleMode::Percentage => to_percent_range(source_range, first_value),
                PriceScaleMode::IndexedTo100 => to_indexed_to_100_range(source_range, first_value),
                PriceScaleMode::Normal => source_range,
            };
            price_range = Some(if let Some(acc) = price_range {
                acc.merge(source_range)
            } else {
                source_range
            });
        }

        if self.has_visible_edge_marks() {
            margin_above = margin_above.max(self.edge_marks_padding());
            margin_below = margin_below.max(self.edge_marks_padding());
        }
        self.margin_above = margin_above;
        self.margin_below = margin_below;

        if let Some(mut range) = price_range {
            if (range.min() - range.max()).abs() <= f64::EPSILON {
                let extend = 5.0 * self.min_move();
                if self.is_log()
                    && let Some(raw) = convert_price_range_from_log(Some(range), self.log_formula)
                {
                    range = raw;
                }
                range = PriceRange::new(range.min() - extend, range.max() + extend);
                if self.is_log()
                    && let Some(log_range) = convert_price_range_to_log(Some(range), self.log_formula)
                {
                    range = log_range;
                }
            }
            if self.is_log()
                && let Some(raw) = convert_price_range_from_log(Some(range), self.log_formula)
            {
                let new_formula = log_formula_for_price_range(Some(raw));
                if !log_formulas_are_same(new_formula, self.log_formula) {
                    let snapshot_raw =
                        convert_price_range_from_log(self.price_range_snapshot, self.log_formula);
                    self.log_formula = new_formula;
                    if let Some(log_range) = convert_price_range_to_log(Some(raw), self.log_formula)
                    {
                        range = log_range;
                    }
                    self.price_range_snapshot =
                        convert_price_range_to_log(snapshot_raw, self.log_formula);
                }
            }
            self.price_range = Some(range);
        } else if self.price_range.is_none() {
            self.price_range = Some(PriceRange::new(-0.5, 0.5));
            self.log_formula = log_formula_for_price_range(None);
        }
    }

    fn inverted_coordinate(&self, coordinate: f64) -> f64 {
        if self.is_inverted() {
            coordinate
        } else {
            self.height - 1.0 - coordinate
        }
    }

    fn top_margin_px(&self) -> f64 {
        if self.is_inverted() {
            self.options.scale_margins.bottom * self.height + self.margin_below
        } else {
            self.options.scale_margins.top * self.height + self.margin_above
        }
    }

    fn bottom_margin_px(&self) -> f64 {
        if self.is_inverted() {
            self.options.scale_margins.top * self.height + self.margin_above
        } else {
            self.options.scale_margins.bottom * self.height + self.margin_below
        }
    }
}

fn from_percent(value: f64, base_value: f64) -> f64 {
    let value = if base_value < 0.0 { -value } else { value };
    (value / 100.0) * base_value + base_value
}

fn to_percent(value: f64, base_value: f64) -> f64 {
    let result = 100.0 * (value - base_value) / base_value;
    if base_value < 0.0 { -result } else { result }
}

fn to_percent_range(range: PriceRange, base_value: f64) -> PriceRange {
    PriceRange::new(
        to_percent(range.min(), base_value),
        to_percent(range.max(), base_value),
    )
}

fn from_indexed_to_100(value: f64, base_value: f64) -> f64 {
    let mut value = value - 100.0;
    if base_value < 0.0 {
        value = -value;
    }
    (value / 100.0) * base_value + base_value
}

fn to_indexed_to_100(value: f64, base_value: f64) -> f64 {
    let result = 100.0 * (value - base_value) / base_value + 100.0;
    if base_value < 0.0 { -result } else { result }
}

fn to_indexed_to_100_range(range: PriceRange, base_value: f64) -> PriceRange {
    PriceRange::new(
        to_indexed_to_100(range.min(), base_value),
        to_indexed_to_100(range.max(), base_value),
    )
}

fn to_log(price: f64, log_formula: LogFormula) -> f64 {
    let magnitude = price.abs();
    if magnitude < 1e-15 {
        return 0.0;
    }
    let value = (magnitude + log_formula.coord_offset).log10() + log_formula.logical_offset;
    if price < 0.0 { -value } else { value }
}

fn from_log(logical: f64, log_formula: LogFormula) -> f64 {
    let magnitude = logical.abs();
    if magnitude < 1e-15 {
        return 0.0;
    }
    let value = 10f64.powf(magnitude - log_formula.logical_offset) - log_formula.coord_offset;
    if logical < 0.0 { -value } else { value }
}

fn convert_price_range_to_log(
    range: Option<PriceRange>,
    formula: LogFormula,
) -> Option<PriceRange> {
    range.map(|r| PriceRange::new(to_log(r.min(), formula), to_log(r.max(), formula)))
}

fn convert_price_range_from_log(
    range: Option<PriceRange>,
    formula: LogFormula,
) -> Option<PriceRange> {
    range.map(|r| PriceRange::new(from_log(r.min(), formula), from_log(r.max(), formula)))
}

/// Widens the log offsets when the range is narrower than one unit.
fn log_formula_for_price_range(range: Option<PriceRange>) -> LogFormula {
    let default = LogFormula::default();
    let Some(range) = range else {
        return default;
    };
    let diff = (range.max() - range.min()).abs();
    if !(1e-15..1.0).contains(&diff) {
        return default;
    }
    let digits = diff.log10().abs().ceil();
    let logical_offset = default.logical_offset + digits;
    let coord_offset = 1.0 / 10f64.powf(logical_offset);
    LogFormula {
        logical_offset,
        coord_offset,
    }
}

fn log_formulas_are_same(left: LogFormula, right: LogFormula) -> bool {
    (left.logical_offset - right.logical_offset).abs() <= f64::EPSILON
        && (left.coord_offset - right.coord_offset).abs() <= f64::EPSILON
}
