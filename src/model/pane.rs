use indexmap::IndexMap;

use crate::core::{PlotList, Series, SeriesId};
use crate::error::{ChartError, ChartResult};
use crate::extensions::PanePrimitive;

use super::{AutoScaleInfo, AutoScaleSource, PriceScale, PriceScaleId, PriceScaleOptions, StrictRange};

/// Smallest height a pane is laid out with.
pub const MIN_PANE_HEIGHT: f64 = 2.0;

/// One vertical section of the chart: its price scales, the series drawn in it
/// and host primitives attached to it.
pub struct Pane {
    stretch_factor: f64,
    height: f64,
    price_scales: IndexMap<PriceScaleId, PriceScale>,
    series: Vec<SeriesId>,
    primitives: Vec<Box<dyn PanePrimitive>>,
    primitives_version: u64,
}

impl Pane {
    #[must_use]
    pub fn new(left_options: PriceScaleOptions, right_options: PriceScaleOptions) -> Self {
        let mut price_scales = IndexMap::new();
        price_scales.insert(
            PriceScaleId::left(),
            PriceScale::new(PriceScaleId::left(), left_options),
        );
        price_scales.insert(
            PriceScaleId::right(),
            PriceScale::new(PriceScaleId::right(), right_options),
        );
        Self {
            stretch_factor: 1.0,
            height: 0.0,
            price_scales,
            series: Vec::new(),
            primitives: Vec::new(),
            primitives_version: 0,
        }
    }

    #[must_use]
    pub fn stretch_factor(&self) -> f64 {
        self.stretch_factor
    }

    pub fn set_stretch_factor(&mut self, stretch_factor: f64) -> ChartResult<()> {
        validate_stretch_factor(stretch_factor)?;
        self.stretch_factor = stretch_factor;
        Ok(())
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
        for scale in self.price_scales.values_mut() {
            scale.set_height(height);
        }
    }

    #[must_use]
    pub fn price_scale(&self, id: &PriceScaleId) -> Option<&PriceScale> {
        self.price_scales.get(id)
    }

    pub fn price_scale_mut(&mut self, id: &PriceScaleId) -> Option<&mut PriceScale> {
        self.price_scales.get_mut(id)
    }

    pub fn price_scales(&self) -> impl Iterator<Item = &PriceScale> {
        self.price_scales.values()
    }

    /// Returns the scale with `id`, creating an overlay scale on first use.
    pub fn ensure_price_scale(
        &mut self,
        id: &PriceScaleId,
        options: PriceScaleOptions,
    ) -> &mut PriceScale {
        let height = self.height;
        self.price_scales.entry(id.clone()).or_insert_with(|| {
            let mut scale = PriceScale::new(id.clone(), options);
            scale.set_height(height);
            scale
        })
    }

    /// Scale used for crosshair prices and primitives: the right one unless
    /// only the left one is visible.
    #[must_use]
    pub fn default_price_scale_id(&self) -> PriceScaleId {
        let right_visible = self
            .price_scale(&PriceScaleId::right())
            .is_some_and(|scale| scale.options().visible);
        let left_visible = self
            .price_scale(&PriceScaleId::left())
            .is_some_and(|scale| scale.options().visible);
        if !right_visible && left_visible {
            PriceScaleId::left()
        } else {
            PriceScaleId::right()
        }
    }

    #[must_use]
    pub fn default_price_scale(&self) -> Option<&PriceScale> {
        self.price_scale(&self.default_price_scale_id())
    }

    #[must_use]
    pub fn series(&self) -> &[SeriesId] {
        &self.series
    }

    pub(crate) fn add_series(&mut self, series: SeriesId) {
        if !self.series.contains(&series) {
            self.series.push(series);
        }
    }

    pub(crate) fn remove_series(&mut self, series: SeriesId) -> bool {
        let before = self.series.len();
        self.series.retain(|id| *id != series);
        before != self.series.len()
    }

    /// Drops overlay scales no series refers to any more.
    pub(crate) fn drop_unused_overlays(&mut self, in_use: &[PriceScaleId]) {
        self.price_scales
            .retain(|id, _| !id.is_overlay() || in_use.contains(id));
    }

    #[must_use]
    pub fn primitives(&self) -> &[Box<dyn PanePrimitive>] {
        &self.primitives
    }

    /// Bumped whenever a primitive is attached or detached.
    #[must_use]
    pub fn primitives_version(&self) -> u64 {
        self.primitives_version
    }

    pub fn attach_primitive(&mut self, primitive: Box<dyn PanePrimitive>) {
        self.primitives.push(primitive);
        self.primitives_version += 1;
    }

    pub fn detach_primitive(&mut self, id: &str) -> Option<Box<dyn PanePrimitive>> {
        let position = self.primitives.iter().position(|p| p.id() == id)?;
        self.primitives_version += 1;
        Some(self.primitives.remove(position))
    }

    /// Runs autoscale on every scale of the pane. Primitives contribute to the
    /// default scale only.
    pub(crate) fn recalculate(&mut self, visible: StrictRange, series: &[SeriesSource<'_>]) {
        let default_id = self.default_price_scale_id();
        let Self {
            price_scales,
            primitives,
            ..
        } = self;
        for (id, scale) in price_scales.iter_mut() {
            let primitive_sources: Vec<PrimitiveSource<'_>> = if *id == default_id {
                primitives
                    .iter()
                    .map(|primitive| PrimitiveSource(primitive.as_ref()))
                    .collect()
            } else {
                Vec::new()
            };
            let on_scale: Vec<&SeriesSource<'_>> = series
                .iter()
                .filter(|source| source.series.options().price_scale_id == id.as_str())
                .collect();
            if let Some(first) = on_scale.first() {
                scale.set_price_format(first.series.options().price_format);
            }
            let sources: Vec<&dyn AutoScaleSource> = on_scale
                .into_iter()
                .map(|source| source as &dyn AutoScaleSource)
                .chain(
                    primitive_sources
                        .iter()
                        .map(|source| source as &dyn AutoScaleSource),
                )
                .collect();
            scale.recalculate_price_range(visible, &sources);
        }
    }
}

impl std::fmt::Debug for Pane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pane")
            .field("stretch_factor", &self.stretch_factor)
            .field("height", &self.height)
            .field("price_scales", &self.price_scales.keys().collect::<Vec<_>>())
            .field("series", &self.series)
            .field("primitives", &self.primitives.len())
            .finish()
    }
}

/// A series together with its rows, seen by a price scale's autoscale pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SeriesSource<'a> {
    pub(crate) series: &'a Series,
    pub(crate) rows: Option<&'a PlotList>,
    pub(crate) visible: StrictRange,
}

impl AutoScaleSource for SeriesSource<'_> {
    fn visible(&self) -> bool {
        self.series.options().visible
    }

    fn first_value(&self) -> Option<f64> {
        self.series.first_value(self.rows?, self.visible)
    }

    fn autoscale_info(&self, visible_bars: StrictRange) -> Option<AutoScaleInfo> {
        self.series.autoscale_info(self.rows?, visible_bars)
    }

    fn min_move(&self) -> f64 {
        self.series.options().price_format.min_move
    }
}

struct PrimitiveSource<'a>(&'a dyn PanePrimitive);

impl AutoScaleSource for PrimitiveSource<'_> {
    fn visible(&self) -> bool {
        true
    }

    fn first_value(&self) -> Option<f64> {
        None
    }

    fn autoscale_info(&self, visible_bars: StrictRange) -> Option<AutoScaleInfo> {
        self.0.autoscale_info(visible_bars)
    }
}

/// Splits `total` between panes by stretch factor. Every pane but the last is
/// rounded to whole pixels; the last one takes the remainder.
#[must_use]
pub fn distribute_pane_heights(stretch_factors: &[f64], total: f64) -> Vec<f64> {
    if stretch_factors.is_empty() {
        return Vec::new();
    }
    let total = if total.is_finite() { total.max(0.0) } else { 0.0 };
    let weights: Vec<f64> = stretch_factors
        .iter()
        .map(|factor| {
            if factor.is_finite() && *factor > 0.0 {
                *factor
            } else {
                0.0
            }
        })
        .collect();
    let mut weight_sum: f64 = weights.iter().sum();
    let weights = if weight_sum > 0.0 {
        weights
    } else {
        weight_sum = weights.len() as f64;
        vec![1.0; weights.len()]
    };

    let last = weights.len() - 1;
    let mut consumed = 0.0;
    let mut heights = Vec::with_capacity(weights.len());
    for (index, weight) in weights.iter().enumerate() {
        let height = if index == last {
            (total - consumed).max(MIN_PANE_HEIGHT)
        } else {
            (weight * total / weight_sum).round().max(MIN_PANE_HEIGHT)
        };
        consumed += height;
        heights.push(height);
    }
    heights
}

fn validate_stretch_factor(stretch_factor: f64) -> ChartResult<()> {
    if !stretch_factor.is_finite() || stretch_factor <= 0.0 {
        return Err(ChartError::InvalidData(
            "pane stretch factor must be finite and > 0".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Pane, distribute_pane_heights};
    use crate::model::{PriceScaleId, PriceScaleOptions};

    #[test]
    fn pane_creates_left_right_price_scales() {
        let pane = Pane::new(PriceScaleOptions::default(), PriceScaleOptions::default());
        assert!(pane.price_scale(&PriceScaleId::left()).is_some());
        assert!(pane.price_scale(&PriceScaleId::right()).is_some());
        assert_eq!(pane.default_price_scale_id(), PriceScaleId::right());
    }

    #[test]
    fn default_scale_falls_back_to_visible_left() {
        let right = PriceScaleOptions {
            visible: false,
            ..PriceScaleOptions::default()
        };
        let left = PriceScaleOptions {
            visible: true,
            ..PriceScaleOptions::default()
        };
        let pane = Pane::new(left, right);
        assert_eq!(pane.default_price_scale_id(), PriceScaleId::left());
    }

    #[test]
    fn overlay_scale_inherits_pane_height() {
        let mut pane = Pane::new(PriceScaleOptions::default(), PriceScaleOptions::default());
        pane.set_height(300.0);
        let overlay = pane.ensure_price_scale(&PriceScaleId::new("volume"), PriceScaleOptions::default());
        assert!((overlay.height() - 300.0).abs() <= f64::EPSILON);
    }

    #[test]
    fn rejects_non_positive_stretch() {
        let mut pane = Pane::new(PriceScaleOptions::default(), PriceScaleOptions::default());
        assert!(pane.set_stretch_factor(0.0).is_err());
        assert!(pane.set_stretch_factor(f64::NAN).is_err());
        assert!(pane.set_stretch_factor(2.0).is_ok());
    }

    #[test]
    fn heights_follow_stretch_and_last_takes_remainder() {
        let heights = distribute_pane_heights(&[1.0, 1.0, 1.0], 100.0);
        assert_eq!(heights, vec![33.0, 33.0, 34.0]);

        let heights = distribute_pane_heights(&[3.0, 1.0], 400.0);
        assert_eq!(heights, vec![300.0, 100.0]);
    }
}
