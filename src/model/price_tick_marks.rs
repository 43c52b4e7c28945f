use serde::{Deserialize, Serialize};

const TICK_SPAN_EPSILON: f64 = 1e-14;

/// One price-axis label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTickMark {
    pub coordinate: f64,
    pub logical: f64,
    pub label: String,
}

/// Chooses a "nice" tick step for one divider sequence.
#[derive(Debug, Clone)]
pub(crate) struct PriceTickSpanCalculator {
    base: f64,
    integral_dividers: &'static [f64],
    fractional_dividers: Vec<f64>,
}

impl PriceTickSpanCalculator {
    pub(crate) fn new(base: f64, integral_dividers: &'static [f64]) -> Self {
        Self {
            base,
            integral_dividers,
            fractional_dividers: fractional_dividers(base),
        }
    }

    pub(crate) fn tick_span(&self, high: f64, low: f64, max_tick_span: f64) -> f64 {
        let min_movement = if self.base == 0.0 { 0.0 } else { 1.0 / self.base };

        let mut span = 10f64.powf((high - low).log10().ceil().max(0.0));
        let mut index = 0usize;
        let mut divider = self.integral_dividers[0];

        loop {
            let above_min_movement = greater_or_equal(span, min_movement)
                && span > min_movement + TICK_SPAN_EPSILON;
            let above_max_span = greater_or_equal(span, max_tick_span * divider);
            let above_one = greater_or_equal(span, 1.0);
            if !(above_min_movement && above_max_span && above_one) {
                break;
            }
            span /= divider;
            index += 1;
            divider = self.integral_dividers[index % self.integral_dividers.len()];
        }

        if span <= min_movement + TICK_SPAN_EPSILON {
            span = min_movement;
        }
        span = span.max(1.0);

        if !self.fractional_dividers.is_empty() && (span - 1.0).abs() < TICK_SPAN_EPSILON {
            index = 0;
            divider = self.fractional_dividers[0];
            while greater_or_equal(span, max_tick_span * divider)
                && span > min_movement + TICK_SPAN_EPSILON
            {
                span /= divider;
                index += 1;
                divider = self.fractional_dividers[index % self.fractional_dividers.len()];
            }
        }
        span
    }
}

fn greater_or_equal(left: f64, right: f64) -> bool {
    left - right > -TICK_SPAN_EPSILON
}

fn fractional_dividers(base: f64) -> Vec<f64> {
    if base <= 0.0 || !base.is_finite() {
        return Vec::new();
    }
    let power = base.log10();
    if (power - power.round()).abs() < 1e-9 {
        return vec![2.0, 2.5, 2.0];
    }
    let mut dividers = Vec::new();
    let mut rest = base.round() as u64;
    while rest > 1 && dividers.len() < 100 {
        if rest % 2 == 0 {
            dividers.push(2.0);
            rest /= 2;
        } else if rest % 5 == 0 {
            dividers.extend([2.0, 2.5]);
            rest /= 5;
        } else {
            // Bases with other prime factors fall back to integral steps only.
            return Vec::new();
        }
    }
    dividers
}

const DIVIDER_SEQUENCES: [&[f64]; 3] = [&[2.0, 2.5, 2.0], &[2.0, 2.0, 2.5], &[2.5, 2.0, 2.0]];

/// Minimum pixel distance between two price labels.
#[must_use]
pub fn tick_mark_height(font_size: f64) -> f64 {
    (2.5 * font_size).ceil()
}

/// Smallest span produced by any divider sequence for `[low, high]` drawn
/// over `height` pixels.
#[must_use]
pub fn price_tick_span(high: f64, low: f64, height: f64, font_size: f64, min_move: f64) -> f64 {
    if height <= 0.0 || high <= low {
        return 0.0;
    }
    let base = if min_move > 0.0 { 1.0 / min_move } else { 0.0 };
    let max_tick_span = (high - low) * tick_mark_height(font_size) / height;
    DIVIDER_SEQUENCES
        .iter()
        .map(|dividers| PriceTickSpanCalculator::new(base, dividers).tick_span(high, low, max_tick_span))
        .fold(f64::INFINITY, f64::min)
}

/// Walks from `high` down to `low`, emitting marks at least one tick height
/// apart that project inside `[min_coordinate, max_coordinate]`.
///
/// `respan` returns the span to use below a given value; log scales shrink
/// the step as prices get smaller.
pub(crate) fn walk_price_ticks(
    high: f64,
    low: f64,
    initial_span: f64,
    font_size: f64,
    bounds: (f64, f64),
    to_coordinate: impl Fn(f64) -> f64,
    respan: Option<&dyn Fn(f64) -> f64>,
) -> Vec<(f64, f64)> {
    let mut span = initial_span;
    if !(span.is_finite() && span > 0.0) {
        return Vec::new();
    }
    let min_distance = tick_mark_height(font_size);
    let (min_coordinate, max_coordinate) = bounds;
    let mut marks = Vec::new();
    let mut modulo = high % span;
    if modulo < 0.0 {
        modulo += span;
    }
    let mut value = high - modulo;
    let mut previous: Option<f64> = None;
    while value > low {
        let coordinate = to_coordinate(value);
        let too_close = previous.is_some_and(|prev| (coordinate - prev).abs() < min_distance);
        if !too_close && coordinate >= min_coordinate && coordinate <= max_coordinate {
            marks.push((value, coordinate));
            previous = Some(coordinate);
        }
        if let Some(respan) = respan {
            let next = respan(value);
            if next.is_finite() && next > 0.0 {
                span = next;
            }
        }
        value -= span;
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::{PriceTickSpanCalculator, fractional_dividers, price_tick_span, walk_price_ticks};

    #[test]
    fn power_of_ten_base_uses_decimal_fractions() {
        assert_eq!(fractional_dividers(100.0), vec![2.0, 2.5, 2.0]);
        assert_eq!(fractional_dividers(4.0), vec![2.0, 2.0]);
        assert!(fractional_dividers(3.0).is_empty());
    }

    #[test]
    fn span_for_hundred_unit_range_is_round() {
        // 100 units over 500px with 30px labels: max span 6
        let span = price_tick_span(200.0, 100.0, 500.0, 12.0, 0.01);
        assert!((span - 10.0).abs() <= 1e-9);
    }

    #[test]
    fn span_never_drops_below_min_move() {
        let calculator = PriceTickSpanCalculator::new(100.0, &[2.0, 2.5, 2.0]);
        let span = calculator.tick_span(1.001, 1.0, 0.000_01);
        assert!(span >= 0.01 - 1e-12);
    }

    #[test]
    fn walk_emits_descending_values_inside_bounds() {
        let to_coordinate = |value: f64| (200.0 - value) * 5.0;
        let marks = walk_price_ticks(200.0, 100.0, 10.0, 12.0, (0.0, 499.0), to_coordinate, None);
        let values: Vec<f64> = marks.iter().map(|(value, _)| *value).collect();
        assert_eq!(values.first().copied(), Some(200.0));
        assert!(values.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(values.len(), 10);
    }
}
