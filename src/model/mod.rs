mod chart_model;
mod invalidate_mask;
mod label_cache;
mod pane;
mod price_scale;
mod price_tick_marks;
mod tick_marks;
mod time_scale;

pub use chart_model::ChartModel;
pub use invalidate_mask::{
    InvalidateMask, InvalidationLevel, PaneInvalidation, SCROLL_ANIMATION_DURATION_MS,
    ScrollAnimation, TimeScaleAnimation, TimeScaleInvalidation, TimeScaleInvalidationType,
};
pub use label_cache::TimeLabelCacheStats;
pub use pane::{MIN_PANE_HEIGHT, Pane, distribute_pane_heights};
pub use price_scale::{
    AutoScaleInfo, AutoScaleMargins, AutoScaleSource, PriceRange, PriceScale, PriceScaleId,
    PriceScaleMargins, PriceScaleMode, PriceScaleOptions, PriceScaleState, PriceScaleStateChange,
};
pub use price_tick_marks::{PriceTickMark, price_tick_span, tick_mark_height};
pub use tick_marks::{TickMark, TickMarks};
pub use time_scale::{
    LogicalRange, StrictRange, TickMarkFormatterFn, TimeAxisMark, TimeScale, TimeScaleOptions,
};
