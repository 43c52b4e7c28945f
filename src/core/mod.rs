pub mod plot_list;
pub mod primitives;
pub mod series;
pub mod tick_weight;
pub mod time_index;
pub mod types;

pub use plot_list::{
    MIN_MAX_CHUNK_SIZE, MinMax, MismatchDirection, PlotList, PlotValue, PointColors, SeriesPoint,
};
pub use series::{
    PriceFormat, ProjectedPoint, Series, SeriesDataItem, SeriesKind, SeriesKindBehavior,
    SeriesOptions, project_rows,
};
pub use tick_weight::{TickMarkType, TickMarkWeight};
pub use time_index::{DataChange, IndexedBar, PreparedItem, TimeIndex};
pub use types::{BusinessDay, Point, SeriesId, Time, TimePoint, TimePointIndex, Viewport};
