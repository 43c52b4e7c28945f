use thiserror::Error;

use crate::core::SeriesId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// `update` received a time older than the series' current last point.
    #[error("cannot update oldest data: series {series} last time={last_time}, new time={new_time}")]
    OutOfOrderUpdate {
        series: SeriesId,
        last_time: i64,
        new_time: i64,
    },

    #[error("series {series} data must be strictly ascending by time (item {position})")]
    UnorderedData { series: SeriesId, position: usize },

    #[error("invalid price scale margins: top={top}, bottom={bottom}")]
    InvalidScaleMargins { top: f64, bottom: f64 },

    #[error("unknown series: {0}")]
    UnknownSeries(SeriesId),

    #[error("unknown pane index: {0}")]
    UnknownPane(usize),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
