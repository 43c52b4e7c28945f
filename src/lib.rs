//! chart-engine: headless core of an interactive financial chart.
//!
//! The crate owns everything between raw series data and drawing calls: a
//! shared time index merging every series, time and price scales with
//! autoscale and log/percentage modes, device-pixel canvas bindings, a
//! coalescing invalidation scheduler and a gesture recognizer with kinetic
//! scrolling. Drawing goes through the `render::Renderer` trait; the host
//! supplies canvases, input events and animation frames.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod model;
pub mod render;
pub mod telemetry;

pub use api::{ChartEngine, ChartOptions};
pub use error::{ChartError, ChartResult};
