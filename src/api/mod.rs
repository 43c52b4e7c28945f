//! Host-facing chart facade.
//!
//! `ChartEngine` is split across one `impl` block per concern: data, scales,
//! panes, input, crosshair, plugins, layout and the frame loop.

mod axis_scene_builder;
mod chart_presentation;
mod chart_runtime;
mod crosshair_controller;
mod data_controller;
mod engine;
mod engine_config;
mod engine_core;
mod engine_init;
mod engine_snapshot;
mod interaction_controller;
mod interaction_coordinator;
mod invalidation;
mod layout_coordinator;
mod options_controller;
mod pane_controller;
mod pane_scene_coordinator;
mod plugin_dispatch;
mod plugin_registry;
mod price_scale_controller;
mod price_scale_interaction_controller;
mod render_coordinator;
mod scale_access;
mod snapshot_controller;
mod subscriptions;
mod time_scale_controller;
mod time_scale_interaction_controller;

pub use engine::ChartEngine;
pub use engine_config::{
    AxisInteractionOptions, ChartOptions, GridLineOptions, GridOptions, HandleScaleOptions,
    HandleScrollOptions, KineticScrollOptions, LayoutOptions,
};
pub use engine_snapshot::{EngineSnapshot, PaneSnapshot, PriceScaleSnapshot, SeriesSnapshot};
pub use invalidation::{FrameReport, FrameStats};
pub use layout_coordinator::{ChartLayout, PaneLayout};
pub use subscriptions::{MouseEventParams, SeriesDataValue, SubscriptionId};
