//! Host-provided behaviour hooked into the engine.
//!
//! Plugins observe engine events; pane primitives draw into pane layers and
//! take part in autoscale and hit-testing.

pub mod plugins;

pub use plugins::{ChartPlugin, PanePrimitive, PluginContext, PluginEvent, PrimitiveDrawContext};
