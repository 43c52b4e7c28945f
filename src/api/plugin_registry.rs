use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::extensions::ChartPlugin;
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Registers an event observer; ids must be unique and non-empty.
    pub fn register_plugin(&mut self, plugin: Box<dyn ChartPlugin>) -> ChartResult<()> {
        let plugin_id = plugin.id().to_owned();
        if plugin_id.is_empty() {
            return Err(ChartError::InvalidData(
                "plugin id must not be empty".to_owned(),
            ));
        }
        if self.has_plugin(&plugin_id) {
            return Err(ChartError::InvalidData(format!(
                "plugin with id `{plugin_id}` is already registered"
            )));
        }
        debug!(plugin = %plugin_id, "plugin registered");
        self.core.runtime.plugins.push(plugin);
        Ok(())
    }

    /// Returns `true` when a plugin was removed.
    pub fn unregister_plugin(&mut self, plugin_id: &str) -> bool {
        let plugins = &mut self.core.runtime.plugins;
        let before = plugins.len();
        plugins.retain(|plugin| plugin.id() != plugin_id);
        before != plugins.len()
    }

    #[must_use]
    pub fn plugin_count(&self) -> usize {
        self.core.runtime.plugins.len()
    }

    #[must_use]
    pub fn has_plugin(&self, plugin_id: &str) -> bool {
        self.core
            .runtime
            .plugins
            .iter()
            .any(|plugin| plugin.id() == plugin_id)
    }
}
