//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Ids of the built-in plugins activated at startup, in activation order.
    #[serde(default)]
    pub enabled: Vec<String>,
}
