//! Schedule runner configuration.

use serde::{Deserialize, Serialize};

/// Plugin schedule runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the schedule runner is started with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between two due-checks of the registered schedules.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            tick_interval_seconds: default_tick_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tick_interval() -> u64 {
    30
}
