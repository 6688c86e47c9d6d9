//! Plugin manager: activation and deactivation of plugins.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use shophub_core::config::AppConfig;
use shophub_core::error::AppError;
use shophub_core::result::AppResult;

use crate::hooks::definitions::HookError;
use crate::hooks::dispatcher::HookDispatcher;
use crate::hooks::registry::HookRegistry;
use crate::registry::{Plugin, PluginHooks, PluginInfo, PluginRegistry};
use crate::schedule::{ScheduleHandler, ScheduleRunner};

/// Adapts a plugin's `run_schedule` to the runner's handler trait.
struct PluginScheduleHandler {
    plugin: Arc<dyn Plugin>,
}

#[async_trait]
impl ScheduleHandler for PluginScheduleHandler {
    async fn run_schedule(&self, schedule_id: &str) -> Result<(), HookError> {
        self.plugin.run_schedule(schedule_id).await
    }
}

/// Manages the lifecycle of plugins: activate, deactivate.
///
/// Activation registers a plugin's hooks and schedules; deactivation removes
/// every registration the plugin owns.
#[derive(Debug)]
pub struct PluginManager {
    /// Active plugins.
    plugin_registry: Arc<PluginRegistry>,
    /// Hook registry.
    hook_registry: Arc<HookRegistry>,
    /// Hook dispatcher.
    hook_dispatcher: Arc<HookDispatcher>,
    /// Schedule runner.
    scheduler: Arc<ScheduleRunner>,
}

impl PluginManager {
    /// Creates a plugin manager with default settings.
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    /// Creates a plugin manager using the hook and scheduler settings.
    pub fn from_config(config: &AppConfig) -> Self {
        let hook_registry = Arc::new(HookRegistry::new());
        let hook_dispatcher = Arc::new(
            HookDispatcher::new(hook_registry.clone())
                .with_filter_policy(config.hooks.filter_failure_policy),
        );
        let scheduler = Arc::new(ScheduleRunner::new(Duration::from_secs(
            config.scheduler.tick_interval_seconds,
        )));

        Self {
            plugin_registry: Arc::new(PluginRegistry::new()),
            hook_registry,
            hook_dispatcher,
            scheduler,
        }
    }

    /// Activates a plugin: validates its schedules, runs `on_activate`, then
    /// registers its hooks and schedules.
    ///
    /// Schedule strings are checked before anything else so that a bad
    /// manifest is reported here rather than when the schedule would run.
    /// Any failure leaves no registration behind.
    pub async fn activate(&self, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        let manifest = plugin.manifest();
        let plugin_id = manifest.id.clone();

        if plugin_id.trim().is_empty() {
            return Err(AppError::validation("Plugin manifest has an empty id"));
        }

        ScheduleRunner::validate(&plugin_id, &manifest.schedules).map_err(|e| {
            error!(plugin_id = %plugin_id, error = %e, "Plugin schedule is invalid");
            AppError::from(e)
        })?;

        self.plugin_registry
            .insert(plugin.clone(), manifest.clone())
            .await?;

        if let Err(e) = plugin.on_activate().await {
            error!(plugin_id = %plugin_id, error = %e, "Plugin activation failed");
            let _ = self.plugin_registry.remove(&plugin_id).await;
            return Err(AppError::plugin(format!(
                "Plugin '{plugin_id}' activation failed: {e}"
            )));
        }

        plugin.register_hooks(&PluginHooks::new(&self.hook_registry, &plugin_id));

        let handler = Arc::new(PluginScheduleHandler {
            plugin: plugin.clone(),
        });
        if let Err(e) = self
            .scheduler
            .register(&plugin_id, &manifest.schedules, handler)
            .await
        {
            error!(plugin_id = %plugin_id, error = %e, "Plugin schedule registration failed");
            self.hook_registry.unregister_plugin(&plugin_id);
            let _ = self.plugin_registry.remove(&plugin_id).await;
            return Err(e.into());
        }

        info!(
            plugin_id = %plugin_id,
            name = %manifest.name,
            version = %manifest.version,
            schedules = manifest.schedules.len(),
            "Plugin activated"
        );

        Ok(())
    }

    /// Deactivates a plugin, removing its hooks and schedules.
    pub async fn deactivate(&self, plugin_id: &str) -> AppResult<()> {
        let plugin = self.plugin_registry.remove(plugin_id).await?;

        let hooks = self.hook_registry.unregister_plugin(plugin_id);
        let schedules = self.scheduler.unregister_plugin(plugin_id).await;

        if let Err(e) = plugin.on_deactivate().await {
            warn!(
                plugin_id = %plugin_id,
                error = %e,
                "Plugin deactivation hook returned error"
            );
        }

        info!(
            plugin_id = %plugin_id,
            hooks = hooks,
            schedules = schedules,
            "Plugin deactivated"
        );

        Ok(())
    }

    /// Deactivates every active plugin.
    pub async fn deactivate_all(&self) {
        let plugins = self.plugin_registry.list().await;

        for info in &plugins {
            if let Err(e) = self.deactivate(&info.manifest.id).await {
                error!(
                    plugin_id = %info.manifest.id,
                    error = %e,
                    "Error deactivating plugin"
                );
            }
        }

        info!(count = plugins.len(), "All plugins deactivated");
    }

    /// Returns whether a plugin is active.
    pub async fn is_active(&self, plugin_id: &str) -> bool {
        self.plugin_registry.contains(plugin_id).await
    }

    /// Lists all active plugins.
    pub async fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugin_registry.list().await
    }

    /// Returns the hook dispatcher for firing hooks.
    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.hook_dispatcher
    }

    /// Returns the hook registry.
    pub fn hook_registry(&self) -> &Arc<HookRegistry> {
        &self.hook_registry
    }

    /// Returns the schedule runner.
    pub fn scheduler(&self) -> &Arc<ScheduleRunner> {
        &self.scheduler
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}
