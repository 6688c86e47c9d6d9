//! Plugin registry: the `Plugin` trait, manifests, and the set of active plugins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use shophub_core::error::AppError;
use shophub_core::events::HookEvent;

use crate::hooks::definitions::{HookContext, HookError};
use crate::hooks::registry::HookRegistry;
use crate::schedule::ScheduleDefinition;

/// Static description of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin identifier.
    pub id: String,
    /// Human-readable plugin name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Plugin description.
    #[serde(default)]
    pub description: String,
    /// Scheduled jobs, run through [`Plugin::run_schedule`].
    #[serde(default)]
    pub schedules: Vec<ScheduleDefinition>,
}

/// Trait that all plugins must implement.
#[async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Returns plugin metadata and schedule declarations.
    fn manifest(&self) -> PluginManifest;

    /// Registers the plugin's hook callbacks.
    ///
    /// Called once per activation, after `on_activate` succeeds.
    fn register_hooks(&self, hooks: &PluginHooks<'_>);

    /// Called when the plugin is activated, before any hook is registered.
    async fn on_activate(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Called after the plugin's hooks and schedules have been removed.
    async fn on_deactivate(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs the schedule declared under `schedule_id` in the manifest.
    async fn run_schedule(&self, schedule_id: &str) -> Result<(), HookError> {
        Err(HookError::failed(format!(
            "plugin declares no handler for schedule '{schedule_id}'"
        )))
    }
}

/// Hook registrar scoped to one plugin.
///
/// Every callback registered through it is owned by that plugin and is
/// removed when the plugin is deactivated.
#[derive(Debug)]
pub struct PluginHooks<'a> {
    registry: &'a HookRegistry,
    plugin_id: &'a str,
}

impl<'a> PluginHooks<'a> {
    /// Creates a registrar for `plugin_id`.
    pub fn new(registry: &'a HookRegistry, plugin_id: &'a str) -> Self {
        Self {
            registry,
            plugin_id,
        }
    }

    /// The plugin that owns registrations made through this registrar.
    pub fn plugin_id(&self) -> &str {
        self.plugin_id
    }

    /// Registers an action callback under a hook name.
    pub fn add_action<P, F, Fut>(&self, hook_name: &str, priority: i32, callback: F)
    where
        P: Clone + Send + Sync + 'static,
        F: Fn(P, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.registry
            .add_action::<P, F, Fut>(hook_name, self.plugin_id, priority, callback);
    }

    /// Registers a filter callback under a hook name.
    pub fn add_filter<P, F, Fut>(&self, hook_name: &str, priority: i32, callback: F)
    where
        P: Clone + Send + Sync + 'static,
        F: Fn(P, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, HookError>> + Send + 'static,
    {
        self.registry
            .add_filter::<P, F, Fut>(hook_name, self.plugin_id, priority, callback);
    }

    /// Registers an action callback for a typed event.
    pub fn on_action<E, F, Fut>(&self, priority: i32, callback: F)
    where
        E: HookEvent,
        F: Fn(E, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.registry
            .on_action::<E, F, Fut>(self.plugin_id, priority, callback);
    }

    /// Registers a filter callback for a typed event.
    pub fn on_filter<E, F, Fut>(&self, priority: i32, callback: F)
    where
        E: HookEvent,
        F: Fn(E, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<E, HookError>> + Send + 'static,
    {
        self.registry
            .on_filter::<E, F, Fut>(self.plugin_id, priority, callback);
    }
}

/// An activated plugin.
#[derive(Debug, Clone)]
struct ActivePlugin {
    plugin: Arc<dyn Plugin>,
    manifest: PluginManifest,
    activated_at: DateTime<Utc>,
}

/// Metadata about an active plugin.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    /// Manifest the plugin was activated with.
    #[serde(flatten)]
    pub manifest: PluginManifest,
    /// When the plugin was activated.
    pub activated_at: DateTime<Utc>,
}

/// Registry of all active plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    /// Plugin ID → active plugin.
    plugins: RwLock<HashMap<String, ActivePlugin>>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under its manifest id.
    pub async fn insert(
        &self,
        plugin: Arc<dyn Plugin>,
        manifest: PluginManifest,
    ) -> Result<(), AppError> {
        let mut plugins = self.plugins.write().await;

        if plugins.contains_key(&manifest.id) {
            return Err(AppError::conflict(format!(
                "Plugin '{}' is already active",
                manifest.id
            )));
        }

        info!(plugin_id = %manifest.id, name = %manifest.name, version = %manifest.version, "Registering plugin");

        plugins.insert(
            manifest.id.clone(),
            ActivePlugin {
                plugin,
                manifest,
                activated_at: Utc::now(),
            },
        );

        Ok(())
    }

    /// Removes a plugin by ID, returning it.
    pub async fn remove(&self, plugin_id: &str) -> Result<Arc<dyn Plugin>, AppError> {
        let mut plugins = self.plugins.write().await;

        plugins
            .remove(plugin_id)
            .map(|active| active.plugin)
            .ok_or_else(|| AppError::not_found(format!("Plugin '{plugin_id}' is not active")))
    }

    /// Gets a plugin by ID.
    pub async fn get(&self, plugin_id: &str) -> Option<Arc<dyn Plugin>> {
        let plugins = self.plugins.read().await;
        plugins.get(plugin_id).map(|active| active.plugin.clone())
    }

    /// Lists all active plugins, sorted by id.
    pub async fn list(&self) -> Vec<PluginInfo> {
        let plugins = self.plugins.read().await;
        let mut infos: Vec<PluginInfo> = plugins
            .values()
            .map(|active| PluginInfo {
                manifest: active.manifest.clone(),
                activated_at: active.activated_at,
            })
            .collect();
        infos.sort_by(|a, b| a.manifest.id.cmp(&b.manifest.id));
        infos
    }

    /// Returns plugin count.
    pub async fn count(&self) -> usize {
        let plugins = self.plugins.read().await;
        plugins.len()
    }

    /// Checks whether a plugin is active.
    pub async fn contains(&self, plugin_id: &str) -> bool {
        let plugins = self.plugins.read().await;
        plugins.contains_key(plugin_id)
    }
}
