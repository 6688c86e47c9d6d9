//! Hook registry: plugins register callbacks by hook name with priority ordering.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, info, warn};

use shophub_core::events::HookEvent;

use super::callback::Callback;
use super::definitions::{HookContext, HookError, RegistrationInfo};

/// Entry in the hook registry.
#[derive(Debug, Clone)]
pub(crate) struct HookRegistration {
    /// Plugin that registered this callback.
    pub(crate) plugin_id: String,
    /// Priority (lower = earlier execution).
    pub(crate) priority: i32,
    /// Registration order, used to break priority ties.
    pub(crate) sequence: u64,
    /// Payload type the callback accepts.
    pub(crate) payload_type: &'static str,
    /// The callback.
    pub(crate) callback: Callback,
}

impl From<&HookRegistration> for RegistrationInfo {
    fn from(reg: &HookRegistration) -> Self {
        Self {
            plugin_id: reg.plugin_id.clone(),
            priority: reg.priority,
            kind: reg.callback.kind(),
            payload_type: reg.payload_type.to_string(),
        }
    }
}

/// Registry of hook callbacks organized by hook name.
///
/// Every per-hook list is kept sorted by `(priority, registration order)`.
/// A hook name with no registrations is absent from the map.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Hook name → sorted list of registrations.
    hooks: DashMap<String, Vec<HookRegistration>>,
    /// Next registration sequence number.
    sequence: AtomicU64,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(
        &self,
        hook_name: &str,
        plugin_id: &str,
        priority: i32,
        payload_type: &'static str,
        callback: Callback,
    ) {
        if hook_name.is_empty() {
            warn!(plugin_id = %plugin_id, "Registering a callback under an empty hook name");
        }

        let kind = callback.kind();
        let registration = HookRegistration {
            plugin_id: plugin_id.to_string(),
            priority,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            payload_type,
            callback,
        };

        {
            let mut entries = self.hooks.entry(hook_name.to_string()).or_default();
            entries.push(registration);
            entries.sort_by_key(|e| (e.priority, e.sequence));
        }

        info!(
            hook = %hook_name,
            plugin_id = %plugin_id,
            priority = priority,
            kind = ?kind,
            "Hook callback registered"
        );
    }

    /// Registers an action callback for a hook name.
    ///
    /// The callback receives a clone of the dispatched payload and the
    /// [`HookContext`]; its result is only used for failure logging.
    pub fn add_action<P, F, Fut>(&self, hook_name: &str, plugin_id: &str, priority: i32, callback: F)
    where
        P: Clone + Send + Sync + 'static,
        F: Fn(P, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.register(
            hook_name,
            plugin_id,
            priority,
            std::any::type_name::<P>(),
            Callback::action(callback),
        );
    }

    /// Registers a filter callback for a hook name.
    ///
    /// The callback receives the current payload and returns its replacement.
    pub fn add_filter<P, F, Fut>(&self, hook_name: &str, plugin_id: &str, priority: i32, callback: F)
    where
        P: Clone + Send + Sync + 'static,
        F: Fn(P, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, HookError>> + Send + 'static,
    {
        self.register(
            hook_name,
            plugin_id,
            priority,
            std::any::type_name::<P>(),
            Callback::filter(callback),
        );
    }

    /// Registers an action callback for a typed event.
    pub fn on_action<E, F, Fut>(&self, plugin_id: &str, priority: i32, callback: F)
    where
        E: HookEvent,
        F: Fn(E, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.add_action::<E, F, Fut>(E::NAME, plugin_id, priority, callback);
    }

    /// Registers a filter callback for a typed event.
    pub fn on_filter<E, F, Fut>(&self, plugin_id: &str, priority: i32, callback: F)
    where
        E: HookEvent,
        F: Fn(E, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<E, HookError>> + Send + 'static,
    {
        self.add_filter::<E, F, Fut>(E::NAME, plugin_id, priority, callback);
    }

    /// Unregisters all callbacks for a specific plugin, across every hook name.
    ///
    /// Returns the number of registrations removed.
    pub fn unregister_plugin(&self, plugin_id: &str) -> usize {
        let mut removed = 0;

        self.hooks.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|e| e.plugin_id != plugin_id);
            removed += before - entries.len();
            !entries.is_empty()
        });

        info!(plugin_id = %plugin_id, removed = removed, "All hooks unregistered for plugin");
        removed
    }

    /// Returns whether any callbacks are registered for a hook name.
    pub fn has_hooks(&self, hook_name: &str) -> bool {
        self.hooks
            .get(hook_name)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    /// Returns the number of callbacks registered for a hook name.
    pub fn handler_count(&self, hook_name: &str) -> usize {
        self.hooks.get(hook_name).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns every hook name with at least one registration, sorted.
    pub fn hook_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hooks.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Returns a read-only snapshot of every registration, in execution order.
    pub fn get_all(&self) -> BTreeMap<String, Vec<RegistrationInfo>> {
        self.hooks
            .iter()
            .map(|e| {
                let infos = e.value().iter().map(RegistrationInfo::from).collect();
                (e.key().clone(), infos)
            })
            .collect()
    }

    /// Removes every registration.
    pub fn clear(&self) {
        self.hooks.clear();
        debug!("Hook registry cleared");
    }

    /// Clones the ordered registrations for one hook name.
    ///
    /// Dispatch iterates over this copy, so registrations added or removed
    /// while a dispatch is running do not affect it.
    pub(crate) fn snapshot(&self, hook_name: &str) -> Vec<HookRegistration> {
        self.hooks
            .get(hook_name)
            .map(|entries| entries.value().clone())
            .unwrap_or_default()
    }
}
