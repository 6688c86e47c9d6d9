//! Hook dispatcher: runs registered callbacks in priority order.
//!
//! For actions (`do_action`):
//! - Callbacks are called sequentially in priority order.
//! - Each failure is logged and recorded; the remaining callbacks still run.
//!
//! For filters (`apply_filter`):
//! - Each filter receives the current payload and returns the next one.
//! - A failing filter is handled according to the configured
//!   [`FilterFailurePolicy`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use shophub_core::config::FilterFailurePolicy;
use shophub_core::events::HookEvent;

use super::callback::ErasedPayload;
use super::definitions::{HookContext, HookError};
use super::registry::{HookRegistration, HookRegistry};

/// One callback that failed during a dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackFailure {
    /// Plugin owning the failed callback.
    pub plugin_id: String,
    /// Priority of the failed callback.
    pub priority: i32,
    /// Rendered error.
    pub error: String,
}

/// Outcome of a `do_action` call.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    /// Hook that was dispatched.
    pub hook_name: String,
    /// Correlation ID shared by every callback of this dispatch.
    pub dispatch_id: Uuid,
    /// Number of callbacks invoked.
    pub invoked: usize,
    /// Callbacks that returned an error or panicked.
    pub failures: Vec<CallbackFailure>,
}

impl ActionReport {
    /// Number of callbacks that completed successfully.
    pub fn succeeded(&self) -> usize {
        self.invoked - self.failures.len()
    }

    /// Whether every callback completed successfully.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dispatches hooks to all registered callbacks.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// What `apply_filter` does when a filter fails.
    filter_policy: FilterFailurePolicy,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher with the default filter policy.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self {
            registry,
            filter_policy: FilterFailurePolicy::default(),
        }
    }

    /// Sets the filter failure policy.
    pub fn with_filter_policy(mut self, policy: FilterFailurePolicy) -> Self {
        self.filter_policy = policy;
        self
    }

    /// Returns the active filter failure policy.
    pub fn filter_policy(&self) -> FilterFailurePolicy {
        self.filter_policy
    }

    /// Broadcasts an action to every callback registered for `hook_name`.
    ///
    /// Callbacks run one after another; a callback that fails, panics, or
    /// expects another payload type is logged and skipped. This never fails.
    /// Filter callbacks registered under the same name run as observers and
    /// their output is dropped.
    pub async fn do_action<P>(&self, hook_name: &str, payload: &P) -> ActionReport
    where
        P: Send + Sync + 'static,
    {
        let registrations = self.registry.snapshot(hook_name);
        let dispatch_id = Uuid::new_v4();
        let mut failures = Vec::new();

        if !registrations.is_empty() {
            debug!(
                hook = %hook_name,
                dispatch_id = %dispatch_id,
                handler_count = registrations.len(),
                "Dispatching action"
            );
        }

        for registration in &registrations {
            let ctx = context(registration, hook_name, dispatch_id);

            if let Err(err) = registration.callback.invoke(payload, ctx).await {
                error!(
                    hook = %hook_name,
                    plugin_id = %registration.plugin_id,
                    dispatch_id = %dispatch_id,
                    error = %err,
                    "Action callback failed"
                );
                failures.push(CallbackFailure {
                    plugin_id: registration.plugin_id.clone(),
                    priority: registration.priority,
                    error: err.to_string(),
                });
            }
        }

        ActionReport {
            hook_name: hook_name.to_string(),
            dispatch_id,
            invoked: registrations.len(),
            failures,
        }
    }

    /// Threads `payload` through every callback registered for `hook_name`
    /// and returns the result.
    ///
    /// Action callbacks registered under the same name observe the current
    /// payload without changing it. Errors are only returned under
    /// [`FilterFailurePolicy::Propagate`].
    pub async fn apply_filter<P>(&self, hook_name: &str, payload: P) -> Result<P, HookError>
    where
        P: Send + Sync + 'static,
    {
        let registrations = self.registry.snapshot(hook_name);
        let dispatch_id = Uuid::new_v4();
        let mut current = payload;

        if !registrations.is_empty() {
            debug!(
                hook = %hook_name,
                dispatch_id = %dispatch_id,
                handler_count = registrations.len(),
                policy = ?self.filter_policy,
                "Applying filter"
            );
        }

        for registration in &registrations {
            let ctx = context(registration, hook_name, dispatch_id);

            let outcome = match registration.callback.invoke(&current as &ErasedPayload, ctx).await {
                Ok(None) => Ok(None),
                Ok(Some(next)) => next
                    .downcast::<P>()
                    .map(|next| Some(*next))
                    .map_err(|_| HookError::payload_mismatch::<P>(hook_name)),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(Some(next)) => current = next,
                Ok(None) => {}
                Err(err) => match self.filter_policy {
                    FilterFailurePolicy::Skip => {
                        warn!(
                            hook = %hook_name,
                            plugin_id = %registration.plugin_id,
                            dispatch_id = %dispatch_id,
                            error = %err,
                            "Filter callback failed, keeping previous payload"
                        );
                    }
                    FilterFailurePolicy::Abort => {
                        warn!(
                            hook = %hook_name,
                            plugin_id = %registration.plugin_id,
                            dispatch_id = %dispatch_id,
                            error = %err,
                            "Filter callback failed, stopping chain"
                        );
                        break;
                    }
                    FilterFailurePolicy::Propagate => {
                        error!(
                            hook = %hook_name,
                            plugin_id = %registration.plugin_id,
                            dispatch_id = %dispatch_id,
                            error = %err,
                            "Filter callback failed"
                        );
                        return Err(err);
                    }
                },
            }
        }

        Ok(current)
    }

    /// Broadcasts a typed event as an action.
    pub async fn fire<E: HookEvent>(&self, event: &E) -> ActionReport {
        self.do_action(E::NAME, event).await
    }

    /// Runs a typed event through its filter chain.
    pub async fn filter<E: HookEvent>(&self, event: E) -> Result<E, HookError> {
        self.apply_filter(E::NAME, event).await
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

fn context(registration: &HookRegistration, hook_name: &str, dispatch_id: Uuid) -> HookContext {
    HookContext {
        plugin_id: registration.plugin_id.clone(),
        hook_name: hook_name.to_string(),
        dispatch_id,
    }
}
