//! Shared hook types: callback context, errors, and registration metadata.

use std::any::Any;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shophub_core::error::AppError;

/// Priority given to registrations that do not ask for one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Context handed to every callback alongside the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookContext {
    /// Plugin that owns the callback being invoked.
    pub plugin_id: String,
    /// Hook being dispatched.
    pub hook_name: String,
    /// Shared by every callback of one dispatch call.
    pub dispatch_id: Uuid,
}

/// Error returned by a hook callback or schedule handler.
#[derive(Debug, Error)]
pub enum HookError {
    /// The callback reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The callback panicked.
    #[error("callback panicked: {0}")]
    Panicked(String),

    /// The dispatched payload is not the type the callback was registered with.
    #[error("hook '{hook}' dispatched a payload the callback does not accept (expected {expected})")]
    PayloadMismatch {
        /// Hook being dispatched.
        hook: String,
        /// Payload type the callback was registered with.
        expected: &'static str,
    },

    /// An application error surfaced from inside the callback.
    #[error(transparent)]
    App(#[from] AppError),
}

impl HookError {
    /// Create a plain failure with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub(crate) fn payload_mismatch<P>(hook: &str) -> Self {
        Self::PayloadMismatch {
            hook: hook.to_string(),
            expected: std::any::type_name::<P>(),
        }
    }

    pub(crate) fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = panic.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

impl From<HookError> for AppError {
    fn from(err: HookError) -> Self {
        match err {
            HookError::App(app) => app,
            other => AppError::plugin(other.to_string()),
        }
    }
}

/// Whether a registration is an action or a filter callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// Fire-and-forget; the callback's result is discarded.
    Action,
    /// Value transformation; the callback returns the next payload.
    Filter,
}

/// Read-only view of one registration, as returned by
/// [`HookRegistry::get_all`](super::registry::HookRegistry::get_all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInfo {
    /// Owning plugin.
    pub plugin_id: String,
    /// Execution priority (lower runs first).
    pub priority: i32,
    /// Action or filter.
    pub kind: HookKind,
    /// Payload type the callback accepts.
    pub payload_type: String,
}
