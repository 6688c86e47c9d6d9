//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use shophub_core::events::{HookEvent, names};

pub use crate::hooks::definitions::{DEFAULT_PRIORITY, HookContext, HookError};
pub use crate::hooks::dispatcher::HookDispatcher;
pub use crate::registry::{Plugin, PluginHooks, PluginManifest};
pub use crate::schedule::ScheduleDefinition;
