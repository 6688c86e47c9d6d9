//! # shophub-plugin
//!
//! Plugin framework for ShopHub. Provides:
//!
//! - Hook registry with priority-ordered, plugin-owned registrations
//! - Action (fire-and-forget) and filter (value pipeline) dispatch with
//!   per-callback failure isolation
//! - Interval and five-field cron schedule parsing
//! - A schedule runner that invokes plugin handlers when they fall due
//! - Plugin lifecycle management (activate, deactivate)

pub mod hooks;
pub mod manager;
pub mod prelude;
pub mod registry;
pub mod schedule;

pub use hooks::definitions::{DEFAULT_PRIORITY, HookContext, HookError, RegistrationInfo};
pub use hooks::dispatcher::{ActionReport, HookDispatcher};
pub use hooks::registry::HookRegistry;
pub use manager::PluginManager;
pub use registry::{Plugin, PluginHooks, PluginManifest, PluginRegistry};
pub use schedule::{Schedule, ScheduleDefinition, ScheduleError, ScheduleRunner};
