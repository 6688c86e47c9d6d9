//! Hook system: registry, dispatcher, and type-erased callbacks.

pub(crate) mod callback;
pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{DEFAULT_PRIORITY, HookContext, HookError, HookKind, RegistrationInfo};
pub use dispatcher::{ActionReport, CallbackFailure, HookDispatcher};
pub use registry::HookRegistry;
