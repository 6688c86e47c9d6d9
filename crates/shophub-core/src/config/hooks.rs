//! Hook dispatch configuration.

use serde::{Deserialize, Serialize};

/// What a filter chain does when one of its callbacks fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterFailurePolicy {
    /// Log the failure, keep the payload from before the failing filter, and
    /// continue with the next filter.
    #[default]
    Skip,
    /// Log the failure and stop the chain, returning the last good payload.
    Abort,
    /// Stop the chain and return the error to the caller.
    Propagate,
}

/// Hook dispatcher configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookConfig {
    /// Failure policy applied by `apply_filter`.
    #[serde(default)]
    pub filter_failure_policy: FilterFailurePolicy,
}
