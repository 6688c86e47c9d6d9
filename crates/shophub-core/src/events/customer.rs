//! Customer-related hook payloads.

use serde::{Deserialize, Serialize};

use super::{HookEvent, names};

/// Fired after a customer account is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerCreated {
    /// The customer ID.
    pub customer_id: i64,
    /// The customer's e-mail address.
    pub email: String,
}

impl HookEvent for CustomerCreated {
    const NAME: &'static str = names::CUSTOMER_CREATED;
}
