//! Product-related hook payloads.

use serde::{Deserialize, Serialize};

use super::{HookEvent, names};

/// Fired after a product is updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdated {
    /// The product ID.
    pub product_id: i64,
    /// Names of the fields that changed.
    pub changed_fields: Vec<String>,
    /// Stock quantity after the update, when stock is managed.
    pub stock_quantity: Option<i64>,
}

impl HookEvent for ProductUpdated {
    const NAME: &'static str = names::PRODUCT_UPDATED;
}
