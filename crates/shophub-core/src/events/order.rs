//! Order-related hook payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HookEvent, names};

/// The subset of an order that hook subscribers see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// Order ID.
    pub id: i64,
    /// Order status slug (`pending`, `processing`, `completed`, ...).
    pub status: String,
    /// ISO currency code.
    pub currency: String,
    /// Grand total as a decimal string, as WooCommerce serializes it.
    pub total: String,
    /// Owning customer, if the order was not placed as a guest.
    pub customer_id: Option<i64>,
    /// Billing e-mail address.
    pub billing_email: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

/// Fired after an order is persisted for the first time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    /// The new order.
    pub order: OrderSnapshot,
}

/// Fired after an existing order is modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdated {
    /// The order after the update.
    pub order: OrderSnapshot,
    /// Names of the fields that changed.
    pub changed_fields: Vec<String>,
}

/// Fired after an order is deleted or moved to the trash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDeleted {
    /// The order ID.
    pub order_id: i64,
    /// Whether the order was permanently deleted rather than trashed.
    pub force: bool,
}

/// Fired when an order moves between statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    /// The order ID.
    pub order_id: i64,
    /// Previous status slug.
    pub from: String,
    /// New status slug.
    pub to: String,
}

/// Filter payload: the JSON body of an order response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderResponse(pub serde_json::Value);

impl HookEvent for OrderCreated {
    const NAME: &'static str = names::ORDER_CREATED;
}

impl HookEvent for OrderUpdated {
    const NAME: &'static str = names::ORDER_UPDATED;
}

impl HookEvent for OrderDeleted {
    const NAME: &'static str = names::ORDER_DELETED;
}

impl HookEvent for OrderStatusChanged {
    const NAME: &'static str = names::ORDER_STATUS_CHANGED;
}

impl HookEvent for OrderResponse {
    const NAME: &'static str = names::ORDER_RESPONSE;
}
