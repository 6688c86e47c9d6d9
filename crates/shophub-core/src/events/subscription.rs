//! Subscription-related hook payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HookEvent, names};

/// Fired after a subscription is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionCreated {
    /// The subscription ID.
    pub subscription_id: i64,
    /// The order that started the subscription.
    pub parent_order_id: Option<i64>,
    /// Billing period (`day`, `week`, `month`, `year`).
    pub billing_period: String,
    /// Number of periods between renewals.
    pub billing_interval: u32,
    /// First scheduled renewal.
    pub next_payment_at: Option<DateTime<Utc>>,
}

/// Fired after a renewal order is generated for a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRenewed {
    /// The subscription ID.
    pub subscription_id: i64,
    /// The renewal order.
    pub renewal_order_id: i64,
}

/// Fired after a subscription is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionCancelled {
    /// The subscription ID.
    pub subscription_id: i64,
    /// Optional cancellation reason.
    pub reason: Option<String>,
}

impl HookEvent for SubscriptionCreated {
    const NAME: &'static str = names::SUBSCRIPTION_CREATED;
}

impl HookEvent for SubscriptionRenewed {
    const NAME: &'static str = names::SUBSCRIPTION_RENEWED;
}

impl HookEvent for SubscriptionCancelled {
    const NAME: &'static str = names::SUBSCRIPTION_CANCELLED;
}
