//! Well-known hook names and their typed payloads.
//!
//! Business services announce these events through the hook dispatcher;
//! plugins subscribe to them by type so that callback signatures are
//! checked against the payload they receive.

pub mod customer;
pub mod order;
pub mod product;
pub mod subscription;

pub use customer::CustomerCreated;
pub use order::{
    OrderCreated, OrderDeleted, OrderResponse, OrderSnapshot, OrderStatusChanged, OrderUpdated,
};
pub use product::ProductUpdated;
pub use subscription::{SubscriptionCancelled, SubscriptionCreated, SubscriptionRenewed};

/// A payload type bound to one hook name.
///
/// The dispatcher stores callbacks type-erased; implementing this trait
/// lets a subscriber name the payload type once and have the hook name
/// follow from it.
pub trait HookEvent: Clone + Send + Sync + 'static {
    /// Dotted `resource.event` hook name.
    const NAME: &'static str;
}

/// Hook name constants.
pub mod names {
    /// An order was created.
    pub const ORDER_CREATED: &str = "order.created";
    /// An order was updated.
    pub const ORDER_UPDATED: &str = "order.updated";
    /// An order was deleted or trashed.
    pub const ORDER_DELETED: &str = "order.deleted";
    /// An order moved from one status to another.
    pub const ORDER_STATUS_CHANGED: &str = "order.status_changed";
    /// Filter applied to an order's REST representation before it is returned.
    pub const ORDER_RESPONSE: &str = "order.response";
    /// A subscription was created.
    pub const SUBSCRIPTION_CREATED: &str = "subscription.created";
    /// A subscription produced a renewal order.
    pub const SUBSCRIPTION_RENEWED: &str = "subscription.renewed";
    /// A subscription was cancelled.
    pub const SUBSCRIPTION_CANCELLED: &str = "subscription.cancelled";
    /// A customer account was created.
    pub const CUSTOMER_CREATED: &str = "customer.created";
    /// A product was updated.
    pub const PRODUCT_UPDATED: &str = "product.updated";
}
