//! Order audit plugin for ShopHub.
//!
//! Records order lifecycle events into an in-memory audit trail, tags order
//! responses with an audit marker, and periodically flushes the trail to the
//! log.

pub mod audit;
pub mod plugin;

pub use audit::{AuditAction, AuditEntry, AuditTotals, AuditTrail};
pub use plugin::OrderAuditPlugin;
