//! In-memory order audit trail.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use shophub_core::events::order::{OrderCreated, OrderStatusChanged, OrderUpdated};

/// What happened to the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Order was created.
    Created,
    /// Order fields changed.
    Updated,
    /// Order moved to another status.
    StatusChanged,
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Order ID.
    pub order_id: i64,
    /// Kind of change.
    pub action: AuditAction,
    /// Order status after the change.
    pub status: String,
    /// Fields that changed; empty for creations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed_fields: Vec<String>,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl From<&OrderCreated> for AuditEntry {
    fn from(event: &OrderCreated) -> Self {
        Self {
            order_id: event.order.id,
            action: AuditAction::Created,
            status: event.order.status.clone(),
            changed_fields: Vec::new(),
            recorded_at: Utc::now(),
        }
    }
}

impl From<&OrderUpdated> for AuditEntry {
    fn from(event: &OrderUpdated) -> Self {
        Self {
            order_id: event.order.id,
            action: AuditAction::Updated,
            status: event.order.status.clone(),
            changed_fields: event.changed_fields.clone(),
            recorded_at: Utc::now(),
        }
    }
}

impl From<&OrderStatusChanged> for AuditEntry {
    fn from(event: &OrderStatusChanged) -> Self {
        Self {
            order_id: event.order_id,
            action: AuditAction::StatusChanged,
            status: event.to.clone(),
            changed_fields: vec!["status".to_string()],
            recorded_at: Utc::now(),
        }
    }
}

/// Cumulative counters since the plugin was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditTotals {
    /// Orders created.
    pub created: u64,
    /// Orders updated.
    pub updated: u64,
    /// Status transitions.
    pub status_changed: u64,
    /// Entries written out by flushes.
    pub flushed: u64,
}

/// Pending audit entries plus running totals.
#[derive(Debug, Default)]
pub struct AuditTrail {
    pending: Mutex<Vec<AuditEntry>>,
    created: AtomicU64,
    updated: AtomicU64,
    status_changed: AtomicU64,
    flushed: AtomicU64,
}

impl AuditTrail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub async fn record(&self, entry: AuditEntry) {
        let counter = match entry.action {
            AuditAction::Created => &self.created,
            AuditAction::Updated => &self.updated,
            AuditAction::StatusChanged => &self.status_changed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.pending.lock().await.push(entry);
    }

    /// Takes every pending entry, leaving the trail empty.
    pub async fn drain(&self) -> Vec<AuditEntry> {
        let entries = std::mem::take(&mut *self.pending.lock().await);
        self.flushed
            .fetch_add(entries.len() as u64, Ordering::Relaxed);
        entries
    }

    /// Number of entries not yet flushed.
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Cumulative counts since the trail was created.
    pub fn totals(&self) -> AuditTotals {
        AuditTotals {
            created: self.created.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            status_changed: self.status_changed.load(Ordering::Relaxed),
            flushed: self.flushed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use shophub_core::events::order::OrderSnapshot;

    use super::*;

    fn order(id: i64, status: &str) -> OrderSnapshot {
        OrderSnapshot {
            id,
            status: status.to_string(),
            currency: "EUR".to_string(),
            total: "19.90".to_string(),
            customer_id: None,
            billing_email: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_and_drain() {
        let trail = AuditTrail::new();
        trail
            .record(AuditEntry::from(&OrderCreated {
                order: order(1, "pending"),
            }))
            .await;
        trail
            .record(AuditEntry::from(&OrderUpdated {
                order: order(1, "pending"),
                changed_fields: vec!["billing_email".to_string()],
            }))
            .await;

        assert_eq!(trail.pending().await, 2);

        let drained = trail.drain().await;
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].action, AuditAction::Created);
        assert_eq!(drained[1].changed_fields, vec!["billing_email"]);
        assert_eq!(trail.pending().await, 0);

        assert_eq!(
            trail.totals(),
            AuditTotals {
                created: 1,
                updated: 1,
                status_changed: 0,
                flushed: 2,
            }
        );
    }

    #[test]
    fn test_status_change_entry() {
        let entry = AuditEntry::from(&OrderStatusChanged {
            order_id: 7,
            from: "pending".to_string(),
            to: "completed".to_string(),
        });
        assert_eq!(entry.status, "completed");
        assert_eq!(entry.action, AuditAction::StatusChanged);
    }

    #[test]
    fn test_entry_serializes_snake_case() {
        let entry = AuditEntry::from(&OrderCreated {
            order: order(3, "processing"),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "created");
        assert!(json.get("changed_fields").is_none());
    }
}
