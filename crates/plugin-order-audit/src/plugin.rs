//! Order audit plugin implementation: registers with the ShopHub plugin system.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info};

use shophub_core::events::{OrderCreated, OrderResponse, OrderStatusChanged, OrderUpdated};
use shophub_plugin::prelude::*;

use crate::audit::{AuditEntry, AuditTrail};

/// Plugin id used in configuration and registrations.
pub const PLUGIN_ID: &str = "order-audit";

/// Schedule that drains the trail into the log.
pub const FLUSH_SCHEDULE: &str = "flush";

/// Schedule that logs cumulative totals once a day.
pub const DIGEST_SCHEDULE: &str = "daily_digest";

/// Meta key added to order responses.
pub const AUDIT_META_KEY: &str = "_order_audit";

/// Order audit plugin for ShopHub
#[derive(Debug, Default)]
pub struct OrderAuditPlugin {
    trail: Arc<AuditTrail>,
}

impl OrderAuditPlugin {
    /// Create a new order audit plugin
    pub fn new() -> Self {
        Self::default()
    }

    /// The audit trail fed by this plugin's hooks.
    pub fn trail(&self) -> &Arc<AuditTrail> {
        &self.trail
    }

    async fn flush(&self) {
        let entries = self.trail.drain().await;
        if entries.is_empty() {
            debug!(plugin_id = PLUGIN_ID, "Audit trail empty, nothing to flush");
            return;
        }

        for entry in &entries {
            info!(
                plugin_id = PLUGIN_ID,
                order_id = entry.order_id,
                action = ?entry.action,
                status = %entry.status,
                changed_fields = ?entry.changed_fields,
                recorded_at = %entry.recorded_at,
                "Order audit entry"
            );
        }
        info!(plugin_id = PLUGIN_ID, count = entries.len(), "Audit trail flushed");
    }

    async fn digest(&self) {
        let totals = self.trail.totals();
        let pending = self.trail.pending().await;
        info!(
            plugin_id = PLUGIN_ID,
            created = totals.created,
            updated = totals.updated,
            status_changed = totals.status_changed,
            flushed = totals.flushed,
            pending = pending,
            "Daily order audit digest"
        );
    }
}

/// Adds the audit marker to the response's `meta_data` list.
///
/// Bodies that are not objects, or whose `meta_data` is not a list, pass
/// through untouched.
fn tag_response(mut response: OrderResponse) -> OrderResponse {
    if let Value::Object(body) = &mut response.0 {
        let meta = body
            .entry("meta_data")
            .or_insert_with(|| Value::Array(Vec::new()));

        if let Value::Array(items) = meta {
            let already_tagged = items
                .iter()
                .any(|item| item.get("key").and_then(Value::as_str) == Some(AUDIT_META_KEY));
            if !already_tagged {
                items.push(json!({
                    "key": AUDIT_META_KEY,
                    "value": { "plugin": PLUGIN_ID, "audited_at": Utc::now() },
                }));
            }
        }
    }

    response
}

#[async_trait]
impl Plugin for OrderAuditPlugin {
    fn manifest(&self) -> PluginManifest {
        PluginManifest {
            id: PLUGIN_ID.to_string(),
            name: "Order Audit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Keeps an audit trail of order changes".to_string(),
            schedules: vec![
                ScheduleDefinition::new(FLUSH_SCHEDULE, "5m", "Write pending audit entries to the log"),
                ScheduleDefinition::new(DIGEST_SCHEDULE, "0 6 * * *", "Log daily audit totals"),
            ],
        }
    }

    fn register_hooks(&self, hooks: &PluginHooks<'_>) {
        let trail = self.trail.clone();
        hooks.on_action(DEFAULT_PRIORITY, move |event: OrderCreated, _ctx| {
            let trail = trail.clone();
            async move {
                trail.record(AuditEntry::from(&event)).await;
                Ok(())
            }
        });

        let trail = self.trail.clone();
        hooks.on_action(DEFAULT_PRIORITY, move |event: OrderUpdated, _ctx| {
            let trail = trail.clone();
            async move {
                trail.record(AuditEntry::from(&event)).await;
                Ok(())
            }
        });

        let trail = self.trail.clone();
        hooks.on_action(DEFAULT_PRIORITY, move |event: OrderStatusChanged, _ctx| {
            let trail = trail.clone();
            async move {
                trail.record(AuditEntry::from(&event)).await;
                Ok(())
            }
        });

        // Late so that earlier filters have shaped the body.
        hooks.on_filter(100, |response: OrderResponse, _ctx| async move {
            Ok(tag_response(response))
        });

        info!(
            plugin_id = PLUGIN_ID,
            "Order audit hooks registered: order.created, order.updated, order.status_changed, order.response"
        );
    }

    async fn on_deactivate(&self) -> Result<(), HookError> {
        self.flush().await;
        Ok(())
    }

    async fn run_schedule(&self, schedule_id: &str) -> Result<(), HookError> {
        match schedule_id {
            FLUSH_SCHEDULE => self.flush().await,
            DIGEST_SCHEDULE => self.digest().await,
            other => {
                return Err(HookError::failed(format!(
                    "unknown order audit schedule '{other}'"
                )));
            }
        }
        Ok(())
    }
}
