//! End-to-end test: the order audit plugin driven through the plugin manager.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use serde_json::json;

use plugin_order_audit::OrderAuditPlugin;
use plugin_order_audit::plugin::{AUDIT_META_KEY, PLUGIN_ID};
use shophub_core::config::AppConfig;
use shophub_core::events::{OrderCreated, OrderResponse, OrderSnapshot, OrderUpdated};
use shophub_plugin::PluginManager;

fn snapshot(id: i64, status: &str) -> OrderSnapshot {
    OrderSnapshot {
        id,
        status: status.to_string(),
        currency: "USD".to_string(),
        total: "120.00".to_string(),
        customer_id: Some(9),
        billing_email: Some("buyer@example.com".to_string()),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_order_audit_lifecycle() {
    let config = AppConfig::from_toml(
        r#"
        [plugins]
        enabled = ["order-audit"]
        "#,
    )
    .unwrap();
    let manager = PluginManager::from_config(&config);
    let plugin = Arc::new(OrderAuditPlugin::new());

    manager.activate(plugin.clone()).await.unwrap();
    assert!(manager.is_active(PLUGIN_ID).await);
    assert_eq!(manager.scheduler().len().await, 2);

    let dispatcher = manager.dispatcher();
    dispatcher
        .fire(&OrderCreated {
            order: snapshot(100, "pending"),
        })
        .await;
    dispatcher
        .fire(&OrderUpdated {
            order: snapshot(100, "processing"),
            changed_fields: vec!["status".to_string()],
        })
        .await;
    assert_eq!(plugin.trail().pending().await, 2);

    let body = dispatcher
        .filter(OrderResponse(json!({ "id": 100, "status": "processing" })))
        .await
        .unwrap();
    assert_eq!(body.0["meta_data"][0]["key"], AUDIT_META_KEY);

    let report = manager
        .scheduler()
        .tick(Utc::now() + TimeDelta::minutes(10))
        .await;
    assert!(report.ran >= 1);
    assert!(report.failures.is_empty());
    assert_eq!(plugin.trail().pending().await, 0);
    assert_eq!(plugin.trail().totals().flushed, 2);

    manager.deactivate(PLUGIN_ID).await.unwrap();
    assert!(!manager.hook_registry().has_hooks("order.created"));
    assert!(manager.scheduler().is_empty().await);
}
