//! Integration tests for the well-known typed hook events.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use shophub_core::HookEvent;
use shophub_core::events::{
    CustomerCreated, OrderDeleted, ProductUpdated, SubscriptionCancelled, SubscriptionCreated,
    SubscriptionRenewed, names,
};
use shophub_plugin::{HookDispatcher, HookRegistry};

/// Subscribes to `E` and returns the payloads it receives.
fn capture<E: HookEvent>(registry: &HookRegistry) -> Arc<Mutex<Vec<E>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    registry.on_action::<E, _, _>("listener", 10, move |event: E, ctx| {
        let sink = sink.clone();
        async move {
            assert_eq!(ctx.hook_name, E::NAME);
            sink.lock().unwrap().push(event);
            Ok(())
        }
    });
    seen
}

#[test]
fn test_event_names() {
    assert_eq!(OrderDeleted::NAME, names::ORDER_DELETED);
    assert_eq!(SubscriptionCreated::NAME, "subscription.created");
    assert_eq!(SubscriptionRenewed::NAME, "subscription.renewed");
    assert_eq!(SubscriptionCancelled::NAME, "subscription.cancelled");
    assert_eq!(CustomerCreated::NAME, "customer.created");
    assert_eq!(ProductUpdated::NAME, "product.updated");
}

#[tokio::test]
async fn test_typed_events_reach_their_subscribers() {
    let registry = Arc::new(HookRegistry::new());
    let dispatcher = HookDispatcher::new(registry.clone());

    let created = capture::<SubscriptionCreated>(&registry);
    let renewed = capture::<SubscriptionRenewed>(&registry);
    let cancelled = capture::<SubscriptionCancelled>(&registry);
    let customers = capture::<CustomerCreated>(&registry);
    let products = capture::<ProductUpdated>(&registry);
    let deleted = capture::<OrderDeleted>(&registry);

    let subscription = SubscriptionCreated {
        subscription_id: 40,
        parent_order_id: Some(39),
        billing_period: "month".to_string(),
        billing_interval: 1,
        next_payment_at: Some(Utc::now()),
    };
    let renewal = SubscriptionRenewed {
        subscription_id: 40,
        renewal_order_id: 77,
    };

    assert!(dispatcher.fire(&subscription).await.is_clean());
    assert!(dispatcher.fire(&renewal).await.is_clean());
    dispatcher
        .fire(&SubscriptionCancelled {
            subscription_id: 40,
            reason: Some("customer request".to_string()),
        })
        .await;
    dispatcher
        .fire(&CustomerCreated {
            customer_id: 5,
            email: "new@example.com".to_string(),
        })
        .await;
    dispatcher
        .fire(&ProductUpdated {
            product_id: 12,
            changed_fields: vec!["stock_quantity".to_string()],
            stock_quantity: Some(3),
        })
        .await;
    dispatcher
        .fire(&OrderDeleted {
            order_id: 100,
            force: false,
        })
        .await;

    assert_eq!(*created.lock().unwrap(), vec![subscription]);
    assert_eq!(*renewed.lock().unwrap(), vec![renewal]);
    assert_eq!(cancelled.lock().unwrap().len(), 1);
    assert_eq!(customers.lock().unwrap()[0].customer_id, 5);
    assert_eq!(products.lock().unwrap()[0].stock_quantity, Some(3));
    assert!(!deleted.lock().unwrap()[0].force);
}

#[test]
fn test_events_serialize_field_names() {
    let json = serde_json::to_value(SubscriptionRenewed {
        subscription_id: 1,
        renewal_order_id: 2,
    })
    .unwrap();
    assert_eq!(json["renewal_order_id"], 2);

    let product: ProductUpdated = serde_json::from_str(
        r#"{"product_id": 9, "changed_fields": ["price"], "stock_quantity": null}"#,
    )
    .unwrap();
    assert_eq!(product.stock_quantity, None);
}
