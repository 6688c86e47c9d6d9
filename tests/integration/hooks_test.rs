//! Integration tests for hook registration and dispatch through the public API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use shophub_core::config::FilterFailurePolicy;
use shophub_plugin::{HookDispatcher, HookError, HookRegistry};

fn setup() -> (Arc<HookRegistry>, HookDispatcher) {
    let registry = Arc::new(HookRegistry::new());
    let dispatcher = HookDispatcher::new(registry.clone());
    (registry, dispatcher)
}

fn recorder(
    registry: &HookRegistry,
    log: &Arc<Mutex<Vec<&'static str>>>,
    hook: &str,
    plugin: &str,
    priority: i32,
    label: &'static str,
) {
    let log = log.clone();
    registry.add_action(hook, plugin, priority, move |_p: u32, _ctx| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(label);
            Ok(())
        }
    });
}

#[tokio::test]
async fn test_actions_run_in_ascending_priority() {
    let (registry, dispatcher) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));

    recorder(&registry, &log, "order.created", "p1", 30, "cb1");
    recorder(&registry, &log, "order.created", "p2", 10, "cb2");
    recorder(&registry, &log, "order.created", "p3", 20, "cb3");

    let report = dispatcher.do_action("order.created", &1_u32).await;

    assert_eq!(report.invoked, 3);
    assert_eq!(*log.lock().unwrap(), vec!["cb2", "cb3", "cb1"]);
}

#[tokio::test]
async fn test_equal_priority_keeps_registration_order() {
    let (registry, dispatcher) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));

    recorder(&registry, &log, "order.created", "p1", 10, "first");
    recorder(&registry, &log, "order.created", "p2", 10, "second");
    recorder(&registry, &log, "order.created", "p1", 10, "third");

    dispatcher.do_action("order.created", &1_u32).await;

    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_filter_pipeline_composes() {
    let (registry, dispatcher) = setup();

    registry.add_filter("order.total", "p1", 20, |v: Value, _ctx| async move {
        Ok(json!({ "value": v["value"].as_i64().unwrap_or_default() * 2 }))
    });
    registry.add_filter("order.total", "p2", 10, |v: Value, _ctx| async move {
        Ok(json!({ "value": v["value"].as_i64().unwrap_or_default() + 1 }))
    });

    let result = dispatcher
        .apply_filter("order.total", json!({ "value": 5 }))
        .await
        .unwrap();

    assert_eq!(result, json!({ "value": 12 }));
}

#[tokio::test]
async fn test_failing_action_does_not_stop_others() {
    let (registry, dispatcher) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));

    recorder(&registry, &log, "order.created", "p1", 10, "before");
    registry.add_action("order.created", "broken", 15, |_p: u32, _ctx| async {
        Err(HookError::failed("smtp unavailable"))
    });
    recorder(&registry, &log, "order.created", "p2", 20, "after");

    let report = dispatcher.do_action("order.created", &1_u32).await;

    assert_eq!(*log.lock().unwrap(), vec!["before", "after"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].plugin_id, "broken");
    assert_eq!(report.succeeded(), 2);
}

#[tokio::test]
async fn test_failing_filter_follows_policy() {
    let registry = Arc::new(HookRegistry::new());
    registry.add_filter("order.total", "p1", 10, |v: i64, _ctx| async move { Ok(v + 1) });
    registry.add_filter("order.total", "broken", 20, |_v: i64, _ctx| async {
        Err(HookError::failed("rate service down"))
    });
    registry.add_filter("order.total", "p2", 30, |v: i64, _ctx| async move { Ok(v * 10) });

    let skip = HookDispatcher::new(registry.clone());
    assert_eq!(skip.apply_filter("order.total", 1_i64).await.unwrap(), 20);

    let abort =
        HookDispatcher::new(registry.clone()).with_filter_policy(FilterFailurePolicy::Abort);
    assert_eq!(abort.apply_filter("order.total", 1_i64).await.unwrap(), 2);

    let propagate =
        HookDispatcher::new(registry.clone()).with_filter_policy(FilterFailurePolicy::Propagate);
    assert!(propagate.apply_filter("order.total", 1_i64).await.is_err());
}

#[tokio::test]
async fn test_unregister_plugin_across_hooks() {
    let (registry, dispatcher) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));

    recorder(&registry, &log, "order.created", "audit", 10, "audit-created");
    recorder(&registry, &log, "order.deleted", "audit", 10, "audit-deleted");
    recorder(&registry, &log, "order.created", "mailer", 10, "mailer-created");

    assert_eq!(registry.unregister_plugin("audit"), 2);

    assert!(registry.has_hooks("order.created"));
    assert!(!registry.has_hooks("order.deleted"));

    dispatcher.do_action("order.created", &1_u32).await;
    dispatcher.do_action("order.deleted", &1_u32).await;
    assert_eq!(*log.lock().unwrap(), vec!["mailer-created"]);
}

#[tokio::test]
async fn test_clear_empties_registry() {
    let (registry, _dispatcher) = setup();
    let log = Arc::new(Mutex::new(Vec::new()));
    recorder(&registry, &log, "order.created", "p1", 10, "x");
    recorder(&registry, &log, "product.updated", "p1", 10, "y");

    registry.clear();

    assert!(registry.get_all().is_empty());
    assert!(!registry.has_hooks("order.created"));
    assert!(!registry.has_hooks("product.updated"));
}

#[tokio::test]
async fn test_overlapping_dispatches_are_independent() {
    let (registry, dispatcher) = setup();
    let created = Arc::new(Mutex::new(Vec::new()));
    let renewed = Arc::new(Mutex::new(Vec::new()));

    for (i, label) in ["a", "b", "c"].into_iter().enumerate() {
        let created = created.clone();
        registry.add_action("order.created", "p1", i as i32, move |_p: u32, _ctx| {
            let created = created.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                created.lock().unwrap().push(label);
                Ok(())
            }
        });
        let renewed = renewed.clone();
        registry.add_action("subscription.renewed", "p2", i as i32, move |_p: u32, _ctx| {
            let renewed = renewed.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(3)).await;
                renewed.lock().unwrap().push(label);
                Ok(())
            }
        });
    }

    let (left, right) = tokio::join!(
        dispatcher.do_action("order.created", &1_u32),
        dispatcher.do_action("subscription.renewed", &2_u32),
    );

    assert_eq!(left.invoked, 3);
    assert_eq!(right.invoked, 3);
    assert_ne!(left.dispatch_id, right.dispatch_id);
    assert_eq!(*created.lock().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(*renewed.lock().unwrap(), vec!["a", "b", "c"]);
}
