//! Integration tests for interval parsing and the schedule runner.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};

use shophub_plugin::schedule::{ScheduleHandler, next_run_at, parse_interval};
use shophub_plugin::{HookError, ScheduleDefinition, ScheduleRunner};

#[derive(Default)]
struct Counter {
    runs: AtomicUsize,
}

#[async_trait]
impl ScheduleHandler for Counter {
    async fn run_schedule(&self, _schedule_id: &str) -> Result<(), HookError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_parse_interval_units() {
    assert_eq!(parse_interval("30s"), Some(30_000));
    assert_eq!(parse_interval("5m"), Some(300_000));
    assert_eq!(parse_interval("1h"), Some(3_600_000));
    assert_eq!(parse_interval("1d"), Some(86_400_000));
    assert_eq!(parse_interval("invalid"), None);
}

#[test]
fn test_next_run_at_within_tolerance() {
    let expected = Utc::now() + TimeDelta::milliseconds(60_000);
    let actual = next_run_at(60_000);
    let drift = (actual - expected).num_milliseconds().abs();
    assert!(drift <= 100, "drift was {drift}ms");
}

#[tokio::test]
async fn test_runner_fires_only_due_schedules() {
    let runner = ScheduleRunner::new(std::time::Duration::from_secs(30));
    let counter = Arc::new(Counter::default());

    runner
        .register(
            "order-audit",
            &[
                ScheduleDefinition::new("flush", "5m", "drain"),
                ScheduleDefinition::new("digest", "1d", "totals"),
            ],
            counter.clone(),
        )
        .await
        .unwrap();

    let report = runner.tick(Utc::now() + TimeDelta::minutes(10)).await;

    assert_eq!(report.ran, 1);
    assert_eq!(counter.runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_overdue_schedule_runs_once() {
    let runner = ScheduleRunner::new(std::time::Duration::from_secs(30));
    let counter = Arc::new(Counter::default());
    runner
        .register(
            "order-audit",
            &[ScheduleDefinition::new("flush", "1m", "")],
            counter.clone(),
        )
        .await
        .unwrap();

    let report = runner.tick(Utc::now() + TimeDelta::hours(2)).await;

    assert_eq!(report.ran, 1);
    assert_eq!(counter.runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_schedule_rejected_at_registration() {
    let runner = ScheduleRunner::new(std::time::Duration::from_secs(30));
    let result = runner
        .register(
            "order-audit",
            &[ScheduleDefinition::new("flush", "0 0 31 2 *", "")],
            Arc::new(Counter::default()),
        )
        .await;

    assert!(result.is_err());
    assert!(runner.is_empty().await);
}
