//! Schedule runner: invokes plugin schedule handlers when they fall due.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::hooks::callback::guarded;
use crate::hooks::definitions::HookError;

use super::{Schedule, ScheduleDefinition, ScheduleError};

/// Runs the work behind a plugin's schedules.
#[async_trait]
pub trait ScheduleHandler: Send + Sync {
    /// Runs the schedule with the given id.
    async fn run_schedule(&self, schedule_id: &str) -> Result<(), HookError>;
}

/// A registered schedule with its runtime state.
struct ScheduledTask {
    /// Unique per `register` call.
    registration: u64,
    plugin_id: String,
    id: String,
    description: String,
    schedule: Schedule,
    next_run_at: Option<DateTime<Utc>>,
    last_run_at: Option<DateTime<Utc>>,
    run_count: u64,
    failure_count: u64,
    handler: Arc<dyn ScheduleHandler>,
}

impl ScheduledTask {
    fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_run_at.is_some_and(|next| next <= now)
    }
}

/// Read-only view of a registered schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleInfo {
    /// Owning plugin.
    pub plugin_id: String,
    /// Schedule id.
    pub id: String,
    /// Description from the manifest.
    pub description: String,
    /// Rendered schedule.
    pub schedule: String,
    /// Next time the schedule is due.
    pub next_run_at: Option<DateTime<Utc>>,
    /// When the handler last finished.
    pub last_run_at: Option<DateTime<Utc>>,
    /// Number of completed runs, failed ones included.
    pub run_count: u64,
    /// Number of failed runs.
    pub failure_count: u64,
}

/// One schedule handler that failed during a tick.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleFailure {
    /// Owning plugin.
    pub plugin_id: String,
    /// Schedule id.
    pub schedule_id: String,
    /// Rendered error.
    pub error: String,
}

/// Outcome of one `tick`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    /// Schedules that were due and run.
    pub ran: usize,
    /// Handlers that failed.
    pub failures: Vec<ScheduleFailure>,
}

/// Holds plugin schedules and runs the due ones on every tick.
pub struct ScheduleRunner {
    /// Registered schedules.
    tasks: Mutex<Vec<ScheduledTask>>,
    /// Next registration number.
    registration: AtomicU64,
    /// Time between two due-checks in `run`.
    tick_interval: Duration,
}

impl std::fmt::Debug for ScheduleRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleRunner")
            .field("tick_interval", &self.tick_interval)
            .finish()
    }
}

impl ScheduleRunner {
    /// Creates a runner that checks for due schedules every `tick_interval`.
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            registration: AtomicU64::new(0),
            tick_interval: tick_interval.max(Duration::from_secs(1)),
        }
    }

    /// Parses every definition of a plugin, rejecting duplicate ids.
    pub fn validate(
        plugin_id: &str,
        definitions: &[ScheduleDefinition],
    ) -> Result<Vec<Schedule>, ScheduleError> {
        let mut seen = HashSet::new();
        let mut schedules = Vec::with_capacity(definitions.len());

        for def in definitions {
            if !seen.insert(def.id.as_str()) {
                return Err(ScheduleError::DuplicateId {
                    plugin_id: plugin_id.to_string(),
                    schedule_id: def.id.clone(),
                });
            }
            schedules.push(Schedule::parse(&def.schedule)?);
        }

        Ok(schedules)
    }

    /// Registers a plugin's schedules.
    ///
    /// Every definition is validated before any is registered. The first run
    /// is computed from the current time.
    pub async fn register(
        &self,
        plugin_id: &str,
        definitions: &[ScheduleDefinition],
        handler: Arc<dyn ScheduleHandler>,
    ) -> Result<(), ScheduleError> {
        let schedules = Self::validate(plugin_id, definitions)?;
        let now = Utc::now();

        let mut tasks = self.tasks.lock().await;

        if let Some(existing) = definitions
            .iter()
            .find(|def| tasks.iter().any(|t| t.plugin_id == plugin_id && t.id == def.id))
        {
            return Err(ScheduleError::DuplicateId {
                plugin_id: plugin_id.to_string(),
                schedule_id: existing.id.clone(),
            });
        }

        for (def, schedule) in definitions.iter().zip(schedules) {
            let next_run_at = schedule.next_after(now);
            info!(
                plugin_id = %plugin_id,
                schedule_id = %def.id,
                schedule = %schedule,
                next_run_at = ?next_run_at,
                "Schedule registered"
            );
            tasks.push(ScheduledTask {
                registration: self.registration.fetch_add(1, Ordering::Relaxed),
                plugin_id: plugin_id.to_string(),
                id: def.id.clone(),
                description: def.description.clone(),
                schedule,
                next_run_at,
                last_run_at: None,
                run_count: 0,
                failure_count: 0,
                handler: handler.clone(),
            });
        }

        Ok(())
    }

    /// Removes every schedule owned by a plugin. Returns how many were removed.
    pub async fn unregister_plugin(&self, plugin_id: &str) -> usize {
        let mut tasks = self.tasks.lock().await;
        let before = tasks.len();
        tasks.retain(|t| t.plugin_id != plugin_id);
        let removed = before - tasks.len();

        if removed > 0 {
            info!(plugin_id = %plugin_id, removed = removed, "Schedules unregistered for plugin");
        }
        removed
    }

    /// Runs every schedule due at `now`, one after another.
    ///
    /// An overdue schedule runs once no matter how many intervals it missed.
    /// After each run its next time is computed from a fresh clock read.
    /// Failing handlers are logged and keep their registration.
    pub async fn tick(&self, now: DateTime<Utc>) -> TickReport {
        let due: Vec<(u64, String, String, Arc<dyn ScheduleHandler>)> = {
            let tasks = self.tasks.lock().await;
            tasks
                .iter()
                .filter(|t| t.is_due(now))
                .map(|t| {
                    (
                        t.registration,
                        t.plugin_id.clone(),
                        t.id.clone(),
                        t.handler.clone(),
                    )
                })
                .collect()
        };

        let mut report = TickReport::default();

        for (registration, plugin_id, schedule_id, handler) in due {
            debug!(plugin_id = %plugin_id, schedule_id = %schedule_id, "Running schedule");

            let result = guarded(|| handler.run_schedule(&schedule_id)).await;
            let finished_at = Utc::now();
            report.ran += 1;

            if let Err(err) = &result {
                error!(
                    plugin_id = %plugin_id,
                    schedule_id = %schedule_id,
                    error = %err,
                    "Schedule handler failed"
                );
                report.failures.push(ScheduleFailure {
                    plugin_id: plugin_id.clone(),
                    schedule_id: schedule_id.clone(),
                    error: err.to_string(),
                });
            }

            let mut tasks = self.tasks.lock().await;
            // The plugin may have been deactivated, or deactivated and
            // activated again, while its handler ran.
            if let Some(task) = tasks.iter_mut().find(|t| t.registration == registration)
            {
                task.last_run_at = Some(finished_at);
                task.run_count += 1;
                if result.is_err() {
                    task.failure_count += 1;
                }
                task.next_run_at = task.schedule.next_after(finished_at);
                if task.next_run_at.is_none() {
                    warn!(
                        plugin_id = %plugin_id,
                        schedule_id = %schedule_id,
                        "Schedule has no further run time"
                    );
                }
            }
        }

        report
    }

    /// Calls `tick` every `tick_interval` until `shutdown` turns true or its
    /// sender is dropped. A tick in progress is allowed to finish.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            tick_interval_secs = self.tick_interval.as_secs(),
            "Schedule runner started"
        );

        let mut ticker = time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let report = self.tick(Utc::now()).await;
            if report.ran > 0 {
                debug!(
                    ran = report.ran,
                    failed = report.failures.len(),
                    "Schedule tick complete"
                );
            }
        }

        info!("Schedule runner stopped");
    }

    /// Returns a snapshot of every registered schedule.
    pub async fn list(&self) -> Vec<ScheduleInfo> {
        let tasks = self.tasks.lock().await;
        tasks
            .iter()
            .map(|t| ScheduleInfo {
                plugin_id: t.plugin_id.clone(),
                id: t.id.clone(),
                description: t.description.clone(),
                schedule: t.schedule.to_string(),
                next_run_at: t.next_run_at,
                last_run_at: t.last_run_at,
                run_count: t.run_count,
                failure_count: t.failure_count,
            })
            .collect()
    }

    /// Number of registered schedules.
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Whether no schedules are registered.
    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }
}
