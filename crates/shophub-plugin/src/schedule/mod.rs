//! Plugin schedules: interval/cron parsing and the runner that fires them.

pub mod cron;
pub mod interval;
pub mod runner;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shophub_core::error::{AppError, ErrorKind};

pub use self::cron::CronExpression;
pub use self::interval::{next_run_at, parse_interval};
pub use self::runner::{ScheduleFailure, ScheduleHandler, ScheduleInfo, ScheduleRunner, TickReport};

/// A schedule entry as declared in a plugin manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDefinition {
    /// Identifier, unique within the plugin; passed to the plugin's handler.
    pub id: String,
    /// Interval (`30s`, `5m`, `1h`, `1d`) or five-field cron expression.
    pub schedule: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl ScheduleDefinition {
    /// Creates a new schedule definition.
    pub fn new(id: &str, schedule: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            schedule: schedule.to_string(),
            description: description.to_string(),
        }
    }
}

/// Errors raised while parsing or registering schedules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Neither an interval nor a valid cron expression.
    #[error("invalid schedule '{schedule}': {reason}")]
    Invalid {
        /// The rejected schedule string.
        schedule: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A cron expression that names a date that never exists.
    #[error("schedule '{schedule}' never fires")]
    NeverFires {
        /// The rejected schedule string.
        schedule: String,
    },

    /// Two schedules of one plugin share an id.
    #[error("plugin '{plugin_id}' declares schedule '{schedule_id}' more than once")]
    DuplicateId {
        /// Owning plugin.
        plugin_id: String,
        /// The repeated schedule id.
        schedule_id: String,
    },
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        AppError::with_source(ErrorKind::Configuration, err.to_string(), err)
    }
}

/// A parsed schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed interval in milliseconds, measured from the end of the last run.
    Interval {
        /// Interval length in milliseconds.
        millis: u64,
    },
    /// Wall-clock cron expression.
    Cron(CronExpression),
}

impl Schedule {
    /// Parses a schedule string, trying the interval grammar first and then
    /// cron.
    pub fn parse(schedule: &str) -> Result<Self, ScheduleError> {
        if let Some(millis) = parse_interval(schedule) {
            return Ok(Self::Interval { millis });
        }

        if schedule.split_whitespace().count() == 5 {
            return CronExpression::parse(schedule).map(Self::Cron);
        }

        Err(ScheduleError::Invalid {
            schedule: schedule.to_string(),
            reason: "expected <n>s|m|h|d or a five-field cron expression".to_string(),
        })
    }

    /// The next time this schedule is due, given the current time.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Interval { millis } => Some(interval::add_millis(now, *millis)),
            Self::Cron(expr) => expr.next_after(now),
        }
    }
}

impl FromStr for Schedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval { millis } => write!(f, "every {millis}ms"),
            Self::Cron(expr) => write!(f, "cron '{expr}'"),
        }
    }
}
