//! Five-field cron expressions evaluated in UTC.
//!
//! Fields: minute, hour, day-of-month, month, day-of-week. Parsing and
//! next-fire search are done by `croner`; this wrapper pins the field count,
//! keeps the normalized source for display, and rejects expressions that
//! can never fire.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use croner::Cron;

use super::ScheduleError;

/// A parsed five-field cron expression.
#[derive(Clone)]
pub struct CronExpression {
    source: String,
    cron: Arc<Cron>,
}

impl CronExpression {
    /// Parses a five-field expression.
    ///
    /// Day-of-month and day-of-week are OR-ed when both are restricted, and
    /// day-of-week `7` is Sunday. Names (`JAN`, `sun`) are case-insensitive.
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ScheduleError::Invalid {
                schedule: expression.to_string(),
                reason: format!("expected 5 cron fields, found {}", fields.len()),
            });
        }

        let source = fields.join(" ");
        let cron = Cron::new(&source.to_ascii_uppercase())
            .parse()
            .map_err(|e| ScheduleError::Invalid {
                schedule: expression.to_string(),
                reason: e.to_string(),
            })?;

        if cron.find_next_occurrence(&Utc::now(), false).is_err() {
            return Err(ScheduleError::NeverFires {
                schedule: expression.to_string(),
            });
        }

        Ok(Self {
            source,
            cron: Arc::new(cron),
        })
    }

    /// The first whole minute strictly after `after` that matches, or `None`
    /// if nothing matches within the search limit.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cron.find_next_occurrence(&after, false).ok()
    }

    /// Whether `at` falls on a minute this expression matches.
    pub fn matches(&self, at: DateTime<Utc>) -> bool {
        self.cron.is_time_matching(&at).unwrap_or(false)
    }
}

impl fmt::Debug for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CronExpression").field(&self.source).finish()
    }
}

impl PartialEq for CronExpression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CronExpression {}

impl FromStr for CronExpression {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single().unwrap()
    }

    fn cron(expr: &str) -> CronExpression {
        CronExpression::parse(expr).unwrap()
    }

    #[test]
    fn test_every_minute() {
        let next = cron("* * * * *").next_after(at(2026, 3, 1, 10, 15)).unwrap();
        assert_eq!(next, at(2026, 3, 1, 10, 16));
    }

    #[test]
    fn test_next_is_strictly_after() {
        let expr = cron("30 6 * * *");
        assert_eq!(expr.next_after(at(2026, 3, 1, 6, 30)), Some(at(2026, 3, 2, 6, 30)));
        assert_eq!(expr.next_after(at(2026, 3, 1, 6, 29)), Some(at(2026, 3, 1, 6, 30)));
    }

    #[test]
    fn test_seconds_are_truncated() {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 10, 15, 42).single().unwrap();
        let next = cron("*/5 * * * *").next_after(base).unwrap();
        assert_eq!(next, at(2026, 3, 1, 10, 20));
    }

    #[test]
    fn test_step_and_list_fields() {
        let expr = cron("0,30 9-17/4 * * *");
        assert!(expr.matches(at(2026, 1, 5, 9, 0)));
        assert!(expr.matches(at(2026, 1, 5, 13, 30)));
        assert!(expr.matches(at(2026, 1, 5, 17, 0)));
        assert!(!expr.matches(at(2026, 1, 5, 10, 0)));
        assert!(!expr.matches(at(2026, 1, 5, 9, 15)));
    }

    #[test]
    fn test_value_with_step_runs_to_field_end() {
        let expr = cron("50/5 * * * *");
        assert!(expr.matches(at(2026, 1, 1, 0, 50)));
        assert!(expr.matches(at(2026, 1, 1, 0, 55)));
        assert!(!expr.matches(at(2026, 1, 1, 0, 0)));
    }

    #[test]
    fn test_names_and_sunday_as_seven() {
        // 2026-03-01 is a Sunday.
        let by_name = cron("0 8 * MAR sun");
        let by_seven = cron("0 8 * 3 7");
        assert!(by_name.matches(at(2026, 3, 1, 8, 0)));
        assert!(by_seven.matches(at(2026, 3, 1, 8, 0)));
        assert!(!by_seven.matches(at(2026, 3, 2, 8, 0)));
    }

    #[test]
    fn test_weekly_rolls_to_next_monday() {
        // 2026-03-04 is a Wednesday; next Monday is 2026-03-09.
        let next = cron("0 8 * * 1").next_after(at(2026, 3, 4, 12, 0)).unwrap();
        assert_eq!(next, at(2026, 3, 9, 8, 0));
    }

    #[test]
    fn test_month_rollover_across_year() {
        let next = cron("0 0 1 1 *").next_after(at(2026, 6, 15, 0, 0)).unwrap();
        assert_eq!(next, at(2027, 1, 1, 0, 0));
    }

    #[test]
    fn test_dom_or_dow_when_both_restricted() {
        // The 13th, or any Friday.
        let expr = cron("0 0 13 * 5");
        assert!(expr.matches(at(2026, 3, 13, 0, 0)));
        assert!(expr.matches(at(2026, 3, 6, 0, 0)));
        assert!(!expr.matches(at(2026, 3, 7, 0, 0)));
    }

    #[test]
    fn test_dom_and_dow_when_one_is_star() {
        let expr = cron("0 0 */2 * *");
        assert!(expr.matches(at(2026, 3, 1, 0, 0)));
        assert!(!expr.matches(at(2026, 3, 2, 0, 0)));
    }

    #[test]
    fn test_leap_day() {
        let next = cron("0 0 29 2 *").next_after(at(2026, 3, 1, 0, 0)).unwrap();
        assert_eq!(next, at(2028, 2, 29, 0, 0));
    }

    #[test]
    fn test_impossible_date_rejected() {
        let err = CronExpression::parse("0 0 30 2 *").unwrap_err();
        assert!(matches!(err, ScheduleError::NeverFires { .. }));
    }

    #[test]
    fn test_invalid_expressions() {
        for input in [
            "* * * *",
            "* * * * * *",
            "60 * * * *",
            "* 24 * * *",
            "* * 0 * *",
            "* * * 13 *",
            "* * * * 8",
            "*/0 * * * *",
            "*/60 * * * *",
            "1/4294967295 * * * *",
            "*/300 * * * *",
            "0 */25 * * *",
            "5-1 * * * *",
            "1,,2 * * * *",
            "a * * * *",
            "* * * FOO *",
            "30s",
        ] {
            assert!(CronExpression::parse(input).is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_largest_step_in_range() {
        let expr = cron("*/59 * * * *");
        assert!(expr.matches(at(2026, 1, 1, 0, 0)));
        assert!(expr.matches(at(2026, 1, 1, 0, 59)));
        assert!(!expr.matches(at(2026, 1, 1, 0, 30)));
    }

    #[test]
    fn test_oversized_step_is_invalid_not_never_fires() {
        let err = CronExpression::parse("1/4294967295 * * * *").unwrap_err();
        assert!(matches!(err, ScheduleError::Invalid { .. }));
    }

    #[test]
    fn test_display_normalizes_whitespace() {
        assert_eq!(cron("0   6 *  * *").to_string(), "0 6 * * *");
    }
}
