//! `<n><unit>` interval strings.

use chrono::{DateTime, TimeDelta, Utc};

/// Parses an interval such as `30s`, `5m`, `1h` or `1d` into milliseconds.
///
/// Returns `None` for anything that is not exactly digits followed by one of
/// `s`, `m`, `h`, `d` (cron expressions included), and when the result does
/// not fit in a `u64`.
pub fn parse_interval(schedule: &str) -> Option<u64> {
    let unit = schedule.chars().last()?;
    let digits = &schedule[..schedule.len() - unit.len_utf8()];

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let multiplier: u64 = match unit {
        's' => 1_000,
        'm' => 60_000,
        'h' => 3_600_000,
        'd' => 86_400_000,
        _ => return None,
    };

    digits.parse::<u64>().ok()?.checked_mul(multiplier)
}

/// The current time plus `interval_ms`.
///
/// Reads the clock on every call.
pub fn next_run_at(interval_ms: u64) -> DateTime<Utc> {
    add_millis(Utc::now(), interval_ms)
}

/// `from` plus `interval_ms`, saturating at the largest representable time.
pub(crate) fn add_millis(from: DateTime<Utc>, interval_ms: u64) -> DateTime<Utc> {
    i64::try_from(interval_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
