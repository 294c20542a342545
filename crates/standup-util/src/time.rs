//! Time utilities for standupd
//!
//! Wall-clock access plus the calendar arithmetic the reminder rollovers
//! depend on: local midnights, week starts for a configurable first weekday,
//! and the initial delays for the daily and weekly reset schedules.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `STANDUP_MOCK_TIME` environment variable shifts the
//! clock returned by [`now`]. The shifted clock keeps advancing in real time,
//! which makes it easy to watch a midnight or week rollover happen.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-27 23:59:30`)
//!
//! ```bash
//! STANDUP_MOCK_TIME="2025-12-27 23:59:30" standupd
//! ```

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "STANDUP_MOCK_TIME";

/// Format accepted by [`MOCK_TIME_ENV_VAR`]
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Length of one day for the daily reset schedule
pub const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Length of one week for the weekly reset schedule
pub const ONE_WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // wraps Local::now()
fn mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let raw = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let Ok(naive) = NaiveDateTime::parse_from_str(&raw, MOCK_TIME_FORMAT) else {
                tracing::warn!(
                    mock_time = %raw,
                    expected_format = MOCK_TIME_FORMAT,
                    "Invalid mock time format"
                );
                return None;
            };
            let Some(mock) = Local.from_local_datetime(&naive).earliest() else {
                tracing::warn!(mock_time = %raw, "Mock time does not exist in the local timezone");
                return None;
            };
            let offset = mock.signed_duration_since(chrono::Local::now());
            tracing::info!(
                mock_time = %raw,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    mock_time_offset().is_some()
}

/// Current local time, shifted by `STANDUP_MOCK_TIME` in debug builds.
#[allow(clippy::disallowed_methods)] // the one sanctioned caller of Local::now()
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();
    match mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// The instant a local calendar day begins.
///
/// Falls back to interpreting midnight as UTC when the local zone skips it
/// (a DST gap at 00:00).
pub fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// Most recent `first_day` on or before `date`.
pub fn week_start_of(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date - chrono::Duration::days(back as i64)
}

/// Delay from `now` until the next local midnight.
pub fn delay_until_next_midnight(now: DateTime<Local>) -> Duration {
    let tomorrow = now.date_naive() + chrono::Duration::days(1);
    until(now, local_midnight(tomorrow))
}

/// Delay from `now` until midnight of the next `weekday` strictly after today.
///
/// On the weekday itself this is the following week's occurrence.
pub fn delay_until_next_weekday(now: DateTime<Local>, weekday: Weekday) -> Duration {
    let today = now.date_naive();
    let mut ahead =
        (7 + weekday.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    if ahead == 0 {
        ahead = 7;
    }
    until(now, local_midnight(today + chrono::Duration::days(ahead as i64)))
}

fn until(now: DateTime<Local>, target: DateTime<Local>) -> Duration {
    target
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Parse a weekday from a full or three-letter English name (case-insensitive).
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse::<Weekday>().ok()
}

/// Format a DateTime with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
