//! Validated settings structures

use crate::schema::{RawConfig, RawNotificationConfig, RawReminderConfig, RawServiceConfig};
use crate::validation::parse_week_start;
use chrono::Weekday;
use standup_util::{data_dir_without_env, socket_path_without_env};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INTERVAL_MINUTES: u32 = 30;
pub const DEFAULT_SNOOZE_MINUTES: u32 = 10;
pub const DEFAULT_WEEK_START: Weekday = Weekday::Sun;

/// Validated settings ready for use by the daemon and the reminder scheduler
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub service: ServiceSettings,
    pub reminder: ReminderSettings,
    pub messages: NotificationTexts,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceSettings::from_raw(raw.service),
            reminder: ReminderSettings::from_raw(raw.reminder),
            messages: NotificationTexts::from_raw(raw.notifications),
        }
    }
}

/// Service paths
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub socket_path: PathBuf,
    pub data_dir: PathBuf,
}

impl ServiceSettings {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            socket_path: raw.socket_path.unwrap_or_else(socket_path_without_env),
            data_dir: raw.data_dir.unwrap_or_else(data_dir_without_env),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_raw(RawServiceConfig::default())
    }
}

/// Reminder behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSettings {
    /// Interval used when no reminder state has been persisted yet
    pub interval_minutes: u32,
    /// Whether reminders start enabled on first run
    pub active: bool,
    /// Snooze length when the user picks "snooze" on a notification
    pub snooze: Duration,
    /// First day of the week for the weekly counter
    pub week_start: Weekday,
}

impl ReminderSettings {
    fn from_raw(raw: RawReminderConfig) -> Self {
        let snooze_minutes = raw.snooze_minutes.unwrap_or(DEFAULT_SNOOZE_MINUTES);
        Self {
            interval_minutes: raw.interval_minutes.unwrap_or(DEFAULT_INTERVAL_MINUTES),
            active: raw.active.unwrap_or(true),
            snooze: Duration::from_secs(snooze_minutes as u64 * 60),
            week_start: raw
                .week_start
                .as_deref()
                .and_then(|s| parse_week_start(s).ok())
                .unwrap_or(DEFAULT_WEEK_START),
        }
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self::from_raw(RawReminderConfig::default())
    }
}

/// Notification wording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTexts {
    pub reminder_title: String,
    pub reminder_body: String,
    pub confirmation_title: String,
    confirmation_body: String,
    pub snooze_title: String,
    snooze_body: String,
}

impl NotificationTexts {
    fn from_raw(raw: RawNotificationConfig) -> Self {
        Self {
            reminder_title: raw
                .reminder_title
                .unwrap_or_else(|| "Time to stand up!".into()),
            reminder_body: raw.reminder_body.unwrap_or_else(|| {
                "You've been sitting for a while. Stand up and stretch for a minute.".into()
            }),
            confirmation_title: raw
                .confirmation_title
                .unwrap_or_else(|| "Nice work!".into()),
            confirmation_body: raw
                .confirmation_body
                .unwrap_or_else(|| "Stand-up recorded. That's {today} today.".into()),
            snooze_title: raw
                .snooze_title
                .unwrap_or_else(|| "Reminder snoozed".into()),
            snooze_body: raw
                .snooze_body
                .unwrap_or_else(|| "We'll remind you again in {minutes} minutes.".into()),
        }
    }

    /// Confirmation body with `{today}` filled in
    pub fn confirmation_body(&self, today: u64) -> String {
        self.confirmation_body.replace("{today}", &today.to_string())
    }

    /// Snooze body with `{minutes}` filled in
    pub fn snooze_body(&self, snooze: Duration) -> String {
        let minutes = snooze.as_secs().div_ceil(60);
        self.snooze_body.replace("{minutes}", &minutes.to_string())
    }
}

impl Default for NotificationTexts {
    fn default() -> Self {
        Self::from_raw(RawNotificationConfig::default())
    }
}
