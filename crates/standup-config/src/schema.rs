//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Reminder defaults applied on first run
    #[serde(default)]
    pub reminder: RawReminderConfig,

    /// Notification wording
    #[serde(default)]
    pub notifications: RawNotificationConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// IPC socket path (default: $XDG_RUNTIME_DIR/standupd/standupd.sock)
    pub socket_path: Option<PathBuf>,

    /// Data directory for the store
    pub data_dir: Option<PathBuf>,
}

/// Reminder settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawReminderConfig {
    /// Minutes between reminders
    pub interval_minutes: Option<u32>,

    /// Whether reminders start enabled
    pub active: Option<bool>,

    /// Length of a snooze picked from a notification
    pub snooze_minutes: Option<u32>,

    /// First day of the week for the weekly counter: "sunday", "mon", ...
    pub week_start: Option<String>,
}

/// Notification titles and bodies.
///
/// `confirmation_body` may contain `{today}`; `snooze_body` may contain `{minutes}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawNotificationConfig {
    pub reminder_title: Option<String>,
    pub reminder_body: Option<String>,
    pub confirmation_title: Option<String>,
    pub confirmation_body: Option<String>,
    pub snooze_title: Option<String>,
    pub snooze_body: Option<String>,
}
