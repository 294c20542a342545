//! Event types for standupd -> client streaming

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{API_VERSION, CounterScope, Notification, ReminderStatus};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: standup_util::now(),
            payload,
        }
    }
}

/// All possible events from the service to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Reminder state snapshot (sent after every mutation)
    StatusChanged(ReminderStatus),

    /// The presentation layer should show this notification
    Notification(Notification),

    /// A calendar rollover reset a counter
    CountersReset { scope: CounterScope },

    /// The task list was modified
    TasksChanged { count: usize },

    /// Service is shutting down
    Shutdown,
}
