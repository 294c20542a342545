//! Audit event types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use standup_api::CounterScope;
use standup_util::TaskId;

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    ServiceStarted,

    ServiceStopped,

    /// Reminder schedule changed (toggle or interval)
    ReminderConfigured { interval_minutes: u32, active: bool },

    /// A stand-up was acknowledged
    ActionRecorded {
        at: DateTime<Local>,
        total_count: u64,
    },

    Snoozed { until: DateTime<Local> },

    CountersReset { scope: CounterScope },

    TaskAdded { task_id: TaskId },

    TaskUpdated { task_id: TaskId },

    TaskDeleted { task_id: TaskId },

    ClientConnected { client_id: String, uid: Option<u32> },

    ClientDisconnected { client_id: String },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: standup_util::now(),
            event,
        }
    }
}
