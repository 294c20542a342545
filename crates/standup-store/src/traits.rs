//! Store trait definitions

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use standup_api::TaskRecord;
use standup_util::TaskId;

use crate::{AuditEvent, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Reminder state

    /// Load the persisted reminder record, if one was ever saved
    fn load_reminder_state(&self) -> StoreResult<Option<ReminderState>>;

    /// Overwrite the persisted reminder record
    fn save_reminder_state(&self, state: &ReminderState) -> StoreResult<()>;

    // Tasks

    /// All tasks in creation order. Rows that cannot be decoded are skipped.
    fn list_tasks(&self) -> StoreResult<Vec<TaskRecord>>;

    fn get_task(&self, id: &TaskId) -> StoreResult<Option<TaskRecord>>;

    /// Insert or replace a task
    fn upsert_task(&self, task: &TaskRecord) -> StoreResult<()>;

    /// Delete a task. Returns whether it existed.
    fn delete_task(&self, id: &TaskId) -> StoreResult<bool>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// Persisted reminder record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderState {
    /// Minutes between reminders, always > 0
    pub interval_minutes: u32,

    /// Whether reminders fire
    pub active: bool,

    /// Reminders are suppressed until this instant
    pub snooze_until: Option<DateTime<Local>>,

    /// Last acknowledged stand-up
    pub last_action: Option<DateTime<Local>>,

    pub daily_count: u64,
    pub weekly_count: u64,
    pub total_count: u64,

    /// Day the daily counter was last reset
    pub last_daily_reset: NaiveDate,

    /// Week start date the weekly counter was last reset for
    pub last_weekly_reset: NaiveDate,
}

impl ReminderState {
    /// First-run state: zero counters, reset markers set to the current day and week
    pub fn new(interval_minutes: u32, active: bool, today: NaiveDate, week_start: NaiveDate) -> Self {
        Self {
            interval_minutes,
            active,
            snooze_until: None,
            last_action: None,
            daily_count: 0,
            weekly_count: 0,
            total_count: 0,
            last_daily_reset: today,
            last_weekly_reset: week_start,
        }
    }
}
