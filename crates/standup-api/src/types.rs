//! Shared types for the standupd API

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use standup_util::TaskId;
use std::collections::BTreeMap;

/// Client-facing view of the reminder state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderStatus {
    pub interval_minutes: u32,
    pub active: bool,
    /// Whether a snooze window is in effect at the time of the snapshot
    pub snoozed: bool,
    pub snooze_until: Option<DateTime<Local>>,
    pub last_action: Option<DateTime<Local>>,
    pub daily_count: u64,
    pub weekly_count: u64,
    pub total_count: u64,
    pub last_daily_reset: NaiveDate,
    pub last_weekly_reset: NaiveDate,
}

/// Counter subset returned by `get_stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderStats {
    pub today: u64,
    pub this_week: u64,
    pub total: u64,
    pub last_action: Option<DateTime<Local>>,
}

/// Which counter a rollover reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterScope {
    Daily,
    Weekly,
}

/// Kind of notification the presentation layer is asked to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    Confirmation,
    SnoozeAcknowledged,
}

/// Action a user can pick on a reminder notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderAction {
    /// "I stood up"
    Done,
    /// Postpone by the configured snooze length
    Snooze,
}

/// Opaque notification request for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub actions: Vec<ReminderAction>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = ReminderAction>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(alias = "in-progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Completed and cancelled tasks can no longer become overdue
    pub fn is_closed(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

fn default_task_type() -> String {
    "general".to_string()
}

/// A task in the user's task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Free-form category
    #[serde(rename = "type", default = "default_task_type")]
    pub task_type: String,
    /// Percent complete. Missing values count as zero.
    #[serde(default)]
    pub progress: Option<u8>,
    pub created_at: DateTime<Local>,
    #[serde(default)]
    pub due_date: Option<DateTime<Local>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Local>>,
}

impl TaskRecord {
    /// Progress clamped to 0..=100, with a missing value read as 0
    pub fn progress_or_zero(&self) -> u8 {
        self.progress.unwrap_or(0).min(100)
    }

    pub fn is_overdue(&self, now: DateTime<Local>) -> bool {
        !self.status.is_closed() && self.due_date.is_some_and(|due| due < now)
    }
}

/// Fields supplied when creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(rename = "type", default = "default_task_type")]
    pub task_type: String,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub due_date: Option<DateTime<Local>>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            task_type: default_task_type(),
            progress: None,
            due_date: None,
        }
    }
}

/// Partial update of a task; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(rename = "type", default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub due_date: Option<DateTime<Local>>,
    /// Remove the due date (takes precedence over `due_date`)
    #[serde(default)]
    pub clear_due_date: bool,
}

/// Task counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

/// Task counts per priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Statistics derived from the task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub total: usize,
    pub by_status: StatusCounts,
    pub by_type: BTreeMap<String, usize>,
    pub by_priority: PriorityCounts,
    /// Percent of tasks completed, one decimal
    pub completion_rate: f64,
    pub overdue: usize,
    /// Mean progress percent, one decimal
    pub average_progress: f64,
    /// Heuristic 0-100
    pub health_score: u8,
    /// Consecutive recent days with a completion
    pub streak: u32,
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub live: bool,
    pub ready: bool,
    pub store_ok: bool,
    pub reminder_active: bool,
}
