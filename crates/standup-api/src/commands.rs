//! Command types for the standupd protocol

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use standup_util::{ClientId, StandupError, TaskId};
use std::time::Duration;

use crate::{
    API_VERSION, DerivedStats, HealthStatus, NewTask, ReminderAction, ReminderStats,
    ReminderStatus, TaskRecord, TaskUpdate,
};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// The command
    pub command: Command,
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            command,
        }
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Response payload or error
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&StandupError> for ErrorInfo {
    fn from(e: &StandupError) -> Self {
        let code = match e {
            StandupError::InvalidInterval(_) => ErrorCode::InvalidInterval,
            StandupError::TaskNotFound(_) => ErrorCode::TaskNotFound,
            StandupError::ValidationError(_) => ErrorCode::InvalidRequest,
            StandupError::StoreError(_) => ErrorCode::StoreError,
            StandupError::RateLimited => ErrorCode::RateLimited,
            StandupError::IpcError(_) | StandupError::Internal(_) => ErrorCode::InternalError,
        };
        Self::new(code, e.to_string())
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    InvalidInterval,
    TaskNotFound,
    RateLimited,
    StoreError,
    InternalError,
}

/// All possible commands from clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Full reminder state
    GetStatus,

    /// Turn reminders on or off
    Toggle { active: bool },

    /// Change the reminder period
    SetInterval { minutes: u32 },

    /// Suppress reminders for a while (configured default when absent)
    Snooze { duration: Option<Duration> },

    /// Record a stand-up (defaults to now)
    RecordAction { timestamp: Option<DateTime<Local>> },

    /// Report which action the user picked on a reminder; `None` means dismissed
    RespondNotification { action: Option<ReminderAction> },

    /// Day/week/total counters
    GetStats,

    AddTask { task: NewTask },

    UpdateTask { task_id: TaskId, update: TaskUpdate },

    DeleteTask { task_id: TaskId },

    ListTasks,

    /// Derived statistics over the task list
    GetTaskStats,

    /// Subscribe to events (returns immediately, events stream separately)
    SubscribeEvents,

    /// Unsubscribe from events
    UnsubscribeEvents,

    /// Get health status
    GetHealth,

    /// Ping for keepalive
    Ping,
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    Status(ReminderStatus),
    Stats(ReminderStats),
    Snoozed { until: DateTime<Local> },
    ActionRecorded(ReminderStats),
    /// A notification response that mapped to no action
    Dismissed,
    Task(TaskRecord),
    Tasks { tasks: Vec<TaskRecord> },
    TaskDeleted { task_id: TaskId },
    TaskStats(DerivedStats),
    Subscribed { client_id: ClientId },
    Unsubscribed,
    Health(HealthStatus),
    Pong,
}

/// Client connection info (set by IPC layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_id: ClientId,
    /// Unix UID if available
    pub uid: Option<u32>,
}

impl ClientInfo {
    pub fn new() -> Self {
        Self {
            client_id: ClientId::new(),
            uid: None,
        }
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self::new()
    }
}
