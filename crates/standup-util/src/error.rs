//! Error types for standupd

use thiserror::Error;

use crate::TaskId;

/// Core error type for standupd operations
#[derive(Debug, Error)]
pub enum StandupError {
    #[error("Invalid reminder interval: {0} minutes (must be greater than zero)")]
    InvalidInterval(u32),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("IPC error: {0}")]
    IpcError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StandupError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn ipc(msg: impl Into<String>) -> Self {
        Self::IpcError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StandupError>;
