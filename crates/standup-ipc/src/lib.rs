//! IPC layer for standupd
//!
//! Newline-delimited JSON over a Unix domain socket. Each line from a client
//! is a `Request`; each line back is either a `Response` or, once the client
//! has subscribed, an `Event`.

mod client;
mod server;

pub use client::*;
pub use server::*;

use thiserror::Error;

/// IPC errors
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Server error: {0}")]
    ServerError(String),
}

impl From<IpcError> for standup_util::StandupError {
    fn from(e: IpcError) -> Self {
        standup_util::StandupError::ipc(e.to_string())
    }
}

pub type IpcResult<T> = Result<T, IpcError>;
