//! Protocol types for standupd IPC
//!
//! This crate defines the stable API between standupd and its clients:
//! - Commands (requests from popup, options page, CLI)
//! - Responses
//! - Events (service -> clients), including notification requests
//! - Shared views: reminder status, task records, derived statistics

mod commands;
mod events;
mod types;

pub use commands::*;
pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
