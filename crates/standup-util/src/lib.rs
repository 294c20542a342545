//! Shared utilities for standupd
//!
//! This crate provides:
//! - ID types (TaskId, ClientId)
//! - Time utilities (mockable wall clock, day/week boundaries, rollover delays)
//! - Error types
//! - Rate limiting helpers
//! - Default paths for socket, config, and data directories

mod error;
mod ids;
mod paths;
mod rate_limit;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use rate_limit::*;
pub use time::*;
