//! Core logic for standupd
//!
//! This crate contains:
//! - The stand-up reminder scheduler (recurring reminder, snooze, day/week/total counters)
//! - The named timer schedules it drives and a timer driver abstraction
//! - The task ledger and the statistics derived from it

mod events;
mod reminder;
pub mod stats;
mod tasks;
mod timers;

pub use events::*;
pub use reminder::*;
pub use stats::aggregate;
pub use tasks::*;
pub use timers::*;
