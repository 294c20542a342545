//! Core events emitted by the scheduler

use chrono::{DateTime, Local};
use standup_api::{CounterScope, Notification};

/// Events emitted by the reminder scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// The presentation layer should show this notification
    Notify(Notification),

    /// Recurrence or on/off state changed
    ReminderConfigured { interval_minutes: u32, active: bool },

    /// Reminders suppressed until the given instant
    Snoozed { until: DateTime<Local> },

    /// A calendar rollover reset a counter
    CountersReset { scope: CounterScope },
}

impl CoreEvent {
    /// The notification carried by this event, if any
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            CoreEvent::Notify(n) => Some(n),
            _ => None,
        }
    }
}
