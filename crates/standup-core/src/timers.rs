//! Named timer schedules and the driver abstraction that arms them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// The schedules the reminder scheduler owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleName {
    StandupReminder,
    DailyReset,
    WeeklyReset,
}

impl ScheduleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleName::StandupReminder => "standupReminder",
            ScheduleName::DailyReset => "dailyReset",
            ScheduleName::WeeklyReset => "weeklyReset",
        }
    }
}

impl fmt::Display for ScheduleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A periodic trigger: fires once after `initial_delay`, then every `period`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSpec {
    pub name: ScheduleName,
    pub initial_delay: Duration,
    pub period: Duration,
}

impl TimerSpec {
    pub fn new(name: ScheduleName, initial_delay: Duration, period: Duration) -> Self {
        Self {
            name,
            initial_delay,
            period,
        }
    }

    /// Fires every `period`, first one `period` from now
    pub fn every(name: ScheduleName, period: Duration) -> Self {
        Self::new(name, period, period)
    }
}

/// External timer subsystem.
///
/// Implementations deliver fired schedules back to the owner of the
/// scheduler, which calls [`crate::ReminderScheduler::on_schedule`].
pub trait TimerDriver: Send + Sync {
    /// Arm a schedule, replacing any existing schedule with the same name
    fn arm(&self, spec: TimerSpec);

    /// Cancel a schedule. Cancelling an unarmed schedule is a no-op.
    fn cancel(&self, name: ScheduleName);
}

/// In-memory driver that only records what is armed.
///
/// Nothing ever fires on its own; callers drive the scheduler directly.
#[derive(Debug, Default)]
pub struct ManualTimers {
    inner: Mutex<ManualTimersInner>,
}

#[derive(Debug, Default)]
struct ManualTimersInner {
    armed: HashMap<ScheduleName, TimerSpec>,
    arm_calls: usize,
    cancel_calls: usize,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spec currently armed under `name`
    pub fn armed(&self, name: ScheduleName) -> Option<TimerSpec> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.armed.get(&name).copied())
    }

    pub fn is_armed(&self, name: ScheduleName) -> bool {
        self.armed(name).is_some()
    }

    /// Number of schedules currently armed
    pub fn armed_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.armed.len()).unwrap_or(0)
    }

    pub fn arm_calls(&self) -> usize {
        self.inner.lock().map(|inner| inner.arm_calls).unwrap_or(0)
    }

    pub fn cancel_calls(&self) -> usize {
        self.inner.lock().map(|inner| inner.cancel_calls).unwrap_or(0)
    }
}

impl TimerDriver for ManualTimers {
    fn arm(&self, spec: TimerSpec) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.arm_calls += 1;
            inner.armed.insert(spec.name, spec);
        }
    }

    fn cancel(&self, name: ScheduleName) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.cancel_calls += 1;
            inner.armed.remove(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_wire_names() {
        assert_eq!(
            serde_json::to_value(ScheduleName::StandupReminder).unwrap(),
            "standupReminder"
        );
        assert_eq!(
            serde_json::to_value(ScheduleName::WeeklyReset).unwrap(),
            "weeklyReset"
        );
        assert_eq!(ScheduleName::DailyReset.to_string(), "dailyReset");
    }

    #[test]
    fn arming_replaces_same_name() {
        let timers = ManualTimers::new();
        let name = ScheduleName::StandupReminder;

        timers.arm(TimerSpec::every(name, Duration::from_secs(60)));
        timers.arm(TimerSpec::every(name, Duration::from_secs(120)));

        assert_eq!(timers.armed_count(), 1);
        assert_eq!(timers.arm_calls(), 2);
        assert_eq!(timers.armed(name).unwrap().period, Duration::from_secs(120));
    }

    #[test]
    fn cancel_unarmed_is_noop() {
        let timers = ManualTimers::new();
        timers.cancel(ScheduleName::DailyReset);
        assert_eq!(timers.armed_count(), 0);
        assert_eq!(timers.cancel_calls(), 1);
    }
}
