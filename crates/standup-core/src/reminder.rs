//! Stand-up reminder scheduler

use chrono::{DateTime, Local, NaiveDate, TimeDelta};
use standup_api::{
    CounterScope, Notification, NotificationKind, ReminderAction, ReminderStats, ReminderStatus,
};
use standup_config::{NotificationTexts, ReminderSettings};
use standup_store::{AuditEvent, AuditEventType, ReminderState, Store};
use standup_util::{
    ONE_DAY, ONE_WEEK, Result, StandupError, delay_until_next_midnight, delay_until_next_weekday,
    week_start_of,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{CoreEvent, ScheduleName, TimerDriver, TimerSpec};

/// Owns the reminder state and the three named schedules.
///
/// Every mutation persists the full state record. Persistence failures are
/// logged and otherwise ignored; the in-memory state stays authoritative.
pub struct ReminderScheduler {
    state: ReminderState,
    settings: ReminderSettings,
    messages: NotificationTexts,
    store: Arc<dyn Store>,
    timers: Arc<dyn TimerDriver>,
}

impl ReminderScheduler {
    /// Load the persisted state, or create it from `settings` on first run.
    ///
    /// Does not arm anything; call [`Self::start`] for that.
    pub fn new(
        settings: ReminderSettings,
        messages: NotificationTexts,
        store: Arc<dyn Store>,
        timers: Arc<dyn TimerDriver>,
        now: DateTime<Local>,
    ) -> Self {
        let loaded = match store.load_reminder_state() {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Failed to load reminder state, starting fresh");
                None
            }
        };

        let mut first_run = false;
        let mut state = loaded.unwrap_or_else(|| {
            first_run = true;
            let today = now.date_naive();
            ReminderState::new(
                settings.interval_minutes,
                settings.active,
                today,
                week_start_of(today, settings.week_start),
            )
        });

        if state.interval_minutes == 0 {
            warn!(
                fallback = settings.interval_minutes,
                "Persisted reminder interval is zero, using configured interval"
            );
            state.interval_minutes = settings.interval_minutes;
        }

        info!(
            first_run,
            interval_minutes = state.interval_minutes,
            active = state.active,
            total = state.total_count,
            "Reminder scheduler initialized"
        );

        let scheduler = Self {
            state,
            settings,
            messages,
            store,
            timers,
        };
        if first_run {
            scheduler.persist();
        }
        scheduler
    }

    /// Current persisted record
    pub fn state(&self) -> &ReminderState {
        &self.state
    }

    /// Snooze length used when the user picks "snooze" on a reminder
    pub fn default_snooze(&self) -> Duration {
        self.settings.snooze
    }

    /// Replace the recurring reminder.
    ///
    /// The existing recurrence is always cancelled first, so repeated calls
    /// leave at most one reminder schedule armed. The first reminder fires one
    /// full interval from now.
    pub fn configure(&mut self, interval_minutes: u32, active: bool) -> Result<CoreEvent> {
        if interval_minutes == 0 {
            return Err(StandupError::InvalidInterval(interval_minutes));
        }

        self.timers.cancel(ScheduleName::StandupReminder);

        self.state.interval_minutes = interval_minutes;
        self.state.active = active;

        if active {
            self.timers.arm(TimerSpec::every(
                ScheduleName::StandupReminder,
                self.interval(),
            ));
        }

        self.persist();
        self.audit(AuditEventType::ReminderConfigured {
            interval_minutes,
            active,
        });

        info!(interval_minutes, active, "Reminder configured");

        Ok(CoreEvent::ReminderConfigured {
            interval_minutes,
            active,
        })
    }

    pub fn toggle(&mut self, active: bool) -> Result<CoreEvent> {
        self.configure(self.state.interval_minutes, active)
    }

    pub fn set_interval(&mut self, minutes: u32) -> Result<CoreEvent> {
        self.configure(minutes, self.state.active)
    }

    /// The reminder schedule fired.
    ///
    /// Returns the reminder notification unless reminders are off or a snooze
    /// window is still open. Counters are untouched.
    pub fn on_timer_fired(&self, now: DateTime<Local>) -> Option<CoreEvent> {
        if !self.state.active {
            debug!("Reminder fired while inactive, ignoring");
            return None;
        }

        if let Some(until) = self.state.snooze_until
            && now < until
        {
            debug!(until = %until, "Reminder suppressed by snooze");
            return None;
        }

        info!("Stand-up reminder due");
        Some(CoreEvent::Notify(
            Notification::new(
                NotificationKind::Reminder,
                &self.messages.reminder_title,
                &self.messages.reminder_body,
            )
            .with_actions([ReminderAction::Done, ReminderAction::Snooze]),
        ))
    }

    /// Record a stand-up at `timestamp`
    pub fn acknowledge(&mut self, timestamp: DateTime<Local>) -> CoreEvent {
        self.state.last_action = Some(timestamp);
        self.state.snooze_until = None;
        self.state.daily_count += 1;
        self.state.weekly_count += 1;
        self.state.total_count += 1;

        self.persist();
        self.audit(AuditEventType::ActionRecorded {
            at: timestamp,
            total_count: self.state.total_count,
        });

        info!(
            today = self.state.daily_count,
            week = self.state.weekly_count,
            total = self.state.total_count,
            "Stand-up recorded"
        );

        CoreEvent::Notify(Notification::new(
            NotificationKind::Confirmation,
            &self.messages.confirmation_title,
            self.messages.confirmation_body(self.state.daily_count),
        ))
    }

    /// Suppress reminders until `until`. Counters and timers are untouched.
    pub fn snooze(&mut self, until: DateTime<Local>) -> CoreEvent {
        self.state.snooze_until = Some(until);

        self.persist();
        self.audit(AuditEventType::Snoozed { until });

        info!(until = %until, "Reminders snoozed");

        CoreEvent::Snoozed { until }
    }

    /// Snooze for `duration` from `now` and acknowledge it to the user
    pub fn snooze_for(&mut self, duration: Duration, now: DateTime<Local>) -> Result<CoreEvent> {
        let until = TimeDelta::from_std(duration)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| StandupError::validation("snooze duration out of range"))?;

        self.snooze(until);

        Ok(CoreEvent::Notify(Notification::new(
            NotificationKind::SnoozeAcknowledged,
            &self.messages.snooze_title,
            self.messages.snooze_body(duration),
        )))
    }

    /// The user picked an action on a reminder. `None` means it was dismissed.
    pub fn respond(
        &mut self,
        action: Option<ReminderAction>,
        now: DateTime<Local>,
    ) -> Result<Option<CoreEvent>> {
        match action {
            Some(ReminderAction::Done) => Ok(Some(self.acknowledge(now))),
            Some(ReminderAction::Snooze) => self.snooze_for(self.settings.snooze, now).map(Some),
            None => {
                debug!("Reminder dismissed");
                Ok(None)
            }
        }
    }

    /// Reset the daily counter if `today` is a different day than the last reset
    pub fn check_daily_rollover(&mut self, today: NaiveDate) -> Option<CoreEvent> {
        if today == self.state.last_daily_reset {
            return None;
        }

        info!(
            from = %self.state.last_daily_reset,
            to = %today,
            count = self.state.daily_count,
            "Daily counter rollover"
        );
        self.state.daily_count = 0;
        self.state.last_daily_reset = today;

        self.persist();
        self.audit(AuditEventType::CountersReset {
            scope: CounterScope::Daily,
        });

        Some(CoreEvent::CountersReset {
            scope: CounterScope::Daily,
        })
    }

    /// Reset the weekly counter if `week_start` differs from the last reset
    pub fn check_weekly_rollover(&mut self, week_start: NaiveDate) -> Option<CoreEvent> {
        if week_start == self.state.last_weekly_reset {
            return None;
        }

        info!(
            from = %self.state.last_weekly_reset,
            to = %week_start,
            count = self.state.weekly_count,
            "Weekly counter rollover"
        );
        self.state.weekly_count = 0;
        self.state.last_weekly_reset = week_start;

        self.persist();
        self.audit(AuditEventType::CountersReset {
            scope: CounterScope::Weekly,
        });

        Some(CoreEvent::CountersReset {
            scope: CounterScope::Weekly,
        })
    }

    /// Run both rollover checks for `now`
    pub fn catch_up(&mut self, now: DateTime<Local>) -> Vec<CoreEvent> {
        let today = now.date_naive();
        let week_start = week_start_of(today, self.settings.week_start);

        let mut events = Vec::new();
        events.extend(self.check_daily_rollover(today));
        events.extend(self.check_weekly_rollover(week_start));
        events
    }

    /// Arm all three schedules and catch up on rollovers missed while down
    pub fn start(&mut self, now: DateTime<Local>) -> Vec<CoreEvent> {
        self.timers.cancel(ScheduleName::StandupReminder);
        if self.state.active {
            self.timers.arm(TimerSpec::every(
                ScheduleName::StandupReminder,
                self.interval(),
            ));
        }

        self.timers.arm(TimerSpec::new(
            ScheduleName::DailyReset,
            delay_until_next_midnight(now),
            ONE_DAY,
        ));
        self.timers.arm(TimerSpec::new(
            ScheduleName::WeeklyReset,
            delay_until_next_weekday(now, self.settings.week_start),
            ONE_WEEK,
        ));

        debug!(
            active = self.state.active,
            week_start = %self.settings.week_start,
            "Reminder schedules armed"
        );

        self.catch_up(now)
    }

    /// Dispatch a fired schedule
    pub fn on_schedule(&mut self, name: ScheduleName, now: DateTime<Local>) -> Option<CoreEvent> {
        match name {
            ScheduleName::StandupReminder => self.on_timer_fired(now),
            ScheduleName::DailyReset => self.check_daily_rollover(now.date_naive()),
            ScheduleName::WeeklyReset => {
                self.check_weekly_rollover(week_start_of(now.date_naive(), self.settings.week_start))
            }
        }
    }

    /// Client-facing view of the state
    pub fn status(&self, now: DateTime<Local>) -> ReminderStatus {
        let s = &self.state;
        ReminderStatus {
            interval_minutes: s.interval_minutes,
            active: s.active,
            snoozed: s.snooze_until.is_some_and(|until| now < until),
            snooze_until: s.snooze_until,
            last_action: s.last_action,
            daily_count: s.daily_count,
            weekly_count: s.weekly_count,
            total_count: s.total_count,
            last_daily_reset: s.last_daily_reset,
            last_weekly_reset: s.last_weekly_reset,
        }
    }

    pub fn stats(&self) -> ReminderStats {
        ReminderStats {
            today: self.state.daily_count,
            this_week: self.state.weekly_count,
            total: self.state.total_count,
            last_action: self.state.last_action,
        }
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.state.interval_minutes) * 60)
    }

    fn persist(&self) {
        if let Err(e) = self.store.save_reminder_state(&self.state) {
            warn!(error = %e, "Failed to persist reminder state");
        }
    }

    fn audit(&self, event: AuditEventType) {
        let _ = self.store.append_audit(AuditEvent::new(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualTimers;
    use chrono::TimeZone;
    use standup_api::TaskRecord;
    use standup_store::{SqliteStore, StoreError, StoreResult};
    use standup_util::TaskId;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // Thursday
    fn thursday() -> DateTime<Local> {
        at(2025, 6, 12, 10, 0)
    }

    fn make_scheduler() -> (ReminderScheduler, Arc<ManualTimers>, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let timers = Arc::new(ManualTimers::new());
        let scheduler = ReminderScheduler::new(
            ReminderSettings::default(),
            NotificationTexts::default(),
            store.clone(),
            timers.clone(),
            thursday(),
        );
        (scheduler, timers, store)
    }

    #[test]
    fn test_first_run_state() {
        let (scheduler, _, store) = make_scheduler();
        let state = scheduler.state();

        assert_eq!(state.interval_minutes, 30);
        assert!(state.active);
        assert_eq!(state.total_count, 0);
        assert_eq!(state.last_daily_reset, thursday().date_naive());
        // Default week start is Sunday
        assert_eq!(
            state.last_weekly_reset,
            NaiveDate::from_ymd_opt(2025, 6, 8).unwrap()
        );

        assert_eq!(store.load_reminder_state().unwrap().as_ref(), Some(state));
    }

    #[test]
    fn test_configure_rejects_zero_interval() {
        let (mut scheduler, timers, _) = make_scheduler();
        scheduler.configure(45, true).unwrap();

        let result = scheduler.configure(0, true);
        assert!(matches!(result, Err(StandupError::InvalidInterval(0))));
        assert_eq!(scheduler.state().interval_minutes, 45);
        assert_eq!(
            timers.armed(ScheduleName::StandupReminder).unwrap().period,
            Duration::from_secs(45 * 60)
        );
    }

    #[test]
    fn test_configure_keeps_single_reminder_timer() {
        let (mut scheduler, timers, _) = make_scheduler();

        for (minutes, active) in [(10, true), (20, true), (5, false), (15, true), (15, true)] {
            let cancels_before = timers.cancel_calls();
            scheduler.configure(minutes, active).unwrap();

            assert_eq!(timers.cancel_calls(), cancels_before + 1);
            assert!(timers.armed_count() <= 1);
            assert_eq!(timers.is_armed(ScheduleName::StandupReminder), active);
        }

        let spec = timers.armed(ScheduleName::StandupReminder).unwrap();
        assert_eq!(spec.initial_delay, Duration::from_secs(15 * 60));
        assert_eq!(spec.period, Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_toggle_and_set_interval_keep_other_field() {
        let (mut scheduler, timers, _) = make_scheduler();

        scheduler.set_interval(50).unwrap();
        assert!(scheduler.state().active);

        let event = scheduler.toggle(false).unwrap();
        assert_eq!(
            event,
            CoreEvent::ReminderConfigured {
                interval_minutes: 50,
                active: false
            }
        );
        assert!(!timers.is_armed(ScheduleName::StandupReminder));
    }

    #[test]
    fn test_timer_fired_respects_active_flag() {
        let (mut scheduler, _, _) = make_scheduler();

        let event = scheduler.on_timer_fired(thursday()).unwrap();
        let notification = event.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Reminder);
        assert_eq!(
            notification.actions,
            vec![ReminderAction::Done, ReminderAction::Snooze]
        );

        scheduler.toggle(false).unwrap();
        assert!(scheduler.on_timer_fired(thursday()).is_none());
        assert_eq!(scheduler.state().total_count, 0);
    }

    #[test]
    fn test_snooze_boundary() {
        let (mut scheduler, timers, _) = make_scheduler();
        let until = at(2025, 6, 12, 10, 30);
        let arms_before = timers.arm_calls();

        assert_eq!(scheduler.snooze(until), CoreEvent::Snoozed { until });
        assert_eq!(timers.arm_calls(), arms_before);

        let just_before = until - TimeDelta::seconds(1);
        assert!(scheduler.on_timer_fired(just_before).is_none());
        assert!(scheduler.status(just_before).snoozed);

        assert!(scheduler.on_timer_fired(until).is_some());
        assert!(!scheduler.status(until).snoozed);
    }

    #[test]
    fn test_acknowledge_clears_snooze_and_counts() {
        let (mut scheduler, _, store) = make_scheduler();
        scheduler.snooze(at(2025, 6, 12, 11, 0));

        let now = thursday();
        let event = scheduler.acknowledge(now);
        let notification = event.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Confirmation);
        assert!(notification.body.contains('1'));

        let state = scheduler.state();
        assert_eq!(state.snooze_until, None);
        assert_eq!(state.last_action, Some(now));
        assert_eq!(
            (state.daily_count, state.weekly_count, state.total_count),
            (1, 1, 1)
        );

        scheduler.acknowledge(now);
        let stats = scheduler.stats();
        assert_eq!((stats.today, stats.this_week, stats.total), (2, 2, 2));

        let persisted = store.load_reminder_state().unwrap().unwrap();
        assert_eq!(persisted.total_count, 2);
    }

    #[test]
    fn test_snooze_for() {
        let (mut scheduler, _, _) = make_scheduler();
        let now = thursday();

        let event = scheduler
            .snooze_for(Duration::from_secs(15 * 60), now)
            .unwrap();
        let notification = event.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::SnoozeAcknowledged);
        assert!(notification.body.contains("15"));
        assert_eq!(
            scheduler.state().snooze_until,
            Some(now + TimeDelta::minutes(15))
        );

        assert!(scheduler.snooze_for(Duration::MAX, now).is_err());
    }

    #[test]
    fn test_respond() {
        let (mut scheduler, _, _) = make_scheduler();
        let now = thursday();

        assert!(scheduler.respond(None, now).unwrap().is_none());
        assert_eq!(scheduler.state().total_count, 0);

        scheduler
            .respond(Some(ReminderAction::Snooze), now)
            .unwrap()
            .unwrap();
        assert_eq!(
            scheduler.state().snooze_until,
            Some(now + TimeDelta::minutes(10))
        );

        scheduler
            .respond(Some(ReminderAction::Done), now)
            .unwrap()
            .unwrap();
        assert_eq!(scheduler.state().total_count, 1);
        assert_eq!(scheduler.state().snooze_until, None);
    }

    #[test]
    fn test_daily_rollover() {
        let (mut scheduler, _, _) = make_scheduler();
        scheduler.acknowledge(thursday());
        scheduler.acknowledge(thursday());

        let today = thursday().date_naive();
        assert!(scheduler.check_daily_rollover(today).is_none());
        assert_eq!(scheduler.state().daily_count, 2);

        let tomorrow = today.succ_opt().unwrap();
        assert_eq!(
            scheduler.check_daily_rollover(tomorrow),
            Some(CoreEvent::CountersReset {
                scope: CounterScope::Daily
            })
        );
        assert_eq!(scheduler.state().daily_count, 0);
        assert_eq!(scheduler.state().weekly_count, 2);
        assert_eq!(scheduler.state().total_count, 2);

        assert!(scheduler.check_daily_rollover(tomorrow).is_none());
    }

    #[test]
    fn test_weekly_rollover() {
        let (mut scheduler, _, _) = make_scheduler();
        scheduler.acknowledge(thursday());

        let this_week = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
        assert!(scheduler.check_weekly_rollover(this_week).is_none());

        let next_week = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert!(scheduler.check_weekly_rollover(next_week).is_some());
        assert_eq!(scheduler.state().weekly_count, 0);
        assert_eq!(scheduler.state().daily_count, 1);
        assert!(scheduler.check_weekly_rollover(next_week).is_none());
    }

    #[test]
    fn test_start_arms_schedules_and_catches_up() {
        let (mut scheduler, timers, _) = make_scheduler();
        scheduler.acknowledge(thursday());

        // Service comes back the following Monday
        let monday = at(2025, 6, 16, 9, 0);
        let events = scheduler.start(monday);

        assert_eq!(
            events,
            vec![
                CoreEvent::CountersReset {
                    scope: CounterScope::Daily
                },
                CoreEvent::CountersReset {
                    scope: CounterScope::Weekly
                },
            ]
        );
        assert_eq!(scheduler.state().total_count, 1);

        assert_eq!(timers.armed_count(), 3);
        let daily = timers.armed(ScheduleName::DailyReset).unwrap();
        assert_eq!(daily.initial_delay, Duration::from_secs(15 * 3600));
        assert_eq!(daily.period, ONE_DAY);
        let weekly = timers.armed(ScheduleName::WeeklyReset).unwrap();
        assert_eq!(weekly.period, ONE_WEEK);
        assert_eq!(
            weekly.initial_delay,
            delay_until_next_weekday(monday, chrono::Weekday::Sun)
        );
    }

    #[test]
    fn test_start_inactive_arms_only_rollovers() {
        let (mut scheduler, timers, _) = make_scheduler();
        scheduler.toggle(false).unwrap();

        assert!(scheduler.start(thursday()).is_empty());
        assert!(!timers.is_armed(ScheduleName::StandupReminder));
        assert!(timers.is_armed(ScheduleName::DailyReset));
        assert!(timers.is_armed(ScheduleName::WeeklyReset));
    }

    #[test]
    fn test_on_schedule_dispatch() {
        let (mut scheduler, _, _) = make_scheduler();
        scheduler.acknowledge(thursday());

        let sunday_midnight = at(2025, 6, 15, 0, 0);
        assert_eq!(
            scheduler.on_schedule(ScheduleName::DailyReset, sunday_midnight),
            Some(CoreEvent::CountersReset {
                scope: CounterScope::Daily
            })
        );
        assert_eq!(
            scheduler.on_schedule(ScheduleName::WeeklyReset, sunday_midnight),
            Some(CoreEvent::CountersReset {
                scope: CounterScope::Weekly
            })
        );
        assert!(
            scheduler
                .on_schedule(ScheduleName::StandupReminder, sunday_midnight)
                .is_some()
        );
    }

    #[test]
    fn test_state_survives_restart() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let timers = Arc::new(ManualTimers::new());

        {
            let mut scheduler = ReminderScheduler::new(
                ReminderSettings::default(),
                NotificationTexts::default(),
                store.clone(),
                timers.clone(),
                thursday(),
            );
            scheduler.configure(25, false).unwrap();
            scheduler.acknowledge(thursday());
        }

        let scheduler = ReminderScheduler::new(
            ReminderSettings::default(),
            NotificationTexts::default(),
            store,
            timers,
            thursday(),
        );
        assert_eq!(scheduler.state().interval_minutes, 25);
        assert!(!scheduler.state().active);
        assert_eq!(scheduler.state().total_count, 1);
    }

    struct BrokenStore;

    impl Store for BrokenStore {
        fn append_audit(&self, _event: AuditEvent) -> StoreResult<()> {
            Err(StoreError::Database("disk full".into()))
        }
        fn get_recent_audits(&self, _limit: usize) -> StoreResult<Vec<AuditEvent>> {
            Err(StoreError::Database("disk full".into()))
        }
        fn load_reminder_state(&self) -> StoreResult<Option<ReminderState>> {
            Err(StoreError::Database("disk full".into()))
        }
        fn save_reminder_state(&self, _state: &ReminderState) -> StoreResult<()> {
            Err(StoreError::Database("disk full".into()))
        }
        fn list_tasks(&self) -> StoreResult<Vec<TaskRecord>> {
            Err(StoreError::Database("disk full".into()))
        }
        fn get_task(&self, _id: &TaskId) -> StoreResult<Option<TaskRecord>> {
            Err(StoreError::Database("disk full".into()))
        }
        fn upsert_task(&self, _task: &TaskRecord) -> StoreResult<()> {
            Err(StoreError::Database("disk full".into()))
        }
        fn delete_task(&self, _id: &TaskId) -> StoreResult<bool> {
            Err(StoreError::Database("disk full".into()))
        }
        fn is_healthy(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_persistence_failure_is_not_fatal() {
        let mut scheduler = ReminderScheduler::new(
            ReminderSettings::default(),
            NotificationTexts::default(),
            Arc::new(BrokenStore),
            Arc::new(ManualTimers::new()),
            thursday(),
        );

        scheduler.acknowledge(thursday());
        scheduler.configure(40, true).unwrap();

        assert_eq!(scheduler.state().total_count, 1);
        assert_eq!(scheduler.state().interval_minutes, 40);
    }
}
