//! Integration tests for standupd
//!
//! These exercise the service components together: config, store,
//! scheduler, task ledger and the IPC layer.

use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone};
use standup_api::{
    Command, Event, EventPayload, NewTask, NotificationKind, ReminderAction, Response,
    ResponsePayload, ResponseResult, TaskStatus, TaskUpdate,
};
use standup_config::{NotificationTexts, ReminderSettings, parse_config};
use standup_core::{CoreEvent, ManualTimers, ReminderScheduler, ScheduleName, TaskLedger};
use standup_ipc::{IpcClient, IpcServer, ServerMessage};
use standup_store::{AuditEventType, SqliteStore, Store};
use std::sync::Arc;
use std::time::Duration;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn scheduler_with(
    store: Arc<dyn Store>,
    timers: Arc<ManualTimers>,
    now: DateTime<Local>,
) -> ReminderScheduler {
    ReminderScheduler::new(
        ReminderSettings::default(),
        NotificationTexts::default(),
        store,
        timers,
        now,
    )
}

#[test]
fn test_reminder_day() {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    let timers = Arc::new(ManualTimers::new());
    let morning = at(2025, 6, 12, 9, 0);

    let mut scheduler = scheduler_with(store.clone(), timers.clone(), morning);
    assert!(scheduler.start(morning).is_empty());
    assert_eq!(timers.armed_count(), 3);

    // First reminder
    let first = morning + TimeDelta::minutes(30);
    let reminder = scheduler
        .on_schedule(ScheduleName::StandupReminder, first)
        .unwrap();
    assert_eq!(
        reminder.notification().unwrap().kind,
        NotificationKind::Reminder
    );

    // User snoozes from the notification
    scheduler
        .respond(Some(ReminderAction::Snooze), first)
        .unwrap()
        .unwrap();

    // Next tick lands inside the snooze window
    let second = first + TimeDelta::minutes(5);
    assert!(
        scheduler
            .on_schedule(ScheduleName::StandupReminder, second)
            .is_none()
    );

    // After the window the reminder fires again and is acknowledged
    let third = first + TimeDelta::minutes(30);
    assert!(
        scheduler
            .on_schedule(ScheduleName::StandupReminder, third)
            .is_some()
    );
    scheduler
        .respond(Some(ReminderAction::Done), third)
        .unwrap()
        .unwrap();

    let stats = scheduler.stats();
    assert_eq!((stats.today, stats.this_week, stats.total), (1, 1, 1));
    assert_eq!(stats.last_action, Some(third));

    // Midnight
    let midnight = at(2025, 6, 13, 0, 0);
    assert_eq!(
        scheduler.on_schedule(ScheduleName::DailyReset, midnight),
        Some(CoreEvent::CountersReset {
            scope: standup_api::CounterScope::Daily
        })
    );
    let stats = scheduler.stats();
    assert_eq!((stats.today, stats.this_week, stats.total), (0, 1, 1));

    let audits = store.get_recent_audits(50).unwrap();
    assert!(
        audits
            .iter()
            .any(|a| matches!(a.event, AuditEventType::ActionRecorded { total_count: 1, .. }))
    );
    assert!(
        audits
            .iter()
            .any(|a| matches!(a.event, AuditEventType::Snoozed { .. }))
    );
}

#[test]
fn test_restart_catches_up_missed_rollovers() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("standupd.db");
    let thursday = at(2025, 6, 12, 17, 0);

    {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&db_path).unwrap());
        let mut scheduler = scheduler_with(store, Arc::new(ManualTimers::new()), thursday);
        scheduler.start(thursday);
        scheduler.acknowledge(thursday);
        scheduler.acknowledge(thursday + TimeDelta::minutes(40));
        scheduler.set_interval(50).unwrap();
    }

    // Down over the weekend; back up Monday
    let monday = at(2025, 6, 16, 8, 30);
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&db_path).unwrap());
    let timers = Arc::new(ManualTimers::new());
    let mut scheduler = scheduler_with(store, timers.clone(), monday);

    assert_eq!(scheduler.state().daily_count, 2);
    let events = scheduler.start(monday);
    assert_eq!(events.len(), 2);

    let state = scheduler.state();
    assert_eq!(state.interval_minutes, 50);
    assert_eq!((state.daily_count, state.weekly_count), (0, 0));
    assert_eq!(state.total_count, 2);
    assert_eq!(state.last_daily_reset, monday.date_naive());
    assert_eq!(
        state.last_weekly_reset,
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    );
    assert_eq!(
        timers
            .armed(ScheduleName::StandupReminder)
            .unwrap()
            .initial_delay,
        Duration::from_secs(50 * 60)
    );
}

#[test]
fn test_config_drives_first_run() {
    let settings = parse_config(
        r#"
        config_version = 1

        [reminder]
        interval_minutes = 45
        active = false
        snooze_minutes = 5
        week_start = "monday"

        [notifications]
        confirmation_body = "Logged! {today} so far."
        "#,
    )
    .unwrap();

    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    let timers = Arc::new(ManualTimers::new());
    let thursday = at(2025, 6, 12, 10, 0);

    let mut scheduler = ReminderScheduler::new(
        settings.reminder,
        settings.messages,
        store,
        timers.clone(),
        thursday,
    );
    scheduler.start(thursday);

    assert_eq!(scheduler.state().interval_minutes, 45);
    assert!(!timers.is_armed(ScheduleName::StandupReminder));
    assert_eq!(
        scheduler.state().last_weekly_reset,
        NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
    );
    assert_eq!(scheduler.default_snooze(), Duration::from_secs(5 * 60));

    let event = scheduler.acknowledge(thursday);
    assert_eq!(event.notification().unwrap().body, "Logged! 1 so far.");
}

#[test]
fn test_task_ledger_stats() {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    let ledger = TaskLedger::new(store);
    let now = at(2025, 6, 12, 12, 0);

    let mut ids = Vec::new();
    for i in 0..10 {
        let mut task = NewTask::titled(format!("task {i}"));
        task.task_type = if i % 2 == 0 { "work" } else { "home" }.into();
        if i >= 5 {
            task.due_date = Some(now - TimeDelta::days(1));
        }
        ids.push(ledger.add(task, now - TimeDelta::days(3)).unwrap().id);
    }

    // Complete the first eight: yesterday and today
    for (i, id) in ids.iter().take(8).enumerate() {
        let when = if i < 4 { now - TimeDelta::days(1) } else { now };
        ledger
            .update(
                id,
                TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
                when,
            )
            .unwrap();
    }

    let stats = ledger.stats(now).unwrap();
    assert_eq!(stats.total, 10);
    assert_eq!(stats.by_status.completed, 8);
    assert_eq!(stats.completion_rate, 80.0);
    assert_eq!(stats.overdue, 2);
    assert_eq!(stats.health_score, 80);
    assert_eq!(stats.streak, 2);
    assert_eq!(stats.by_type.get("work"), Some(&5));
    assert_eq!(stats.average_progress, 80.0);
}

#[tokio::test]
async fn test_subscribed_client_receives_events() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("standupd.sock");

    let mut server = IpcServer::new(&socket_path);
    server.start().await.unwrap();
    let mut messages = server.take_message_receiver().await.unwrap();
    let server = Arc::new(server);

    let accept = server.clone();
    tokio::spawn(async move {
        let _ = accept.run().await;
    });

    // Minimal dispatcher: acknowledge subscriptions, then push a reminder
    let dispatcher = server.clone();
    tokio::spawn(async move {
        while let Some(msg) = messages.recv().await {
            if let ServerMessage::Request { client_id, request } = msg {
                let response = match request.command {
                    Command::SubscribeEvents => Response::success(
                        request.request_id,
                        ResponsePayload::Subscribed {
                            client_id: client_id.clone(),
                        },
                    ),
                    _ => Response::success(request.request_id, ResponsePayload::Pong),
                };
                let _ = dispatcher.send_response(&client_id, response).await;

                dispatcher.broadcast_event(Event::new(EventPayload::Notification(
                    standup_api::Notification::new(
                        NotificationKind::Reminder,
                        "Time to stand up!",
                        "Stretch",
                    )
                    .with_actions([ReminderAction::Done, ReminderAction::Snooze]),
                )));
            }
        }
    });

    let client = IpcClient::connect(&socket_path).await.unwrap();
    let mut events = client.subscribe().await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), events.next())
        .await
        .unwrap()
        .unwrap();
    match event.payload {
        EventPayload::Notification(n) => {
            assert_eq!(n.kind, NotificationKind::Reminder);
            assert_eq!(n.actions.len(), 2);
        }
        other => panic!("Expected notification, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_request_gets_error_response() {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("standupd.sock");

    let mut server = IpcServer::new(&socket_path);
    server.start().await.unwrap();
    let server = Arc::new(server);
    let accept = server.clone();
    tokio::spawn(async move {
        let _ = accept.run().await;
    });

    let stream = tokio::net::UnixStream::connect(&socket_path).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    write_half
        .write_all(b"{\"request_id\":1,\"api_version\":1,\"command\":{\"type\":\"nope\"}}\n")
        .await
        .unwrap();

    let mut line = String::new();
    let mut reader = BufReader::new(read_half);
    tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut line))
        .await
        .unwrap()
        .unwrap();

    let response: Response = serde_json::from_str(line.trim()).unwrap();
    match response.result {
        ResponseResult::Err(e) => assert_eq!(e.code, standup_api::ErrorCode::InvalidRequest),
        ResponseResult::Ok(_) => panic!("expected error"),
    }
}
