//! Human-readable rendering of responses and events

use standup_api::{
    DerivedStats, Event, EventPayload, ReminderStats, ReminderStatus, ResponsePayload, TaskRecord,
};
use standup_util::format_datetime_full;

pub fn print_payload(payload: &ResponsePayload) {
    match payload {
        ResponsePayload::Status(status) => print_status(status),
        ResponsePayload::Stats(stats) | ResponsePayload::ActionRecorded(stats) => {
            print_reminder_stats(stats)
        }
        ResponsePayload::Snoozed { until } => {
            println!("Snoozed until {}", format_datetime_full(until))
        }
        ResponsePayload::Dismissed => println!("Dismissed"),
        ResponsePayload::Task(task) => print_task(task),
        ResponsePayload::Tasks { tasks } => {
            if tasks.is_empty() {
                println!("No tasks");
            }
            for task in tasks {
                print_task(task);
            }
        }
        ResponsePayload::TaskDeleted { task_id } => println!("Deleted {}", task_id),
        ResponsePayload::TaskStats(stats) => print_task_stats(stats),
        ResponsePayload::Subscribed { client_id } => println!("Subscribed as {}", client_id),
        ResponsePayload::Unsubscribed => println!("Unsubscribed"),
        ResponsePayload::Health(health) => {
            println!("live:            {}", health.live);
            println!("ready:           {}", health.ready);
            println!("store:           {}", if health.store_ok { "ok" } else { "unavailable" });
            println!("reminder active: {}", health.reminder_active);
        }
        ResponsePayload::Pong => println!("pong"),
    }
}

pub fn print_event(event: &Event) {
    let at = format_datetime_full(&event.timestamp);
    match &event.payload {
        EventPayload::Notification(n) => println!("[{}] {}: {}", at, n.title, n.body),
        EventPayload::StatusChanged(status) => println!(
            "[{}] status: {} every {} min, {} today",
            at,
            if status.active { "on" } else { "off" },
            status.interval_minutes,
            status.daily_count
        ),
        EventPayload::CountersReset { scope } => println!("[{}] {:?} counter reset", at, scope),
        EventPayload::TasksChanged { count } => println!("[{}] task list changed ({})", at, count),
        EventPayload::Shutdown => println!("[{}] service shutting down", at),
    }
}

fn print_status(status: &ReminderStatus) {
    println!(
        "Reminders:  {} (every {} min)",
        if status.active { "on" } else { "off" },
        status.interval_minutes
    );
    if status.snoozed
        && let Some(until) = &status.snooze_until
    {
        println!("Snoozed:    until {}", format_datetime_full(until));
    }
    println!(
        "Stand-ups:  {} today, {} this week, {} total",
        status.daily_count, status.weekly_count, status.total_count
    );
    if let Some(last) = &status.last_action {
        println!("Last:       {}", format_datetime_full(last));
    }
}

fn print_reminder_stats(stats: &ReminderStats) {
    println!(
        "{} today, {} this week, {} total",
        stats.today, stats.this_week, stats.total
    );
}

fn print_task(task: &TaskRecord) {
    let due = task
        .due_date
        .map(|d| format!(" due {}", format_datetime_full(&d)))
        .unwrap_or_default();
    println!(
        "{}  [{:?}/{:?}] {} ({}%, {}){}",
        task.id,
        task.status,
        task.priority,
        task.title,
        task.progress_or_zero(),
        task.task_type,
        due
    );
}

fn print_task_stats(stats: &DerivedStats) {
    println!("Tasks:           {}", stats.total);
    println!(
        "By status:       {} pending, {} in progress, {} completed, {} cancelled",
        stats.by_status.pending,
        stats.by_status.in_progress,
        stats.by_status.completed,
        stats.by_status.cancelled
    );
    println!(
        "By priority:     {} high, {} medium, {} low",
        stats.by_priority.high, stats.by_priority.medium, stats.by_priority.low
    );
    for (task_type, count) in &stats.by_type {
        println!("  {:<14} {}", task_type, count);
    }
    println!("Completion rate: {:.1}%", stats.completion_rate);
    println!("Avg progress:    {:.1}%", stats.average_progress);
    println!("Overdue:         {}", stats.overdue);
    println!("Health score:    {}", stats.health_score);
    println!("Streak:          {} days", stats.streak);
}
