//! Command dispatch
//!
//! Turns client requests and fired schedules into responses plus the events
//! to broadcast. The service loop owns the socket; this module never touches it.

use chrono::{DateTime, Local};
use standup_api::{
    Command, ErrorInfo, Event, EventPayload, HealthStatus, NotificationKind, ReminderAction,
    Request, Response, ResponsePayload,
};
use standup_core::{CoreEvent, ReminderScheduler, ScheduleName, TaskLedger};
use standup_store::{AuditEvent, AuditEventType, Store};
use standup_util::{ClientId, RateLimiter, StandupError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Response for the requesting client and events for every subscriber
#[derive(Debug)]
pub struct Reply {
    pub response: Response,
    pub events: Vec<Event>,
}

pub struct Dispatcher {
    scheduler: Mutex<ReminderScheduler>,
    ledger: TaskLedger,
    store: Arc<dyn Store>,
    rate_limiter: Mutex<RateLimiter>,
}

impl Dispatcher {
    pub fn new(
        scheduler: ReminderScheduler,
        ledger: TaskLedger,
        store: Arc<dyn Store>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            scheduler: Mutex::new(scheduler),
            ledger,
            store,
            rate_limiter: Mutex::new(rate_limiter),
        }
    }

    /// Handle a fired schedule
    pub async fn on_schedule(&self, name: ScheduleName, now: DateTime<Local>) -> Vec<Event> {
        let mut scheduler = self.scheduler.lock().await;
        let event = scheduler.on_schedule(name, now);
        debug!(schedule = %name, produced = event.is_some(), "Schedule fired");

        let mut events = Vec::new();
        publish(&scheduler, event, now, &mut events);
        events
    }

    pub async fn handle_request(
        &self,
        client_id: &ClientId,
        request: Request,
        now: DateTime<Local>,
    ) -> Reply {
        if !self.rate_limiter.lock().await.check(client_id) {
            debug!(client_id = %client_id, "Request rate limited");
            return Reply {
                response: error_response(request.request_id, &StandupError::RateLimited),
                events: Vec::new(),
            };
        }

        let mut events = Vec::new();
        let response = self
            .handle_command(client_id, request.request_id, request.command, now, &mut events)
            .await;

        Reply { response, events }
    }

    pub fn client_connected(&self, client_id: &ClientId, uid: Option<u32>) {
        info!(client_id = %client_id, uid = ?uid, "Client connected");

        let _ = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::ClientConnected {
                client_id: client_id.to_string(),
                uid,
            }));
    }

    pub async fn client_disconnected(&self, client_id: &ClientId) {
        debug!(client_id = %client_id, "Client disconnected");

        let _ = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::ClientDisconnected {
                client_id: client_id.to_string(),
            }));

        self.rate_limiter.lock().await.remove_client(client_id);
    }

    async fn handle_command(
        &self,
        client_id: &ClientId,
        request_id: u64,
        command: Command,
        now: DateTime<Local>,
        out: &mut Vec<Event>,
    ) -> Response {
        match command {
            Command::GetStatus => {
                let mut scheduler = self.scheduler.lock().await;
                let events = scheduler.catch_up(now);
                publish(&scheduler, events, now, out);
                Response::success(request_id, ResponsePayload::Status(scheduler.status(now)))
            }

            Command::Toggle { active } => {
                let mut scheduler = self.scheduler.lock().await;
                match scheduler.toggle(active) {
                    Ok(event) => {
                        publish(&scheduler, Some(event), now, out);
                        Response::success(request_id, ResponsePayload::Status(scheduler.status(now)))
                    }
                    Err(e) => error_response(request_id, &e),
                }
            }

            Command::SetInterval { minutes } => {
                let mut scheduler = self.scheduler.lock().await;
                match scheduler.set_interval(minutes) {
                    Ok(event) => {
                        publish(&scheduler, Some(event), now, out);
                        Response::success(request_id, ResponsePayload::Status(scheduler.status(now)))
                    }
                    Err(e) => {
                        warn!(minutes, error = %e, "Rejected interval change");
                        error_response(request_id, &e)
                    }
                }
            }

            Command::Snooze { duration } => {
                let mut scheduler = self.scheduler.lock().await;
                let duration = duration.unwrap_or_else(|| scheduler.default_snooze());
                match scheduler.snooze_for(duration, now) {
                    Ok(event) => {
                        publish(&scheduler, Some(event), now, out);
                        snoozed_response(request_id, &scheduler)
                    }
                    Err(e) => error_response(request_id, &e),
                }
            }

            Command::RecordAction { timestamp } => {
                let mut scheduler = self.scheduler.lock().await;
                let mut events = scheduler.catch_up(now);
                events.push(scheduler.acknowledge(timestamp.unwrap_or(now)));
                publish(&scheduler, events, now, out);
                Response::success(
                    request_id,
                    ResponsePayload::ActionRecorded(scheduler.stats()),
                )
            }

            Command::RespondNotification { action } => {
                let mut scheduler = self.scheduler.lock().await;
                if action == Some(ReminderAction::Done) {
                    let events = scheduler.catch_up(now);
                    publish(&scheduler, events, now, out);
                }
                match scheduler.respond(action, now) {
                    Ok(event) => {
                        publish(&scheduler, event, now, out);
                        match action {
                            Some(ReminderAction::Done) => Response::success(
                                request_id,
                                ResponsePayload::ActionRecorded(scheduler.stats()),
                            ),
                            Some(ReminderAction::Snooze) => snoozed_response(request_id, &scheduler),
                            None => Response::success(request_id, ResponsePayload::Dismissed),
                        }
                    }
                    Err(e) => error_response(request_id, &e),
                }
            }

            Command::GetStats => {
                let mut scheduler = self.scheduler.lock().await;
                let events = scheduler.catch_up(now);
                publish(&scheduler, events, now, out);
                Response::success(request_id, ResponsePayload::Stats(scheduler.stats()))
            }

            Command::AddTask { task } => match self.ledger.add(task, now) {
                Ok(record) => {
                    self.tasks_changed(out);
                    Response::success(request_id, ResponsePayload::Task(record))
                }
                Err(e) => error_response(request_id, &e),
            },

            Command::UpdateTask { task_id, update } => {
                match self.ledger.update(&task_id, update, now) {
                    Ok(record) => {
                        self.tasks_changed(out);
                        Response::success(request_id, ResponsePayload::Task(record))
                    }
                    Err(e) => error_response(request_id, &e),
                }
            }

            Command::DeleteTask { task_id } => match self.ledger.delete(&task_id) {
                Ok(()) => {
                    self.tasks_changed(out);
                    Response::success(request_id, ResponsePayload::TaskDeleted { task_id })
                }
                Err(e) => error_response(request_id, &e),
            },

            Command::ListTasks => match self.ledger.list() {
                Ok(tasks) => Response::success(request_id, ResponsePayload::Tasks { tasks }),
                Err(e) => error_response(request_id, &e),
            },

            Command::GetTaskStats => match self.ledger.stats(now) {
                Ok(stats) => Response::success(request_id, ResponsePayload::TaskStats(stats)),
                Err(e) => error_response(request_id, &e),
            },

            Command::SubscribeEvents => Response::success(
                request_id,
                ResponsePayload::Subscribed {
                    client_id: client_id.clone(),
                },
            ),

            Command::UnsubscribeEvents => {
                Response::success(request_id, ResponsePayload::Unsubscribed)
            }

            Command::GetHealth => {
                let reminder_active = self.scheduler.lock().await.state().active;
                let store_ok = self.store.is_healthy();
                let health = HealthStatus {
                    live: true,
                    ready: store_ok,
                    store_ok,
                    reminder_active,
                };
                Response::success(request_id, ResponsePayload::Health(health))
            }

            Command::Ping => Response::success(request_id, ResponsePayload::Pong),
        }
    }

    fn tasks_changed(&self, out: &mut Vec<Event>) {
        match self.ledger.list() {
            Ok(tasks) => out.push(Event::new(EventPayload::TasksChanged { count: tasks.len() })),
            Err(e) => warn!(error = %e, "Failed to count tasks after change"),
        }
    }
}

/// Translate scheduler events into client events.
///
/// A status snapshot follows whenever an event changed the reminder state.
fn publish(
    scheduler: &ReminderScheduler,
    events: impl IntoIterator<Item = CoreEvent>,
    now: DateTime<Local>,
    out: &mut Vec<Event>,
) {
    let mut state_changed = false;

    for event in events {
        match event {
            CoreEvent::Notify(notification) => {
                state_changed |= notification.kind != NotificationKind::Reminder;
                out.push(Event::new(EventPayload::Notification(notification)));
            }
            CoreEvent::ReminderConfigured { .. } | CoreEvent::Snoozed { .. } => {
                state_changed = true;
            }
            CoreEvent::CountersReset { scope } => {
                state_changed = true;
                out.push(Event::new(EventPayload::CountersReset { scope }));
            }
        }
    }

    if state_changed {
        out.push(Event::new(EventPayload::StatusChanged(scheduler.status(now))));
    }
}

fn snoozed_response(request_id: u64, scheduler: &ReminderScheduler) -> Response {
    match scheduler.state().snooze_until {
        Some(until) => Response::success(request_id, ResponsePayload::Snoozed { until }),
        None => error_response(
            request_id,
            &StandupError::internal("snooze window missing after snooze"),
        ),
    }
}

fn error_response(request_id: u64, e: &StandupError) -> Response {
    Response::error(request_id, ErrorInfo::from(e))
}
