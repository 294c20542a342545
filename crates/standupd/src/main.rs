//! standupd - The stand-up reminder service
//!
//! Wires together:
//! - Configuration loading
//! - Store initialization
//! - Reminder scheduler and its tokio timers
//! - Task ledger and command dispatch
//! - IPC server

mod dispatch;
mod timers;

use anyhow::{Context, Result};
use clap::Parser;
use standup_api::{Event, EventPayload};
use standup_config::{Settings, load_config, load_config_or_default};
use standup_core::{ReminderScheduler, ScheduleName, TaskLedger};
use standup_ipc::{IpcServer, ServerMessage};
use standup_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use standup_util::{RateLimiter, default_config_path};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::dispatch::Dispatcher;
use crate::timers::TokioTimers;

/// standupd - Stand-up reminders and task statistics
#[derive(Parser, Debug)]
#[command(name = "standupd")]
#[command(about = "Stand-up reminder and task statistics service", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/standup/config.toml, optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Socket path override (or set STANDUP_SOCKET env var)
    #[arg(short, long, env = "STANDUP_SOCKET")]
    socket: Option<PathBuf>,

    /// Data directory override (or set STANDUP_DATA_DIR env var)
    #[arg(short, long, env = "STANDUP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

/// Main service state
struct Service {
    dispatcher: Dispatcher,
    ipc: Arc<IpcServer>,
    store: Arc<dyn Store>,
    // Owns the schedule tasks; dropping it stops them
    _timers: Arc<TokioTimers>,
    fired_rx: mpsc::UnboundedReceiver<ScheduleName>,
}

impl Service {
    async fn new(args: &Args) -> Result<Self> {
        let settings = load_settings(args)?;

        let socket_path = args
            .socket
            .clone()
            .unwrap_or_else(|| settings.service.socket_path.clone());

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| settings.service.data_dir.clone());

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join("standupd.db");
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        info!(db_path = %db_path.display(), "Store initialized");

        store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted))?;

        let (timers, fired_rx) = TokioTimers::new(Handle::current());
        let timers = Arc::new(timers);

        let now = standup_util::now();
        let mut scheduler = ReminderScheduler::new(
            settings.reminder,
            settings.messages,
            store.clone(),
            timers.clone(),
            now,
        );
        for event in scheduler.start(now) {
            debug!(event = ?event, "Startup catch-up");
        }

        let ledger = TaskLedger::new(store.clone());

        let mut ipc = IpcServer::new(&socket_path);
        ipc.start().await?;

        info!(socket_path = %socket_path.display(), "IPC server started");

        // 30 requests per second per client
        let rate_limiter = RateLimiter::new(30, Duration::from_secs(1));

        Ok(Self {
            dispatcher: Dispatcher::new(scheduler, ledger, store.clone(), rate_limiter),
            ipc: Arc::new(ipc),
            store,
            _timers: timers,
            fired_rx,
        })
    }

    async fn run(self) -> Result<()> {
        let ipc = self.ipc.clone();
        let mut ipc_messages = ipc
            .take_message_receiver()
            .await
            .context("IPC message receiver already taken")?;
        let mut fired_rx = self.fired_rx;
        let dispatcher = self.dispatcher;

        let ipc_accept = ipc.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc_accept.run().await {
                error!(error = %e, "IPC server error");
            }
        });

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                Some(name) = fired_rx.recv() => {
                    for event in dispatcher.on_schedule(name, standup_util::now()).await {
                        ipc.broadcast_event(event);
                    }
                }

                Some(msg) = ipc_messages.recv() => {
                    Self::handle_ipc_message(&dispatcher, &ipc, msg).await;
                }
            }
        }

        info!("Shutting down standupd");

        ipc.broadcast_event(Event::new(EventPayload::Shutdown));

        if let Err(e) = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::ServiceStopped))
        {
            warn!(error = %e, "Failed to log service shutdown");
        }

        info!("Shutdown complete");
        Ok(())
    }

    async fn handle_ipc_message(dispatcher: &Dispatcher, ipc: &IpcServer, msg: ServerMessage) {
        match msg {
            ServerMessage::Request { client_id, request } => {
                let reply = dispatcher
                    .handle_request(&client_id, request, standup_util::now())
                    .await;

                let _ = ipc.send_response(&client_id, reply.response).await;
                for event in reply.events {
                    ipc.broadcast_event(event);
                }
            }

            ServerMessage::ClientConnected { client_id, info } => {
                dispatcher.client_connected(&client_id, info.uid);
            }

            ServerMessage::ClientDisconnected { client_id } => {
                dispatcher.client_disconnected(&client_id).await;
            }
        }
    }
}

/// Explicit config paths must exist; the default path may be absent on first run
fn load_settings(args: &Args) -> Result<Settings> {
    let settings = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => {
            let path = default_config_path();
            load_config_or_default(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
    };

    info!(
        interval_minutes = settings.reminder.interval_minutes,
        snooze_secs = settings.reminder.snooze.as_secs(),
        week_start = %settings.reminder.week_start,
        "Configuration loaded"
    );

    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mock_time = standup_util::is_mock_time_active(),
        "standupd starting"
    );

    let service = Service::new(&args).await?;
    service.run().await
}
