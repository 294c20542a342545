//! standup-ctl - command-line client for standupd

mod output;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use standup_api::{
    Command, NewTask, ReminderAction, ResponseResult, TaskStatus, TaskUpdate,
};
use standup_ipc::IpcClient;
use standup_util::{TaskId, default_socket_path, local_midnight};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Control the stand-up reminder service and the task list
#[derive(Parser, Debug)]
#[command(name = "standup-ctl", version, about, propagate_version = true)]
struct Cli {
    /// Socket path (or set STANDUP_SOCKET env var)
    #[arg(short, long, env = "STANDUP_SOCKET", default_value_os_t = default_socket_path())]
    socket: PathBuf,

    /// Print raw JSON payloads instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: CtlCommand,
}

#[derive(Subcommand, Debug)]
enum CtlCommand {
    /// Show the reminder state
    #[command(alias = "s")]
    Status,

    /// Turn reminders on
    On,

    /// Turn reminders off
    Off,

    /// Set the reminder interval in minutes
    Interval { minutes: u32 },

    /// Snooze reminders (configured default when no minutes are given)
    Snooze { minutes: Option<u64> },

    /// Record a stand-up now
    #[command(alias = "d")]
    Done,

    /// Answer the last reminder: done, snooze or dismiss
    Respond { action: String },

    /// Show day/week/total counts
    Stats,

    /// Manage tasks
    #[command(alias = "t")]
    Tasks {
        #[command(subcommand)]
        action: Option<TaskCommand>,
    },

    /// Service health
    Health,

    Ping,

    /// Print events as they arrive
    #[command(alias = "w")]
    Watch,
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    List,

    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(long)]
        priority: Option<String>,
        /// Free-form category
        #[arg(long = "type")]
        task_type: Option<String>,
        /// RFC 3339 timestamp or YYYY-MM-DD (due by the end of that day)
        #[arg(long)]
        due: Option<String>,
    },

    Start { id: String },

    #[command(alias = "done")]
    Complete { id: String },

    Cancel { id: String },

    /// Reopen a completed or cancelled task
    Reopen { id: String },

    Progress { id: String, percent: u8 },

    #[command(alias = "rm")]
    Delete { id: String },

    /// Completion rate, health score, streak and distributions
    #[command(alias = "stat")]
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let CtlCommand::Watch = cli.command {
        return watch(&cli.socket, cli.json).await;
    }

    let command = to_command(cli.command)?;
    debug!(command = ?command, "Sending");

    let mut client = IpcClient::connect(&cli.socket)
        .await
        .with_context(|| format!("Failed to connect to standupd at {:?}", cli.socket))?;
    let response = client.send(command).await?;

    match response.result {
        ResponseResult::Ok(payload) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                output::print_payload(&payload);
            }
            Ok(())
        }
        ResponseResult::Err(e) => bail!("{:?}: {}", e.code, e.message),
    }
}

fn to_command(command: CtlCommand) -> Result<Command> {
    Ok(match command {
        CtlCommand::Status => Command::GetStatus,
        CtlCommand::On => Command::Toggle { active: true },
        CtlCommand::Off => Command::Toggle { active: false },
        CtlCommand::Interval { minutes } => Command::SetInterval { minutes },
        CtlCommand::Snooze { minutes } => Command::Snooze {
            duration: minutes.map(snooze_minutes).transpose()?,
        },
        CtlCommand::Done => Command::RecordAction { timestamp: None },
        CtlCommand::Respond { action } => Command::RespondNotification {
            action: match action.as_str() {
                "dismiss" | "dismissed" => None,
                other => Some(parse_wire::<ReminderAction>(other)?),
            },
        },
        CtlCommand::Stats => Command::GetStats,
        CtlCommand::Tasks { action } => task_command(action.unwrap_or(TaskCommand::List))?,
        CtlCommand::Health => Command::GetHealth,
        CtlCommand::Ping => Command::Ping,
        CtlCommand::Watch => Command::SubscribeEvents,
    })
}

fn task_command(action: TaskCommand) -> Result<Command> {
    Ok(match action {
        TaskCommand::List => Command::ListTasks,
        TaskCommand::Add {
            title,
            description,
            priority,
            task_type,
            due,
        } => {
            let mut task = NewTask::titled(title);
            task.description = description;
            if let Some(p) = priority {
                task.priority = parse_wire(&p)?;
            }
            if let Some(t) = task_type {
                task.task_type = t;
            }
            task.due_date = due.as_deref().map(parse_due).transpose()?;
            Command::AddTask { task }
        }
        TaskCommand::Start { id } => set_status(&id, TaskStatus::InProgress)?,
        TaskCommand::Complete { id } => set_status(&id, TaskStatus::Completed)?,
        TaskCommand::Cancel { id } => set_status(&id, TaskStatus::Cancelled)?,
        TaskCommand::Reopen { id } => set_status(&id, TaskStatus::Pending)?,
        TaskCommand::Progress { id, percent } => Command::UpdateTask {
            task_id: parse_task_id(&id)?,
            update: TaskUpdate {
                progress: Some(percent),
                ..Default::default()
            },
        },
        TaskCommand::Delete { id } => Command::DeleteTask {
            task_id: parse_task_id(&id)?,
        },
        TaskCommand::Stats => Command::GetTaskStats,
    })
}

fn set_status(id: &str, status: TaskStatus) -> Result<Command> {
    Ok(Command::UpdateTask {
        task_id: parse_task_id(id)?,
        update: TaskUpdate {
            status: Some(status),
            ..Default::default()
        },
    })
}

fn snooze_minutes(minutes: u64) -> Result<Duration> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .with_context(|| format!("Snooze of {} minutes is too long", minutes))
}

fn parse_task_id(id: &str) -> Result<TaskId> {
    id.parse()
        .with_context(|| format!("Invalid task id: {}", id))
}

/// Parse a value by its wire name, e.g. "high" or "snooze"
fn parse_wire<T: DeserializeOwned>(s: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .with_context(|| format!("Unrecognized value: {}", s))
}

fn parse_due(s: &str) -> Result<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid due date: {}", s))?;
    let next_day = date.succ_opt().context("Due date out of range")?;
    Ok(local_midnight(next_day))
}

async fn watch(socket: &Path, json: bool) -> Result<()> {
    let client = IpcClient::connect(socket)
        .await
        .with_context(|| format!("Failed to connect to standupd at {:?}", socket))?;
    let mut events = client.subscribe().await?;

    loop {
        let event = events.next().await?;
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            output::print_event(&event);
        }
    }
}
