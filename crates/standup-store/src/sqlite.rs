//! SQLite-based store implementation

use chrono::{DateTime, Local, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use standup_api::TaskRecord;
use standup_util::TaskId;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{AuditEvent, AuditEventType, ReminderState, Store, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Database("connection lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            -- Reminder state (single row)
            CREATE TABLE IF NOT EXISTS reminder_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                state_json TEXT NOT NULL
            );

            -- Task list
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                task_json TEXT NOT NULL
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_tasks_created ON tasks(created_at);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(|_| standup_util::now());
            let event: AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn load_reminder_state(&self) -> StoreResult<Option<ReminderState>> {
        let conn = self.conn()?;

        let json: Option<String> = conn
            .query_row(
                "SELECT state_json FROM reminder_state WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn save_reminder_state(&self, state: &ReminderState) -> StoreResult<()> {
        let conn = self.conn()?;
        let json = serde_json::to_string(state)?;

        conn.execute(
            r#"
            INSERT INTO reminder_state (id, state_json)
            VALUES (1, ?)
            ON CONFLICT(id)
            DO UPDATE SET state_json = excluded.state_json
            "#,
            [json],
        )?;

        debug!(
            daily = state.daily_count,
            weekly = state.weekly_count,
            total = state.total_count,
            "Reminder state saved"
        );
        Ok(())
    }

    fn list_tasks(&self) -> StoreResult<Vec<TaskRecord>> {
        let conn = self.conn()?;

        let mut stmt =
            conn.prepare("SELECT id, task_json FROM tasks ORDER BY created_at ASC, id ASC")?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let json: String = row.get(1)?;
            Ok((id, json))
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            let (id, json) = row?;
            match serde_json::from_str::<TaskRecord>(&json) {
                Ok(task) => tasks.push(task),
                Err(e) => warn!(task_id = %id, error = %e, "Skipping unreadable task row"),
            }
        }

        Ok(tasks)
    }

    fn get_task(&self, id: &TaskId) -> StoreResult<Option<TaskRecord>> {
        let conn = self.conn()?;

        let json: Option<String> = conn
            .query_row(
                "SELECT task_json FROM tasks WHERE id = ?",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn upsert_task(&self, task: &TaskRecord) -> StoreResult<()> {
        let conn = self.conn()?;
        let json = serde_json::to_string(task)?;

        conn.execute(
            r#"
            INSERT INTO tasks (id, created_at, task_json)
            VALUES (?, ?, ?)
            ON CONFLICT(id)
            DO UPDATE SET task_json = excluded.task_json
            "#,
            params![task.id.to_string(), created_key(&task.created_at), json],
        )?;

        debug!(task_id = %task.id, "Task saved");
        Ok(())
    }

    fn delete_task(&self, id: &TaskId) -> StoreResult<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM tasks WHERE id = ?", [id.to_string()])?;
        Ok(removed > 0)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

/// Sort key for creation order: fixed-width UTC, so text order is time order
/// even when the local offset changed between two tasks.
fn created_key(created_at: &DateTime<Local>) -> String {
    created_at
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Nanos, true)
}
