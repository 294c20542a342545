//! Task list owned by the service

use chrono::{DateTime, Local};
use standup_api::{DerivedStats, NewTask, TaskRecord, TaskStatus, TaskUpdate};
use standup_store::{AuditEvent, AuditEventType, Store};
use standup_util::{Result, StandupError, TaskId};
use std::sync::Arc;
use tracing::{debug, info};

use crate::stats;

/// Task CRUD on top of the store, with status transition bookkeeping
pub struct TaskLedger {
    store: Arc<dyn Store>,
}

impl TaskLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn add(&self, new: NewTask, now: DateTime<Local>) -> Result<TaskRecord> {
        let title = validate_title(&new.title)?;
        validate_progress(new.progress)?;

        let mut task = TaskRecord {
            id: TaskId::new(),
            title,
            description: new.description,
            status: TaskStatus::Pending,
            priority: new.priority,
            task_type: new.task_type,
            progress: new.progress,
            created_at: now,
            due_date: new.due_date,
            completed_at: None,
        };
        apply_status(&mut task, new.status, now);

        self.store.upsert_task(&task)?;
        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::TaskAdded {
            task_id: task.id.clone(),
        }));

        info!(task_id = %task.id, title = %task.title, "Task added");
        Ok(task)
    }

    /// Patch a task. Absent fields are left unchanged.
    pub fn update(&self, id: &TaskId, update: TaskUpdate, now: DateTime<Local>) -> Result<TaskRecord> {
        let mut task = self.get(id)?;

        if let Some(title) = update.title {
            task.title = validate_title(&title)?;
        }
        validate_progress(update.progress)?;

        if let Some(description) = update.description {
            task.description = Some(description);
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(task_type) = update.task_type {
            task.task_type = task_type;
        }
        if let Some(progress) = update.progress {
            task.progress = Some(progress);
        }
        if update.clear_due_date {
            task.due_date = None;
        } else if let Some(due) = update.due_date {
            task.due_date = Some(due);
        }
        if let Some(status) = update.status {
            apply_status(&mut task, status, now);
        }

        self.store.upsert_task(&task)?;
        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::TaskUpdated {
            task_id: task.id.clone(),
        }));

        debug!(task_id = %task.id, status = ?task.status, "Task updated");
        Ok(task)
    }

    pub fn delete(&self, id: &TaskId) -> Result<()> {
        if !self.store.delete_task(id)? {
            return Err(StandupError::TaskNotFound(id.clone()));
        }

        let _ = self.store.append_audit(AuditEvent::new(AuditEventType::TaskDeleted {
            task_id: id.clone(),
        }));

        info!(task_id = %id, "Task deleted");
        Ok(())
    }

    pub fn get(&self, id: &TaskId) -> Result<TaskRecord> {
        self.store
            .get_task(id)?
            .ok_or_else(|| StandupError::TaskNotFound(id.clone()))
    }

    /// All tasks in creation order
    pub fn list(&self) -> Result<Vec<TaskRecord>> {
        Ok(self.store.list_tasks()?)
    }

    pub fn stats(&self, now: DateTime<Local>) -> Result<DerivedStats> {
        let tasks = self.list()?;
        Ok(stats::aggregate(&tasks, now))
    }
}

/// Moving into `completed` stamps the completion and fills progress; moving
/// out of it clears the stamp.
fn apply_status(task: &mut TaskRecord, status: TaskStatus, now: DateTime<Local>) {
    if status == TaskStatus::Completed {
        if task.completed_at.is_none() {
            task.completed_at = Some(now);
        }
        task.progress = Some(100);
    } else {
        task.completed_at = None;
    }
    task.status = status;
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(StandupError::validation("task title cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_progress(progress: Option<u8>) -> Result<()> {
    match progress {
        Some(p) if p > 100 => Err(StandupError::validation(format!(
            "progress must be between 0 and 100, got {p}"
        ))),
        _ => Ok(()),
    }
}
