use super::store::{DocumentStore, WriteOutcome};
use crate::libs::task::{Task, TaskStatus};
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

pub const TASKS: &str = "tasks";

/// Typed operations on the shared task records.
pub struct Tasks {
    store: Arc<DocumentStore>,
}

impl Tasks {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, mut task: Task) -> Result<Task> {
        let body = serde_json::to_value(&task)?;
        task.id = self.store.append(TASKS, body).await?;
        Ok(task)
    }

    pub fn fetch(&self, id: &str) -> Result<Option<Task>> {
        match self.store.read_once(TASKS, id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc.body)?)),
            None => Ok(None),
        }
    }

    /// Fetches a task together with its document version, for writes that
    /// must fail on a stale observation.
    pub fn fetch_versioned(&self, id: &str) -> Result<Option<(Task, i64)>> {
        match self.store.read_once(TASKS, id)? {
            Some(doc) => Ok(Some((serde_json::from_value(doc.body)?, doc.version))),
            None => Ok(None),
        }
    }

    /// All tasks of one user currently marked running. The single-active-task
    /// invariant says at most one, but callers treat this defensively.
    pub fn running_for(&self, user_id: &str) -> Result<Vec<Task>> {
        Ok(self
            .for_user(user_id)?
            .into_iter()
            .filter(|task| task.is_running)
            .collect())
    }

    pub fn for_user(&self, user_id: &str) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        for doc in self.store.list(TASKS)? {
            let task: Task = serde_json::from_value(doc.body)?;
            if task.assigned_to == user_id {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }

    pub fn for_user_on(&self, user_id: &str, date: &str) -> Result<Vec<Task>> {
        Ok(self
            .for_user(user_id)?
            .into_iter()
            .filter(|task| task.date == date)
            .collect())
    }

    /// Marks a task running. Versioned: a concurrent client that started or
    /// mutated the task in between makes this write stale instead of
    /// silently overwriting it.
    pub async fn record_start(&self, id: &str, observed_version: i64, now_ms: i64) -> Result<WriteOutcome> {
        self.store
            .write_if(
                TASKS,
                id,
                observed_version,
                json!({
                    "isRunning": true,
                    "lastStartTime": now_ms,
                    "status": TaskStatus::InProgress,
                }),
            )
            .await
    }

    /// Applies the stop accumulation: `elapsed_ms += now - last_start_time`,
    /// running flag and start marker cleared, optionally the terminal `Done`
    /// status. Returns the accumulated delta.
    pub async fn record_stop(&self, task: &Task, now_ms: i64, done: bool) -> Result<i64> {
        let delta = match task.last_start_time {
            Some(started) if task.is_running => (now_ms - started).max(0),
            _ => 0,
        };
        let mut fields = json!({
            "isRunning": false,
            "lastStartTime": null,
            "elapsedMs": task.elapsed_ms + delta,
        });
        if done {
            fields["status"] = serde_json::to_value(TaskStatus::Done)?;
        }
        self.store.write(TASKS, &task.id, fields).await?;
        Ok(delta)
    }
}
