use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

/// A unit of billable work assigned to one user.
///
/// `elapsed_ms` only ever grows, and only by `now - last_start_time` captured
/// at a stop transition. `is_running == true` exactly when `last_start_time`
/// is set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    /// Id of the user this task is assigned to.
    pub assigned_to: String,
    pub date: String,
    pub project: String,
    pub description: String,
    pub estimated_hours: f64,
    pub status: TaskStatus,
    pub is_running: bool,
    pub last_start_time: Option<i64>,
    pub elapsed_ms: i64,
}

impl Task {
    pub fn new(assigned_to: &str, date: &str, project: &str, description: &str, estimated_hours: f64) -> Self {
        Self {
            id: String::new(),
            assigned_to: assigned_to.to_string(),
            date: date.to_string(),
            project: project.to_string(),
            description: description.to_string(),
            estimated_hours,
            status: TaskStatus::Todo,
            is_running: false,
            last_start_time: None,
            elapsed_ms: 0,
        }
    }

    /// Stored elapsed time plus the in-flight session if the task is running.
    pub fn current_elapsed_ms(&self, now_ms: i64) -> i64 {
        match (self.is_running, self.last_start_time) {
            (true, Some(started)) => self.elapsed_ms + (now_ms - started),
            _ => self.elapsed_ms,
        }
    }
}
