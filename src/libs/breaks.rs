use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BreakStatus {
    Active,
    Completed,
}

/// A deliberate rest period for one user.
///
/// At most one break is active per user, and an active break excludes any
/// running task. Closing an already-completed break is a no-op so that a
/// partially-applied close can be re-run safely.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Break {
    pub id: String,
    pub user_id: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub duration_ms: Option<i64>,
    pub status: BreakStatus,
    pub date: String,
}

impl Break {
    pub fn begin(user_id: &str, start_time: i64, date: &str) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.to_string(),
            start_time,
            end_time: None,
            duration_ms: None,
            status: BreakStatus::Active,
            date: date.to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BreakStatus::Active
    }
}
