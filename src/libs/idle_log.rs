use serde::{Deserialize, Serialize};

pub const AUTO_IDLE: &str = "Auto-Idle";

/// Append-only record of a local inactivity period, produced by the
/// activity monitor when input resumes after the idle threshold.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdleLog {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_ms: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl IdleLog {
    pub fn auto(user_id: &str, user_name: &str, start_time: i64, end_time: i64, date: &str) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            start_time,
            end_time,
            duration_ms: end_time - start_time,
            date: date.to_string(),
            kind: AUTO_IDLE.to_string(),
        }
    }
}
