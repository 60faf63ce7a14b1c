use serde::{Deserialize, Serialize};

/// What caused the outage.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum InterruptionKind {
    #[default]
    #[serde(rename = "Power Cut")]
    PowerCut,
    #[serde(rename = "Admin Reported Outage")]
    AdminReportedOutage,
}

/// A live power/utility outage session for one user.
///
/// At most one active interruption exists per user. Once closed, the record
/// is folded into a [`PowerLog`] history entry and the live document is
/// removed from the store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interruption {
    pub id: String,
    pub user_id: String,
    /// Display name of the affected user, denormalized for history views.
    pub user: String,
    #[serde(rename = "type")]
    pub kind: InterruptionKind,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub duration_ms: Option<i64>,
    pub active: bool,
    pub date: String,
}

impl Interruption {
    pub fn begin(user_id: &str, user: &str, kind: InterruptionKind, start_time: i64, date: &str) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.to_string(),
            user: user.to_string(),
            kind,
            start_time,
            end_time: None,
            duration_ms: None,
            active: true,
            date: date.to_string(),
        }
    }
}

/// Completed outage archived as append-only history.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PowerLog {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration_ms: i64,
    pub date: String,
}
