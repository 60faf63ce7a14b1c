use serde::{Deserialize, Serialize};

/// Access role of a worker. Only admins survive a remote token revocation
/// without being forced out.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    #[serde(other)]
    Member,
}

/// Liveness status published on the shared user record.
///
/// This is the cross-client visible summary; the fine-grained activity mode
/// (which task, which break) lives on the task/break/interruption records.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OnlineStatus {
    Online,
    Idle,
    Break,
    Offline,
}

/// One live record per worker in the shared store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub fullname: String,
    pub username: String,
    pub role: Role,
    pub online_status: OnlineStatus,
    /// Live session token. `None` means no client holds a session; a remote
    /// push clearing this field is how a forced logout reaches other clients.
    pub session_token: Option<String>,
    /// Last liveness heartbeat, epoch milliseconds.
    pub last_seen: Option<i64>,
}

impl User {
    pub fn new(fullname: &str, username: &str, role: Role) -> Self {
        Self {
            id: String::new(),
            fullname: fullname.to_string(),
            username: username.to_string(),
            role,
            online_status: OnlineStatus::Offline,
            session_token: None,
            last_seen: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
