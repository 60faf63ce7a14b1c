use super::store::DocumentStore;
use crate::libs::user::{OnlineStatus, User};
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

pub const USERS: &str = "users";

/// Typed operations on the shared user records.
pub struct Users {
    store: Arc<DocumentStore>,
}

impl Users {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, mut user: User) -> Result<User> {
        let body = serde_json::to_value(&user)?;
        user.id = self.store.append(USERS, body).await?;
        Ok(user)
    }

    pub fn fetch(&self, id: &str) -> Result<Option<User>> {
        match self.store.read_once(USERS, id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc.body)?)),
            None => Ok(None),
        }
    }

    /// Finds the user holding the given live session token.
    pub fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        for doc in self.store.list(USERS)? {
            let user: User = serde_json::from_value(doc.body)?;
            if user.session_token.as_deref() == Some(token) {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    pub async fn set_status(&self, id: &str, status: OnlineStatus, last_seen: i64) -> Result<()> {
        self.store
            .write(USERS, id, json!({ "onlineStatus": status, "lastSeen": last_seen }))
            .await?;
        Ok(())
    }

    /// Refreshes the liveness heartbeat without touching the status.
    pub async fn touch(&self, id: &str, last_seen: i64) -> Result<()> {
        self.store.write(USERS, id, json!({ "lastSeen": last_seen })).await?;
        Ok(())
    }

    pub async fn set_token(&self, id: &str, token: Option<&str>) -> Result<()> {
        self.store.write(USERS, id, json!({ "sessionToken": token })).await?;
        Ok(())
    }

    /// Records the logout fields in one document write: offline status,
    /// final heartbeat and the token cleared. Clearing the token is what
    /// tells every other client the session ended.
    pub async fn sign_out(&self, id: &str, last_seen: i64) -> Result<()> {
        self.store.write(
            USERS,
            id,
            json!({
                "onlineStatus": OnlineStatus::Offline,
                "lastSeen": last_seen,
                "sessionToken": null,
            }),
        )
        .await?;
        Ok(())
    }
}
