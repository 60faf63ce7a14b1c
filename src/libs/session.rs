//! Local session lifecycle and cache.
//!
//! The session moves through an explicit phase tag instead of ad-hoc
//! booleans: `Establishing` while a login is being recorded (plus its
//! settling delay), `Active` once the token is durable, `Terminating` while
//! a deliberate logout is writing its own fields. The conflict guard keys
//! its suppression rules off this tag.
//!
//! The cached copy of the signed-in user is persisted to the data directory
//! so separate command invocations share one session.

use super::data_storage::DataStorage;
use super::user::User;
use anyhow::Result;
use std::fs;

pub const SESSION_FILE_NAME: &str = ".session.json";

/// Where the local session is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No session held locally.
    #[default]
    SignedOut,
    /// Login in progress; the new token may not be observable yet, so
    /// remote pushes must not be trusted.
    Establishing,
    /// Session established and durable; remote pushes are reconciled.
    Active,
    /// Deliberate logout in progress; the guard is fully disabled so it
    /// cannot re-fire on the logout's own write.
    Terminating,
}

/// On-disk cache of the signed-in user.
pub struct SessionCache {
    storage: DataStorage,
}

impl SessionCache {
    pub fn new() -> Self {
        Self { storage: DataStorage::new() }
    }

    pub fn load(&self) -> Result<Option<User>> {
        let path = self.storage.get_path(SESSION_FILE_NAME)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self, user: &User) -> Result<()> {
        let path = self.storage.get_path(SESSION_FILE_NAME)?;
        fs::write(path, serde_json::to_string_pretty(user)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.storage.get_path(SESSION_FILE_NAME)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}
