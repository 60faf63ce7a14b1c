use super::store::DocumentStore;
use crate::libs::idle_log::IdleLog;
use anyhow::Result;
use std::sync::Arc;

pub const IDLE_LOGS: &str = "idle_logs";

/// Append-only idle history produced by the activity monitor.
pub struct IdleLogs {
    store: Arc<DocumentStore>,
}

impl IdleLogs {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn append(&self, mut log: IdleLog) -> Result<IdleLog> {
        let body = serde_json::to_value(&log)?;
        log.id = self.store.append(IDLE_LOGS, body).await?;
        Ok(log)
    }

    pub fn for_date(&self, user_id: &str, date: &str) -> Result<Vec<IdleLog>> {
        let mut logs = Vec::new();
        for doc in self.store.list(IDLE_LOGS)? {
            let log: IdleLog = serde_json::from_value(doc.body)?;
            if log.user_id == user_id && log.date == date {
                logs.push(log);
            }
        }
        Ok(logs)
    }
}
