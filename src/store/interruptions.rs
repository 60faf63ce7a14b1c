use super::store::DocumentStore;
use crate::libs::interruption::{Interruption, InterruptionKind, PowerLog};
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

pub const INTERRUPTIONS: &str = "interruptions";
pub const POWER_LOGS: &str = "power_logs";

/// Outages shorter than this are closed without an archive entry.
const ARCHIVE_THRESHOLD_MS: i64 = 1000;

/// Typed operations on live interruption records and their archived
/// power-log history.
pub struct Interruptions {
    store: Arc<DocumentStore>,
}

impl Interruptions {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn open(&self, user_id: &str, user_name: &str, kind: InterruptionKind, now_ms: i64, date: &str) -> Result<Interruption> {
        let mut interruption = Interruption::begin(user_id, user_name, kind, now_ms, date);
        let body = serde_json::to_value(&interruption)?;
        interruption.id = self.store.append(INTERRUPTIONS, body).await?;
        Ok(interruption)
    }

    pub fn active_for(&self, user_id: &str) -> Result<Option<Interruption>> {
        for doc in self.store.list(INTERRUPTIONS)? {
            let interruption: Interruption = serde_json::from_value(doc.body)?;
            if interruption.user_id == user_id && interruption.active {
                return Ok(Some(interruption));
            }
        }
        Ok(None)
    }

    /// Closes a live interruption: records the end on the live document
    /// first, then folds it into an append-only power log (when long enough
    /// to matter) and removes the live record. Ordered so a crash mid-way
    /// never leaves the user observably stuck in the outage mode.
    pub async fn close(&self, interruption: &Interruption, now_ms: i64) -> Result<Option<PowerLog>> {
        let duration_ms = now_ms - interruption.start_time;
        self.store.write(
            INTERRUPTIONS,
            &interruption.id,
            json!({
                "active": false,
                "endTime": now_ms,
                "durationMs": duration_ms,
            }),
        )
        .await?;

        let archived = if duration_ms > ARCHIVE_THRESHOLD_MS {
            let log = PowerLog {
                id: String::new(),
                user_id: interruption.user_id.clone(),
                user_name: interruption.user.clone(),
                start_time: interruption.start_time,
                end_time: now_ms,
                duration_ms,
                date: interruption.date.clone(),
            };
            let mut log = log;
            log.id = self.store.append(POWER_LOGS, serde_json::to_value(&log)?).await?;
            Some(log)
        } else {
            None
        };

        self.store.remove(INTERRUPTIONS, &interruption.id).await?;
        Ok(archived)
    }

    pub fn power_logs_for(&self, user_id: &str, date: &str) -> Result<Vec<PowerLog>> {
        let mut logs = Vec::new();
        for doc in self.store.list(POWER_LOGS)? {
            let log: PowerLog = serde_json::from_value(doc.body)?;
            if log.user_id == user_id && log.date == date {
                logs.push(log);
            }
        }
        Ok(logs)
    }
}
