use super::store::DocumentStore;
use crate::libs::breaks::{Break, BreakStatus};
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;

pub const BREAKS: &str = "breaks";

/// Typed operations on the shared break records.
pub struct Breaks {
    store: Arc<DocumentStore>,
}

impl Breaks {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn open(&self, user_id: &str, now_ms: i64, date: &str) -> Result<Break> {
        let mut brk = Break::begin(user_id, now_ms, date);
        let body = serde_json::to_value(&brk)?;
        brk.id = self.store.append(BREAKS, body).await?;
        Ok(brk)
    }

    pub fn fetch(&self, id: &str) -> Result<Option<Break>> {
        match self.store.read_once(BREAKS, id)? {
            Some(doc) => Ok(Some(serde_json::from_value(doc.body)?)),
            None => Ok(None),
        }
    }

    pub fn active_for(&self, user_id: &str) -> Result<Option<Break>> {
        for doc in self.store.list(BREAKS)? {
            let brk: Break = serde_json::from_value(doc.body)?;
            if brk.user_id == user_id && brk.is_active() {
                return Ok(Some(brk));
            }
        }
        Ok(None)
    }

    pub fn for_date(&self, user_id: &str, date: &str) -> Result<Vec<Break>> {
        let mut breaks = Vec::new();
        for doc in self.store.list(BREAKS)? {
            let brk: Break = serde_json::from_value(doc.body)?;
            if brk.user_id == user_id && brk.date == date {
                breaks.push(brk);
            }
        }
        Ok(breaks)
    }

    /// Closes a break. Re-reads the stored record first so that re-running
    /// a partially applied close stays a no-op: an already-completed break
    /// is never closed twice. Returns whether anything was written.
    pub async fn close(&self, id: &str, now_ms: i64) -> Result<bool> {
        let current = match self.fetch(id)? {
            Some(brk) => brk,
            None => return Ok(false),
        };
        if !current.is_active() {
            return Ok(false);
        }

        self.store.write(
            BREAKS,
            id,
            json!({
                "endTime": now_ms,
                "durationMs": now_ms - current.start_time,
                "status": BreakStatus::Completed,
            }),
        )
        .await?;
        Ok(true)
    }
}
