//! Shared document store seam.
//!
//! Thin abstraction over the backing store the clients share: one document
//! at a time is the unit of read, merge-write and change subscription, with
//! document-granularity last-write-wins and no atomicity across documents.
//! Callers order multi-record effects so a partial failure leaves the
//! invariants intact.
//!
//! Every confirmed mutation is echoed to subscribers, including the
//! originator's own writes. Each document carries a monotonic version; a
//! compare-and-swap write path lets callers reject mutations based on a
//! stale observation instead of silently losing a cross-client race.
//!
//! Writes are retried with linear backoff before a failure is surfaced,
//! so transient store hiccups do not leak into session transitions.

use crate::libs::config::SyncConfig;
use crate::libs::data_storage::DataStorage;
use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

pub const STORE_FILE_NAME: &str = "teampulse.db";

const EVENT_CHANNEL_CAPACITY: usize = 256;

const SCHEMA_DOCUMENTS: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    version INTEGER NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (collection, id)
)";
const SELECT_DOCUMENT: &str = "SELECT version, body FROM documents WHERE collection = ?1 AND id = ?2";
const SELECT_COLLECTION: &str = "SELECT id, version, body FROM documents WHERE collection = ?1 ORDER BY rowid";
const UPSERT_DOCUMENT: &str = "INSERT OR REPLACE INTO documents (collection, id, version, body) VALUES (?1, ?2, ?3, ?4)";
const DELETE_DOCUMENT: &str = "DELETE FROM documents WHERE collection = ?1 AND id = ?2";

/// One stored record with its monotonic version.
#[derive(Clone, Debug)]
pub struct Document {
    pub id: String,
    pub version: i64,
    pub body: Value,
}

/// A confirmed mutation pushed to subscribers.
///
/// `body` is the full post-write document, or `Value::Null` when the
/// document was removed.
#[derive(Clone, Debug)]
pub struct StoreEvent {
    pub collection: String,
    pub id: String,
    pub version: i64,
    pub body: Value,
}

impl StoreEvent {
    pub fn is_removal(&self) -> bool {
        self.body.is_null()
    }
}

/// Result of a versioned write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied { version: i64 },
    /// The observed version no longer matches the store; nothing was written.
    Stale { observed: i64, current: i64 },
}

/// Per-document change subscription.
pub struct Subscription {
    rx: broadcast::Receiver<StoreEvent>,
    collection: String,
    id: String,
}

impl Subscription {
    /// Waits for the next confirmed mutation of the subscribed document.
    ///
    /// Lagged events are skipped rather than treated as failures; the next
    /// delivered event always carries the full current document, so dropped
    /// intermediates cannot be missed state.
    pub async fn recv(&mut self) -> Result<StoreEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if event.collection == self.collection && event.id == self.id {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(anyhow!("store subscription channel closed"));
                }
            }
        }
    }
}

pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
    events: broadcast::Sender<StoreEvent>,
    write_retries: u32,
    retry_backoff: Duration,
}

impl DocumentStore {
    pub fn new(sync: &SyncConfig) -> Result<Self> {
        let store_file_path = DataStorage::new().get_path(STORE_FILE_NAME)?;
        let conn = Connection::open(store_file_path)?;
        conn.execute(SCHEMA_DOCUMENTS, [])?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(DocumentStore {
            conn: Arc::new(Mutex::new(conn)),
            events,
            write_retries: sync.write_retries,
            retry_backoff: Duration::from_millis(sync.retry_backoff),
        })
    }

    /// Reads a single document.
    pub fn read_once(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(SELECT_DOCUMENT, params![collection, id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .optional()?;

        match row {
            Some((version, raw)) => Ok(Some(Document {
                id: id.to_string(),
                version,
                body: serde_json::from_str(&raw)?,
            })),
            None => Ok(None),
        }
    }

    /// Reads every document of a collection in insertion order.
    pub fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(SELECT_COLLECTION)?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, version, raw) = row?;
            documents.push(Document {
                id,
                version,
                body: serde_json::from_str(&raw)?,
            });
        }
        Ok(documents)
    }

    /// Merges the given fields into a document, creating it when absent.
    ///
    /// Last write wins at document granularity: the merge is applied on top
    /// of whatever the store currently holds, the version is bumped and the
    /// full post-write document is echoed to subscribers.
    pub async fn write(&self, collection: &str, id: &str, fields: Value) -> Result<i64> {
        let merged = self
            .with_retries(|| {
                let conn = self.conn.lock();
                Self::merge_locked(&conn, collection, id, &fields, None)
            })
            .await?;
        match merged {
            Merged::Applied(event) => {
                let version = event.version;
                let _ = self.events.send(event);
                Ok(version)
            }
            // Unversioned merges pass no expectation and cannot be stale.
            Merged::Stale { .. } => Err(anyhow!("merge without an expected version reported stale")),
        }
    }

    /// Versioned merge-write: applied only when the caller's observed
    /// version still matches the store. The check and the merge happen under
    /// one connection lock, so a concurrent writer racing in between yields
    /// `Stale` rather than a store failure.
    pub async fn write_if(&self, collection: &str, id: &str, observed: i64, fields: Value) -> Result<WriteOutcome> {
        let merged = self
            .with_retries(|| {
                let conn = self.conn.lock();
                Self::merge_locked(&conn, collection, id, &fields, Some(observed))
            })
            .await?;
        match merged {
            Merged::Applied(event) => {
                let version = event.version;
                let _ = self.events.send(event);
                Ok(WriteOutcome::Applied { version })
            }
            Merged::Stale { current } => Ok(WriteOutcome::Stale { observed, current }),
        }
    }

    /// Creates a new document with a generated id and returns the id.
    ///
    /// The id is also written into the document body under `"id"`, so a
    /// record read back from the store always knows its own key.
    pub async fn append(&self, collection: &str, mut body: Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let map = body
            .as_object_mut()
            .ok_or_else(|| anyhow!("document body must be a JSON object"))?;
        map.insert("id".to_string(), Value::String(id.clone()));

        let raw = serde_json::to_string(&body)?;
        self.with_retries(|| {
            let conn = self.conn.lock();
            conn.execute(UPSERT_DOCUMENT, params![collection, id, 1i64, raw])?;
            Ok(())
        })
        .await?;

        let _ = self.events.send(StoreEvent {
            collection: collection.to_string(),
            id: id.clone(),
            version: 1,
            body,
        });
        Ok(id)
    }

    /// Removes a document. Subscribers receive a removal event.
    pub async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        let version = self.read_once(collection, id)?.map(|doc| doc.version).unwrap_or(0);
        self.with_retries(|| {
            let conn = self.conn.lock();
            conn.execute(DELETE_DOCUMENT, params![collection, id])?;
            Ok(())
        })
        .await?;

        let _ = self.events.send(StoreEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            version: version + 1,
            body: Value::Null,
        });
        Ok(())
    }

    /// Subscribes to every confirmed mutation of one document, including
    /// writes made through this same store handle (echo).
    pub fn subscribe(&self, collection: &str, id: &str) -> Subscription {
        Subscription {
            rx: self.events.subscribe(),
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    fn merge_locked(
        conn: &Connection,
        collection: &str,
        id: &str,
        fields: &Value,
        expected: Option<i64>,
    ) -> Result<Merged> {
        let incoming = fields
            .as_object()
            .ok_or_else(|| anyhow!("merge fields must be a JSON object"))?;

        let row = conn
            .query_row(SELECT_DOCUMENT, params![collection, id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .optional()?;

        let (version, mut body) = match row {
            Some((version, raw)) => (version, serde_json::from_str::<Value>(&raw)?),
            None => (0, Value::Object(serde_json::Map::new())),
        };
        if let Some(expected) = expected {
            if version != expected {
                return Ok(Merged::Stale { current: version });
            }
        }

        let map = body
            .as_object_mut()
            .ok_or_else(|| anyhow!("stored document body is not a JSON object"))?;
        map.insert("id".to_string(), Value::String(id.to_string()));
        for (key, value) in incoming {
            map.insert(key.clone(), value.clone());
        }

        let next_version = version + 1;
        let raw = serde_json::to_string(&body)?;
        conn.execute(UPSERT_DOCUMENT, params![collection, id, next_version, raw])?;

        Ok(Merged::Applied(StoreEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            version: next_version,
            body,
        }))
    }

    async fn with_retries<T>(&self, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt: u32 = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.write_retries {
                        return Err(err.context("store write failed after retries"));
                    }
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
            }
        }
    }
}

/// Outcome of one locked merge attempt.
enum Merged {
    Applied(StoreEvent),
    Stale { current: i64 },
}
