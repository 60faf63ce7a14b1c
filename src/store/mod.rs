//! Sync layer for the teampulse engine.
//!
//! `store` holds the document store seam itself (read-one, merge-write,
//! append, remove, subscribe); the sibling modules wrap it with typed
//! operations per collection, mirroring the record kinds of the shared
//! data model: users, tasks, breaks, interruptions (plus their archived
//! power logs) and idle logs.

pub mod breaks;
pub mod idle_logs;
pub mod interruptions;
pub mod store;
pub mod tasks;
pub mod users;

pub use store::{Document, DocumentStore, StoreEvent, Subscription, WriteOutcome};
