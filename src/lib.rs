//! # TeamPulse - session coordination engine
//!
//! A coordination engine for a multi-client time tracker: each worker is in
//! exactly one activity mode at a time (working on a task, on a break, hit by
//! a power outage, or available), and several independent clients observe and
//! mutate the same per-user session records through a shared document store
//! with last-write-wins semantics.
//!
//! ## Features
//!
//! - **Session State Machine**: Guarded transitions between activity modes
//!   with elapsed-time accumulation per task
//! - **Activity Monitoring**: Hardware-level idle detection and liveness
//!   heartbeats, recorded as append-only idle logs
//! - **Sync Layer**: Document read/merge-write/subscribe seam over the shared
//!   store, with per-document versions and bounded write retries
//! - **Conflict Reconciliation**: Remote pushes are reconciled against local
//!   intent, never applied blindly
//!
//! ## Usage
//!
//! ```rust,no_run
//! use teampulse::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod libs;
pub mod store;
