//! Core library modules for the teampulse engine.
//!
//! Serves as the entry point for the engine components: domain records,
//! the session state machine, the activity monitor, conflict reconciliation
//! and the coordinator facade that ties them together.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use teampulse::libs::coordinator::SessionCoordinator;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let coordinator = SessionCoordinator::bootstrap()?;
//! coordinator.start_task("task-1").await?;
//! # Ok(())
//! # }
//! ```

pub mod breaks;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod data_storage;
pub mod error;
pub mod guard;
pub mod idle_log;
pub mod interruption;
pub mod messages;
pub mod monitor;
pub mod session;
pub mod state;
pub mod task;
pub mod user;
