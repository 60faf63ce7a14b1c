//! Error taxonomy for session transitions and store access.
//!
//! Transition-guard violations are resolved locally and never corrupt stored
//! state; store-level failures propagate to the caller only after the write
//! retry budget is exhausted. Blocked actions carry distinguishable variants
//! so a calling UI can explain the rejection.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// A power outage is active for this user; starting work is rejected
    /// without any state change.
    #[error("cannot start work during an active outage")]
    BlockedByInterruption,

    /// `stop_task` found no running task. Idempotent, not fatal.
    #[error("no task is currently running")]
    NoActiveTask,

    /// `end_break` found no active break. Idempotent, not fatal.
    #[error("no break is currently active")]
    NoActiveBreak,

    /// `start_break` (or `start_task`) found a break already active.
    #[error("a break is already active")]
    AlreadyOnBreak,

    #[error("task {0} not found")]
    TaskNotFound(String),

    /// The task reached `Done`; no further running transitions are permitted.
    #[error("task {0} is already completed")]
    TaskAlreadyDone(String),

    /// Token login found no matching session record.
    #[error("session token did not match any user")]
    InvalidToken,

    /// The operation acts on another user's session and needs the admin role.
    #[error("only an admin can act on another user's session")]
    AdminRequired,

    #[error("user {0} not found")]
    UserNotFound(String),

    /// An operation requires an established session.
    #[error("no active session; log in first")]
    NoSession,

    /// A versioned write observed a stale document version; another client
    /// mutated the record in between.
    #[error("stale write: observed version {observed}, store has {current}")]
    StaleWrite { observed: i64, current: i64 },

    /// Store read/write failed after exhausting the retry budget.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
}
