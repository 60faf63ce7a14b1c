//! Reconciliation of remote session pushes against local intent.
//!
//! Every subscription event on the signed-in user's record flows through
//! here before it is allowed to touch local state. The dangerous race this
//! closes: a snapshot captured before a login's token write arrives after
//! it, reports `sessionToken = null`, and gets misread as "session revoked
//! elsewhere". Suppression is keyed off the explicit session phase rather
//! than ad-hoc flags, so the rules are checkable against the full lifecycle.

use super::session::SessionPhase;
use super::user::User;
use parking_lot::Mutex;
use tracing::warn;

/// What to do with one remote push.
#[derive(Clone, Debug, PartialEq)]
pub enum GuardVerdict {
    /// Nothing to apply: suppressed phase or an unchanged snapshot.
    Ignore,
    /// The push differs from the cached copy; replace the cache entirely
    /// (document-granularity last-write-wins).
    Replace(Box<User>),
    /// Another client revoked the session; terminate locally.
    ForcedLogout,
}

pub struct ConflictGuard {
    phase: Mutex<SessionPhase>,
}

impl ConflictGuard {
    pub fn new(phase: SessionPhase) -> Self {
        Self { phase: Mutex::new(phase) }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.lock()
    }

    pub fn set_phase(&self, phase: SessionPhase) {
        *self.phase.lock() = phase;
    }

    /// Reconciles one remote push against the locally cached session.
    ///
    /// A cleared token for a non-admin forces a logout, but only while the
    /// session is `Active`: during `Establishing` the just-written token may
    /// not be observable yet, and during `Terminating` the push is the
    /// logout's own echo.
    pub fn reconcile(&self, cached: Option<&User>, remote: &User) -> GuardVerdict {
        match self.phase() {
            SessionPhase::Active => {}
            SessionPhase::SignedOut | SessionPhase::Establishing | SessionPhase::Terminating => {
                return GuardVerdict::Ignore;
            }
        }

        if remote.session_token.is_none() && !remote.is_admin() {
            warn!(user = %remote.id, "remote push cleared the session token; forcing logout");
            return GuardVerdict::ForcedLogout;
        }

        match cached {
            Some(local) if local == remote => GuardVerdict::Ignore,
            _ => GuardVerdict::Replace(Box::new(remote.clone())),
        }
    }
}

impl Default for ConflictGuard {
    fn default() -> Self {
        Self::new(SessionPhase::SignedOut)
    }
}
