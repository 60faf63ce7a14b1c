//! Coordinator facade over the session engine.
//!
//! Owns the store handle, the state machine, the conflict guard and the
//! locally cached session, and exposes the public operations the clients
//! call. Consumers never touch a shared mutable "current user" directly;
//! everything goes through this object, and remote pushes only reach the
//! cache after the guard has reconciled them.

use super::breaks::Break;
use super::clock::{Clock, SystemClock};
use super::config::Config;
use super::error::SessionError;
use super::guard::{ConflictGuard, GuardVerdict};
use super::session::{SessionCache, SessionPhase};
use super::state::{InterruptionToggle, SessionStateMachine};
use super::user::{OnlineStatus, User};
use crate::libs::messages::Message;
use crate::msg_warning;
use crate::store::users::{Users, USERS};
use crate::store::DocumentStore;
use anyhow::Result;
use chrono::Duration;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct SessionCoordinator {
    store: Arc<DocumentStore>,
    clock: Arc<dyn Clock>,
    machine: SessionStateMachine,
    guard: ConflictGuard,
    users: Users,
    cache: SessionCache,
    session: Mutex<Option<User>>,
    settle_delay: std::time::Duration,
}

impl SessionCoordinator {
    pub fn new(store: Arc<DocumentStore>, clock: Arc<dyn Clock>, config: &Config) -> Result<Self> {
        let cache = SessionCache::new();
        let session = cache.load()?;
        let phase = if session.is_some() { SessionPhase::Active } else { SessionPhase::SignedOut };
        let sync = config.sync.clone().unwrap_or_default();

        Ok(Self {
            machine: SessionStateMachine::new(store.clone(), clock.clone()),
            guard: ConflictGuard::new(phase),
            users: Users::new(store.clone()),
            cache,
            session: Mutex::new(session),
            settle_delay: std::time::Duration::from_millis(sync.settle_delay),
            store,
            clock,
        })
    }

    /// Builds a coordinator from the on-disk configuration and the system
    /// clock. Convenience for the CLI commands.
    pub fn bootstrap() -> Result<Self> {
        let config = Config::read()?;
        let sync = config.sync.clone().unwrap_or_default();
        let store = Arc::new(DocumentStore::new(&sync)?);
        Self::new(store, Arc::new(SystemClock), &config)
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    pub fn guard(&self) -> &ConflictGuard {
        &self.guard
    }

    /// The locally cached signed-in user, or `NoSession`.
    pub fn session_user(&self) -> Result<User, SessionError> {
        self.session.lock().clone().ok_or(SessionError::NoSession)
    }

    /// Token-based login for the desktop tracker handoff.
    ///
    /// The session phase stays `Establishing` from the token lookup until
    /// the new session is durably recorded plus a settling delay, so a
    /// subscription echo that predates the token write cannot be misread
    /// as a revocation.
    pub async fn login_with_token(&self, token: &str) -> Result<User, SessionError> {
        self.guard.set_phase(SessionPhase::Establishing);

        let user = match self.users.find_by_token(token) {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.guard.set_phase(SessionPhase::SignedOut);
                return Err(SessionError::InvalidToken);
            }
            Err(err) => {
                self.guard.set_phase(SessionPhase::SignedOut);
                return Err(err.into());
            }
        };

        self.users.set_status(&user.id, OnlineStatus::Online, self.clock.now_ms()).await?;
        let user = self.users.fetch(&user.id)?.unwrap_or(user);
        self.cache.save(&user)?;
        *self.session.lock() = Some(user.clone());

        tokio::time::sleep(self.settle_delay).await;
        self.guard.set_phase(SessionPhase::Active);
        Ok(user)
    }

    pub async fn start_task(&self, task_id: &str) -> Result<(), SessionError> {
        let user = self.session_user()?;
        self.machine.start_task(&user, task_id).await
    }

    /// Returns the milliseconds accumulated by the stop.
    pub async fn stop_task(&self) -> Result<i64, SessionError> {
        let user = self.session_user()?;
        self.machine.stop_task(&user.id).await
    }

    pub async fn complete_task(&self, task_id: &str) -> Result<i64, SessionError> {
        self.session_user()?;
        self.machine.complete_task(task_id).await
    }

    pub async fn start_break(&self) -> Result<Break, SessionError> {
        let user = self.session_user()?;
        self.machine.start_break(&user).await
    }

    pub async fn end_break(&self) -> Result<Break, SessionError> {
        let user = self.session_user()?;
        self.machine.end_break(&user).await
    }

    pub async fn toggle_interruption(&self) -> Result<InterruptionToggle, SessionError> {
        let user = self.session_user()?;
        self.machine.toggle_interruption(&user).await
    }

    /// Admin-only: toggles an outage on another member's behalf.
    pub async fn report_outage(&self, target_user_id: &str) -> Result<InterruptionToggle, SessionError> {
        let admin = self.session_user()?;
        let target = self
            .users
            .fetch(target_user_id)?
            .ok_or_else(|| SessionError::UserNotFound(target_user_id.to_string()))?;
        self.machine.report_outage(&admin, &target).await
    }

    pub fn current_elapsed(&self, task_id: &str) -> Result<Duration, SessionError> {
        self.machine.current_elapsed(task_id)
    }

    /// Explicit logout. The order matters: the guard is suppressed first so
    /// it cannot re-fire on the logout's own write, and running tasks are
    /// accumulated before the session fields are cleared so no in-flight
    /// time is lost.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let user = match self.session_user() {
            Ok(user) => user,
            Err(_) => {
                self.clear_local()?;
                return Ok(());
            }
        };

        self.guard.set_phase(SessionPhase::Terminating);
        self.machine.pause_running(&user.id).await?;
        self.users.sign_out(&user.id, self.clock.now_ms()).await?;
        self.clear_local()?;
        Ok(())
    }

    /// Feeds one remote push through the guard and applies the verdict.
    pub fn apply_remote(&self, remote: &User) -> Result<GuardVerdict, SessionError> {
        let verdict = {
            let session = self.session.lock();
            self.guard.reconcile(session.as_ref(), remote)
        };

        match &verdict {
            GuardVerdict::Replace(user) => {
                self.cache.save(user)?;
                *self.session.lock() = Some((**user).clone());
            }
            GuardVerdict::ForcedLogout => {
                msg_warning!(Message::ForcedLogout);
                self.clear_local()?;
            }
            GuardVerdict::Ignore => {}
        }
        Ok(verdict)
    }

    /// Long-running reconciliation loop: subscribes to the signed-in user's
    /// record and runs every confirmed mutation (from any client, own echo
    /// included) through the guard. Returns when the session ends.
    pub async fn run_sync(&self) -> Result<(), SessionError> {
        let user = self.session_user()?;
        let mut subscription = self.store.subscribe(USERS, &user.id);

        loop {
            let event = subscription.recv().await.map_err(SessionError::StoreUnavailable)?;
            if event.is_removal() {
                continue;
            }
            let remote: User = serde_json::from_value(event.body).map_err(anyhow::Error::from)?;
            if let GuardVerdict::ForcedLogout = self.apply_remote(&remote)? {
                return Ok(());
            }
        }
    }

    fn clear_local(&self) -> Result<(), SessionError> {
        self.cache.clear()?;
        *self.session.lock() = None;
        self.guard.set_phase(SessionPhase::SignedOut);
        Ok(())
    }
}
