//! Per-user session state machine.
//!
//! A user is in exactly one activity mode at any observed quiescent point:
//! working on a task, on a break, inside a power outage, or available. The
//! transitions here are the only code path that mutates the mode-bearing
//! records, and each one validates its guards against the store before
//! writing, so two timed modes can never be observed running at once.
//!
//! Auto-pause is the safety net: any transition that enters a new timed
//! mode first applies the stop accumulation to whatever task is running,
//! before the new mode's own side effects are written.

use crate::libs::breaks::Break;
use crate::libs::clock::Clock;
use crate::libs::error::SessionError;
use crate::libs::interruption::{Interruption, InterruptionKind, PowerLog};
use crate::libs::task::TaskStatus;
use crate::libs::user::{OnlineStatus, User};
use crate::store::store::WriteOutcome;
use crate::store::{breaks::Breaks, interruptions::Interruptions, tasks::Tasks, users::Users, DocumentStore};
use chrono::Duration;
use std::sync::Arc;

/// The mutually exclusive activity mode of one user.
///
/// Idle is not a mode; it is a liveness flag the activity monitor layers on
/// top of `Available` and `Working`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Working(String),
    OnBreak,
    PowerCut,
    Available,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Working(task_id) => write!(f, "Working on {}", task_id),
            Mode::OnBreak => write!(f, "On break"),
            Mode::PowerCut => write!(f, "Power cut"),
            Mode::Available => write!(f, "Available"),
        }
    }
}

/// Outcome of a `toggle_interruption` call.
#[derive(Debug)]
pub enum InterruptionToggle {
    Started(Interruption),
    /// The outage ended; long enough ones carry the archived history entry.
    Ended(Option<PowerLog>),
}

pub struct SessionStateMachine {
    tasks: Tasks,
    breaks: Breaks,
    interruptions: Interruptions,
    users: Users,
    clock: Arc<dyn Clock>,
}

impl SessionStateMachine {
    pub fn new(store: Arc<DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tasks: Tasks::new(store.clone()),
            breaks: Breaks::new(store.clone()),
            interruptions: Interruptions::new(store.clone()),
            users: Users::new(store),
            clock,
        }
    }

    /// Derives the current mode from the store. An active interruption or
    /// break takes precedence over a (stale) running flag, matching the
    /// cross-mode exclusion invariant.
    pub fn mode_of(&self, user_id: &str) -> Result<Mode, SessionError> {
        if self.interruptions.active_for(user_id)?.is_some() {
            return Ok(Mode::PowerCut);
        }
        if self.breaks.active_for(user_id)?.is_some() {
            return Ok(Mode::OnBreak);
        }
        if let Some(task) = self.tasks.running_for(user_id)?.into_iter().next() {
            return Ok(Mode::Working(task.id));
        }
        Ok(Mode::Available)
    }

    /// Starts timing a task.
    ///
    /// Rejected while an outage or a break is active; no record is mutated
    /// in that case. Any other running task is auto-paused first so the
    /// single-running-task invariant holds even within this one call.
    pub async fn start_task(&self, user: &User, task_id: &str) -> Result<(), SessionError> {
        if self.interruptions.active_for(&user.id)?.is_some() {
            return Err(SessionError::BlockedByInterruption);
        }
        if self.breaks.active_for(&user.id)?.is_some() {
            return Err(SessionError::AlreadyOnBreak);
        }

        let task = self
            .tasks
            .fetch(task_id)?
            .ok_or_else(|| SessionError::TaskNotFound(task_id.to_string()))?;
        if task.status == TaskStatus::Done {
            return Err(SessionError::TaskAlreadyDone(task_id.to_string()));
        }

        self.pause_running(&user.id).await?;

        // Re-read after the auto-pause: restarting the task that was just
        // paused must observe its post-pause version.
        let (_, version) = self
            .tasks
            .fetch_versioned(task_id)?
            .ok_or_else(|| SessionError::TaskNotFound(task_id.to_string()))?;
        match self.tasks.record_start(task_id, version, self.clock.now_ms()).await? {
            WriteOutcome::Applied { .. } => Ok(()),
            WriteOutcome::Stale { observed, current } => Err(SessionError::StaleWrite { observed, current }),
        }
    }

    /// Stops the running task, accumulating its in-flight time. Returns the
    /// accumulated delta in milliseconds.
    pub async fn stop_task(&self, user_id: &str) -> Result<i64, SessionError> {
        let running = self.tasks.running_for(user_id)?;
        if running.is_empty() {
            return Err(SessionError::NoActiveTask);
        }
        self.accumulate_all(running).await
    }

    /// Stops (if running) and marks a task `Done`. Terminal: the task can
    /// never run again afterwards.
    pub async fn complete_task(&self, task_id: &str) -> Result<i64, SessionError> {
        let task = self
            .tasks
            .fetch(task_id)?
            .ok_or_else(|| SessionError::TaskNotFound(task_id.to_string()))?;
        if task.status == TaskStatus::Done {
            return Err(SessionError::TaskAlreadyDone(task_id.to_string()));
        }
        Ok(self.tasks.record_stop(&task, self.clock.now_ms(), true).await?)
    }

    /// Applies the stop accumulation to every running task of the user.
    /// There should be at most one, but remote writes may have raced; the
    /// loop keeps the cleanup defensive either way.
    pub async fn pause_running(&self, user_id: &str) -> Result<i64, SessionError> {
        let running = self.tasks.running_for(user_id)?;
        if running.is_empty() {
            return Ok(0);
        }
        self.accumulate_all(running).await
    }

    /// Opens a break: auto-pause, create the active break record, publish
    /// the `Break` status. Ordered so a crash between the writes leaves a
    /// recoverable state (break open but status not yet flipped).
    pub async fn start_break(&self, user: &User) -> Result<Break, SessionError> {
        if self.breaks.active_for(&user.id)?.is_some() {
            return Err(SessionError::AlreadyOnBreak);
        }
        if self.interruptions.active_for(&user.id)?.is_some() {
            return Err(SessionError::BlockedByInterruption);
        }

        self.pause_running(&user.id).await?;
        let brk = self.breaks.open(&user.id, self.clock.now_ms(), &self.clock.today()).await?;
        self.users.set_status(&user.id, OnlineStatus::Break, self.clock.now_ms()).await?;
        Ok(brk)
    }

    /// Closes the active break and publishes `Online`. The close itself is
    /// idempotent, so re-running after a partial failure is safe.
    pub async fn end_break(&self, user: &User) -> Result<Break, SessionError> {
        let brk = self
            .breaks
            .active_for(&user.id)?
            .ok_or(SessionError::NoActiveBreak)?;
        self.breaks.close(&brk.id, self.clock.now_ms()).await?;
        self.users.set_status(&user.id, OnlineStatus::Online, self.clock.now_ms()).await?;
        let closed = self.breaks.fetch(&brk.id)?.unwrap_or(brk);
        Ok(closed)
    }

    /// Starts an outage if none is active, otherwise ends the active one.
    ///
    /// Starting auto-pauses any running task; ending archives outages that
    /// lasted long enough and drops the live record.
    pub async fn toggle_interruption(&self, user: &User) -> Result<InterruptionToggle, SessionError> {
        self.toggle_outage(user, InterruptionKind::PowerCut).await
    }

    /// Admin action: toggles an outage on another member's behalf, recorded
    /// with the admin-reported kind so history shows who asserted it.
    pub async fn report_outage(&self, admin: &User, target: &User) -> Result<InterruptionToggle, SessionError> {
        if !admin.is_admin() {
            return Err(SessionError::AdminRequired);
        }
        self.toggle_outage(target, InterruptionKind::AdminReportedOutage).await
    }

    async fn toggle_outage(&self, user: &User, kind: InterruptionKind) -> Result<InterruptionToggle, SessionError> {
        let now = self.clock.now_ms();
        if let Some(active) = self.interruptions.active_for(&user.id)? {
            let archived = self.interruptions.close(&active, now).await?;
            return Ok(InterruptionToggle::Ended(archived));
        }

        if self.breaks.active_for(&user.id)?.is_some() {
            return Err(SessionError::AlreadyOnBreak);
        }
        self.pause_running(&user.id).await?;
        let interruption = self
            .interruptions
            .open(&user.id, &user.fullname, kind, now, &self.clock.today())
            .await?;
        Ok(InterruptionToggle::Started(interruption))
    }

    /// Stored elapsed time plus the in-flight session if the task is running.
    pub fn current_elapsed(&self, task_id: &str) -> Result<Duration, SessionError> {
        let task = self
            .tasks
            .fetch(task_id)?
            .ok_or_else(|| SessionError::TaskNotFound(task_id.to_string()))?;
        Ok(Duration::milliseconds(task.current_elapsed_ms(self.clock.now_ms())))
    }

    pub fn tasks(&self) -> &Tasks {
        &self.tasks
    }

    pub fn breaks(&self) -> &Breaks {
        &self.breaks
    }

    pub fn interruptions(&self) -> &Interruptions {
        &self.interruptions
    }

    async fn accumulate_all(&self, running: Vec<crate::libs::task::Task>) -> Result<i64, SessionError> {
        let now = self.clock.now_ms();
        let mut total = 0;
        for task in running {
            total += self.tasks.record_stop(&task, now, false).await?;
        }
        Ok(total)
    }
}
