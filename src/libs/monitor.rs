//! Local activity monitoring: idle detection and liveness heartbeats.
//!
//! A background listener thread records the instant of the last input
//! signal (keys, buttons, wheel, pointer). The polling loop turns that into
//! idle-begin / idle-end events: no input for `idle_threshold` marks the
//! user idle, and the first input afterwards closes the spell, appending an
//! idle log when it lasted long enough to matter. Independently, a
//! heartbeat refreshes `lastSeen` while the user is neither idle nor on a
//! break.
//!
//! Idle history is recorded without asserting authority over the global
//! status beyond the wake-up refresh; the monitor stands down entirely
//! while the user's mode is on-break.

use crate::libs::clock::Clock;
use crate::libs::config::MonitorConfig;
use crate::libs::idle_log::IdleLog;
use crate::libs::user::{OnlineStatus, User};
use crate::store::idle_logs::IdleLogs;
use crate::store::users::Users;
use crate::store::DocumentStore;
use anyhow::Result;
use parking_lot::Mutex;
use rdev::{listen, Event, EventType};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, Duration, Instant};
use tracing::debug;

pub struct Monitor {
    pub config: MonitorConfig,
    users: Users,
    idle_logs: IdleLogs,
    user_id: String,
    user_name: String,
    clock: Arc<dyn Clock>,
    /// Instant of the most recent input signal, shared with the listener
    /// thread.
    pub last_activity: Arc<Mutex<Instant>>,
    /// Epoch milliseconds of the current idle spell's begin, if any.
    idle_since: Mutex<Option<i64>>,
    last_heartbeat: Mutex<Instant>,
}

impl Monitor {
    pub fn new(config: MonitorConfig, store: Arc<DocumentStore>, user: &User, clock: Arc<dyn Clock>) -> Self {
        Monitor {
            config,
            users: Users::new(store.clone()),
            idle_logs: IdleLogs::new(store),
            user_id: user.id.clone(),
            user_name: user.fullname.clone(),
            clock,
            last_activity: Arc::new(Mutex::new(Instant::now())),
            idle_since: Mutex::new(None),
            last_heartbeat: Mutex::new(Instant::now()),
        }
    }

    /// Runs the monitoring loop until the shutdown channel flips.
    ///
    /// Spawns the input listener thread, then polls on `poll_interval`.
    /// Logout or teardown cancels the loop; outstanding idle state is
    /// simply dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.spawn_listener();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
                _ = time::sleep(Duration::from_millis(self.config.poll_interval)) => {
                    self.poll_once().await?;
                }
            }
        }
    }

    /// One polling cycle. Public so tests can drive the cycle directly
    /// instead of racing the wall clock.
    pub async fn poll_once(&self) -> Result<()> {
        // While on break the monitor stands down: no idle tracking, no
        // heartbeat, and any half-open idle spell is discarded.
        if self.on_break()? {
            *self.idle_since.lock() = None;
            return Ok(());
        }

        let idle_for = self.last_activity.lock().elapsed();
        let threshold = Duration::from_secs(self.config.idle_threshold);

        let idle_since = *self.idle_since.lock();
        match idle_since {
            None if idle_for >= threshold => {
                *self.idle_since.lock() = Some(self.clock.now_ms());
                debug!(user = %self.user_id, "idle began");
            }
            Some(started) if idle_for < threshold => {
                let now = self.clock.now_ms();
                *self.idle_since.lock() = None;
                let duration_ms = now - started;
                if duration_ms > self.config.min_idle_log as i64 {
                    self.idle_logs
                        .append(IdleLog::auto(&self.user_id, &self.user_name, started, now, &self.clock.today()))
                        .await?;
                    debug!(user = %self.user_id, duration_ms, "idle ended, logged");
                }
                // Wake-up refresh so observers see the user back.
                self.users.set_status(&self.user_id, OnlineStatus::Online, now).await?;
            }
            _ => {}
        }

        let heartbeat_due = self.idle_since.lock().is_none()
            && self.last_heartbeat.lock().elapsed() >= Duration::from_secs(self.config.heartbeat_interval);
        if heartbeat_due {
            self.users.touch(&self.user_id, self.clock.now_ms()).await?;
            *self.last_heartbeat.lock() = Instant::now();
        }

        Ok(())
    }

    pub fn is_idle(&self) -> bool {
        self.idle_since.lock().is_some()
    }

    fn on_break(&self) -> Result<bool> {
        Ok(self
            .users
            .fetch(&self.user_id)?
            .map(|user| user.online_status == OnlineStatus::Break)
            .unwrap_or(false))
    }

    /// Spawns the rdev listener thread. `listen` blocks for the lifetime of
    /// the process; on error the listener is restarted after a pause.
    fn spawn_listener(&self) {
        let shared_last_activity = self.last_activity.clone();
        std::thread::spawn(move || loop {
            let last_activity = shared_last_activity.clone();
            if let Err(e) = listen(move |event: Event| match event.event_type {
                EventType::KeyPress(_)
                | EventType::ButtonPress(_)
                | EventType::Wheel { .. }
                | EventType::MouseMove { .. } => {
                    *last_activity.lock() = Instant::now();
                }
                _ => {}
            }) {
                debug!("input listener failed: {:?}, restarting", e);
                std::thread::sleep(std::time::Duration::from_secs(1));
            } else {
                break;
            }
        });
    }
}
