use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicI64, Ordering};

/// Time source for all session math.
///
/// Every timestamp written to the store comes through this trait so that
/// transitions can be exercised deterministically in tests. Timestamps are
/// wall-clock epoch milliseconds, matching the `lastStartTime`/`startTime`
/// fields of the shared records.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Current date as an ISO `YYYY-MM-DD` string, used to key daily records.
    fn today(&self) -> String {
        match DateTime::from_timestamp_millis(self.now_ms()) {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn today(&self) -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }
}

/// Settable clock for tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self { now: AtomicI64::new(now_ms) }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
