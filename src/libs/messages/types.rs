#[derive(Debug, Clone)]
pub enum Message {
    // === SESSION MESSAGES ===
    LoggedIn(String),  // fullname
    LoggedOut,
    ForcedLogout,

    // === TASK MESSAGES ===
    TaskStarted(String),       // task id
    TaskStopped(i64),          // accumulated ms
    TaskCompleted(String),     // task id
    TaskElapsed(String, i64),  // task id, total ms

    // === BREAK MESSAGES ===
    BreakStarted,
    BreakEnded(Option<i64>), // duration ms

    // === OUTAGE MESSAGES ===
    OutageStarted,
    OutageReported(String), // affected user's name
    OutageEnded { duration_ms: i64, archived: bool },

    // === MONITOR MESSAGES ===
    MonitorStarted {
        idle_threshold: u64,
        poll_interval: u64,
        heartbeat_interval: u64,
    },
    MonitorStopped,

    // === STATUS MESSAGES ===
    StatusHeader(String), // fullname

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigSectionMonitor,
    ConfigSectionSync,
    PromptIdleThreshold,
    PromptPollInterval,
    PromptHeartbeatInterval,
    PromptMinIdleLog,
    PromptSettleDelay,
    PromptWriteRetries,
    PromptRetryBackoff,

    // === GENERIC MESSAGES ===
    Error(String),
}
