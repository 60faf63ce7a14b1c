//! Display implementation for application messages.
//!
//! All user-facing text lives here, so the wording stays in one place and
//! message construction elsewhere stays type-checked.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // Session
            Message::LoggedIn(name) => format!("Logged in as {}", name),
            Message::LoggedOut => "Logged out; session token cleared".to_string(),
            Message::ForcedLogout => "Session was revoked by another client; logging out".to_string(),

            // Tasks
            Message::TaskStarted(id) => format!("Task {} is now running", id),
            Message::TaskStopped(ms) => format!("Task stopped, {} recorded", format_duration_ms(*ms)),
            Message::TaskCompleted(id) => format!("Task {} completed", id),
            Message::TaskElapsed(id, ms) => format!("Task {}: {} elapsed", id, format_duration_ms(*ms)),

            // Breaks
            Message::BreakStarted => "Break started; task timing is paused".to_string(),
            Message::BreakEnded(Some(ms)) => format!("Break ended after {}", format_duration_ms(*ms)),
            Message::BreakEnded(None) => "Break ended".to_string(),

            // Outages
            Message::OutageStarted => "Power cut recorded; work is blocked until it ends".to_string(),
            Message::OutageReported(name) => format!("Outage reported for {}", name),
            Message::OutageEnded { duration_ms, archived: true } => {
                format!("Power cut ended after {}, archived to history", format_duration_ms(*duration_ms))
            }
            Message::OutageEnded { duration_ms, archived: false } => {
                format!("Power cut ended after {}", format_duration_ms(*duration_ms))
            }

            // Monitor
            Message::MonitorStarted {
                idle_threshold,
                poll_interval,
                heartbeat_interval,
            } => format!(
                "Monitor started (idle threshold {}s, poll {}ms, heartbeat {}s)",
                idle_threshold, poll_interval, heartbeat_interval
            ),
            Message::MonitorStopped => "Monitor stopped".to_string(),

            // Status
            Message::StatusHeader(name) => format!("Session state for {}", name),

            // Configuration
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigSectionMonitor => "Activity monitor settings".to_string(),
            Message::ConfigSectionSync => "Sync layer settings".to_string(),
            Message::PromptIdleThreshold => "Idle threshold in seconds".to_string(),
            Message::PromptPollInterval => "Poll interval in milliseconds".to_string(),
            Message::PromptHeartbeatInterval => "Heartbeat interval in seconds".to_string(),
            Message::PromptMinIdleLog => "Minimum recorded idle duration in milliseconds".to_string(),
            Message::PromptSettleDelay => "Settling delay after login in milliseconds".to_string(),
            Message::PromptWriteRetries => "Store write retries".to_string(),
            Message::PromptRetryBackoff => "Retry backoff in milliseconds".to_string(),

            // Generic
            Message::Error(details) => details.clone(),
        };
        write!(f, "{}", text)
    }
}

fn format_duration_ms(ms: i64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
