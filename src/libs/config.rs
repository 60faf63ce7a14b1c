//! Configuration management for the teampulse engine.
//!
//! Settings are stored as JSON in the platform application data directory
//! and cover the two tunable subsystems: the activity monitor (idle and
//! heartbeat timing) and the sync layer (settling delay after login and the
//! write retry budget). Each value can also be overridden through an
//! environment variable, which takes precedence over the file.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use teampulse::libs::config::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::read()?;
//! let monitor = config.monitor.unwrap_or_default();
//! println!("idle threshold: {}s", monitor.idle_threshold);
//! # Ok(())
//! # }
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Activity monitor settings.
///
/// Controls how local inactivity is detected and how often liveness is
/// published. Idle detection is deliberately conservative: brief idle spells
/// under `min_idle_log` are dropped rather than recorded, so the idle history
/// stays meaningful.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    /// Inactivity duration in seconds before the user is considered idle.
    pub idle_threshold: u64,

    /// Interval in milliseconds between activity checks.
    pub poll_interval: u64,

    /// Interval in seconds between liveness heartbeats. A heartbeat only
    /// fires while the user is neither idle nor on a break.
    pub heartbeat_interval: u64,

    /// Minimum idle duration in milliseconds worth recording as an idle log.
    pub min_idle_log: u64,
}

/// Sync layer settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SyncConfig {
    /// Delay in milliseconds after a token login before remote pushes are
    /// trusted again. A subscription event that predates the just-written
    /// token would otherwise be misread as a revoked session.
    pub settle_delay: u64,

    /// How many times a failed store write is retried before giving up.
    pub write_retries: u32,

    /// Base backoff in milliseconds between write retries; grows linearly
    /// with the attempt number.
    pub retry_backoff: u64,
}

impl Default for MonitorConfig {
    /// Defaults: 5 minute idle threshold, 500ms polling, 1 minute heartbeat,
    /// 1 second minimum recorded idle.
    fn default() -> Self {
        MonitorConfig {
            idle_threshold: 300,
            poll_interval: 500,
            heartbeat_interval: 60,
            min_idle_log: 1000,
        }
    }
}

impl Default for SyncConfig {
    /// Defaults: 750ms settling delay, 3 retries, 200ms base backoff.
    fn default() -> Self {
        SyncConfig {
            settle_delay: 750,
            write_retries: 3,
            retry_backoff: 200,
        }
    }
}

/// Root configuration container.
///
/// Sections are optional so an empty file (or no file at all) falls back to
/// defaults without breaking anything.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<MonitorConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncConfig>,
}

impl Config {
    /// Loads configuration from disk, falling back to defaults when no file
    /// exists, then applies environment variable overrides.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;

        let mut config = if config_file_path.exists() {
            let config_str = fs::read_to_string(config_file_path)?;
            serde_json::from_str(&config_str)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Interactive configuration wizard for both sections.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let monitor = config.monitor.clone().unwrap_or_default();
        msg_print!(Message::ConfigSectionMonitor);
        config.monitor = Some(MonitorConfig {
            idle_threshold: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptIdleThreshold.to_string())
                .default(monitor.idle_threshold)
                .interact_text()?,
            poll_interval: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptPollInterval.to_string())
                .default(monitor.poll_interval)
                .interact_text()?,
            heartbeat_interval: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptHeartbeatInterval.to_string())
                .default(monitor.heartbeat_interval)
                .interact_text()?,
            min_idle_log: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptMinIdleLog.to_string())
                .default(monitor.min_idle_log)
                .interact_text()?,
        });

        let sync = config.sync.clone().unwrap_or_default();
        msg_print!(Message::ConfigSectionSync);
        config.sync = Some(SyncConfig {
            settle_delay: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptSettleDelay.to_string())
                .default(sync.settle_delay)
                .interact_text()?,
            write_retries: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptWriteRetries.to_string())
                .default(sync.write_retries)
                .interact_text()?,
            retry_backoff: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptRetryBackoff.to_string())
                .default(sync.retry_backoff)
                .interact_text()?,
        });

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        let mut monitor = self.monitor.clone().unwrap_or_default();
        if let Some(v) = env_u64("TEAMPULSE_IDLE_THRESHOLD") {
            monitor.idle_threshold = v;
        }
        if let Some(v) = env_u64("TEAMPULSE_HEARTBEAT_INTERVAL") {
            monitor.heartbeat_interval = v;
        }
        self.monitor = Some(monitor);

        let mut sync = self.sync.clone().unwrap_or_default();
        if let Some(v) = env_u64("TEAMPULSE_SETTLE_DELAY") {
            sync.settle_delay = v;
        }
        self.sync = Some(sync);
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
