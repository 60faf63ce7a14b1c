use crate::libs::clock::SystemClock;
use crate::libs::config::Config;
use crate::libs::coordinator::SessionCoordinator;
use crate::libs::messages::Message;
use crate::libs::monitor::Monitor;
use crate::msg_info;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

// Runs the activity monitor for the signed-in user alongside the session
// reconciliation loop. Ends on Ctrl-C or when the session is revoked.
pub async fn cmd() -> Result<()> {
    let config = Config::read()?;
    let monitor_config = config.monitor.clone().unwrap_or_default();

    let coordinator = SessionCoordinator::bootstrap()?;
    let user = coordinator.session_user()?;
    let monitor = Monitor::new(
        monitor_config.clone(),
        coordinator.store().clone(),
        &user,
        Arc::new(SystemClock),
    );

    msg_info!(Message::MonitorStarted {
        idle_threshold: monitor_config.idle_threshold,
        poll_interval: monitor_config.poll_interval,
        heartbeat_interval: monitor_config.heartbeat_interval,
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::select! {
        result = monitor.run(shutdown_rx) => result?,
        result = coordinator.run_sync() => result?,
        _ = tokio::signal::ctrl_c() => {
            let _ = shutdown_tx.send(true);
        }
    }

    msg_info!(Message::MonitorStopped);
    Ok(())
}
