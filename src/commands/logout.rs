use crate::libs::coordinator::SessionCoordinator;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;

// Explicit logout: running tasks are accounted before the session fields
// are cleared, so no in-flight time is lost.
pub async fn cmd() -> Result<()> {
    let coordinator = SessionCoordinator::bootstrap()?;
    coordinator.logout().await?;
    msg_success!(Message::LoggedOut);
    Ok(())
}
