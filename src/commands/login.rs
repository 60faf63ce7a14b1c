use crate::libs::coordinator::SessionCoordinator;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Session token issued for the desktop tracker handoff.
    #[arg(required = true)]
    token: String,
}

pub async fn cmd(args: LoginArgs) -> Result<()> {
    let coordinator = SessionCoordinator::bootstrap()?;
    let user = coordinator.login_with_token(&args.token).await?;
    msg_success!(Message::LoggedIn(user.fullname));
    Ok(())
}
