use crate::libs::coordinator::SessionCoordinator;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct BreakArgs {
    #[command(subcommand)]
    action: BreakAction,
}

#[derive(Debug, Subcommand)]
enum BreakAction {
    #[command(about = "Start a break, pausing any running task")]
    Start,
    #[command(about = "End the active break")]
    End,
}

pub async fn cmd(args: BreakArgs) -> Result<()> {
    let coordinator = SessionCoordinator::bootstrap()?;
    match args.action {
        BreakAction::Start => {
            coordinator.start_break().await?;
            msg_success!(Message::BreakStarted);
        }
        BreakAction::End => {
            let closed = coordinator.end_break().await?;
            msg_success!(Message::BreakEnded(closed.duration_ms));
        }
    }
    Ok(())
}
