use crate::libs::coordinator::SessionCoordinator;
use crate::libs::messages::Message;
use crate::libs::state::InterruptionToggle;
use crate::msg_success;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct OutageArgs {
    /// Report or resume an outage for another member (admin only).
    #[arg(long)]
    user: Option<String>,
}

pub async fn cmd(args: OutageArgs) -> Result<()> {
    let coordinator = SessionCoordinator::bootstrap()?;
    let toggle = match &args.user {
        Some(target) => coordinator.report_outage(target).await?,
        None => coordinator.toggle_interruption().await?,
    };
    match toggle {
        InterruptionToggle::Started(interruption) => {
            if args.user.is_some() {
                msg_success!(Message::OutageReported(interruption.user));
            } else {
                msg_success!(Message::OutageStarted);
            }
        }
        InterruptionToggle::Ended(archived) => {
            let duration_ms = archived.as_ref().map(|log| log.duration_ms).unwrap_or(0);
            msg_success!(Message::OutageEnded {
                duration_ms,
                archived: archived.is_some(),
            });
        }
    }
    Ok(())
}
