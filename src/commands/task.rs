use crate::libs::coordinator::SessionCoordinator;
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    action: TaskAction,
}

#[derive(Debug, Subcommand)]
enum TaskAction {
    #[command(about = "Start timing a task")]
    Start { id: String },
    #[command(about = "Stop the running task")]
    Stop,
    #[command(about = "Stop and mark a task done")]
    Done { id: String },
    #[command(about = "Show accumulated time for a task")]
    Elapsed { id: String },
}

pub async fn cmd(args: TaskArgs) -> Result<()> {
    let coordinator = SessionCoordinator::bootstrap()?;
    match args.action {
        TaskAction::Start { id } => {
            coordinator.start_task(&id).await?;
            msg_success!(Message::TaskStarted(id));
        }
        TaskAction::Stop => {
            let accumulated = coordinator.stop_task().await?;
            msg_success!(Message::TaskStopped(accumulated));
        }
        TaskAction::Done { id } => {
            coordinator.complete_task(&id).await?;
            msg_success!(Message::TaskCompleted(id));
        }
        TaskAction::Elapsed { id } => {
            let elapsed = coordinator.current_elapsed(&id)?;
            msg_info!(Message::TaskElapsed(id, elapsed.num_milliseconds()));
        }
    }
    Ok(())
}
