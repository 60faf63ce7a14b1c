pub mod breaks;
pub mod init;
pub mod login;
pub mod logout;
pub mod outage;
pub mod status;
pub mod task;
pub mod watch;

use crate::libs::messages::macros::is_debug_mode;
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init,
    #[command(about = "Log in with a desktop session token")]
    Login(login::LoginArgs),
    #[command(about = "End the session, accounting any running task first")]
    Logout,
    #[command(about = "Start, stop or complete tasks")]
    Task(task::TaskArgs),
    #[command(about = "Start or end a break")]
    Break(breaks::BreakArgs),
    #[command(about = "Toggle a power outage for the current user")]
    Outage(outage::OutageArgs),
    #[command(about = "Show the current session state")]
    Status,
    #[command(about = "Watch user activity and record idle periods")]
    Watch,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        init_tracing();
        let cli = Self::parse();
        match cli.command {
            Commands::Init => init::cmd(),
            Commands::Login(args) => login::cmd(args).await,
            Commands::Logout => logout::cmd().await,
            Commands::Task(args) => task::cmd(args).await,
            Commands::Break(args) => breaks::cmd(args).await,
            Commands::Outage(args) => outage::cmd(args).await,
            Commands::Status => status::cmd().await,
            Commands::Watch => watch::cmd().await,
        }
    }
}

fn init_tracing() {
    if is_debug_mode() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }
}
