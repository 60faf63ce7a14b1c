use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::msg_success;
use anyhow::Result;

// Runs the interactive configuration wizard and saves the result.
pub fn cmd() -> Result<()> {
    let config = Config::init()?;
    config.save()?;
    msg_success!(Message::ConfigSaved);
    Ok(())
}
