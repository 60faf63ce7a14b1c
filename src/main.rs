use teampulse::commands::Cli;
use teampulse::libs::messages::Message;
use teampulse::msg_error;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    if let Err(err) = Cli::menu().await {
        msg_error!(Message::Error(err.to_string()));
        std::process::exit(1);
    }
}
