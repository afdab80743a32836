//! platebot - vehicle number generator bot
//!
//! A conversation state machine over the Telegram Bot API: collects plate
//! parameters step by step, generates number sequences or converts TXT
//! listings to CSV, and delivers the resulting file back to the user.

mod config;
mod convert;
mod dispatch;
mod generate;
mod prompts;
mod runtime;
mod state_machine;
mod telegram;
mod validate;

use config::Config;
use runtime::SessionManager;
use std::sync::Arc;
use telegram::BotClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platebot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    std::fs::create_dir_all(&config.spool_dir)?;

    let client = Arc::new(BotClient::new(&config.token)?);
    let manager = SessionManager::new(client.clone(), config.spool_dir.clone());

    tracing::info!(spool_dir = %config.spool_dir.display(), "starting bot");
    dispatch::run(client, manager, config.poll_timeout_secs).await;

    Ok(())
}
