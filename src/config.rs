//! Environment-based configuration

use std::path::PathBuf;
use thiserror::Error;

const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bot token not found: set the {TOKEN_ENV} environment variable")]
    MissingToken,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    /// Directory for generated and downloaded spool files.
    pub spool_dir: PathBuf,
    /// Server-side long-poll window for `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let spool_dir = std::env::var("PLATEBOT_SPOOL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir());

        let poll_timeout_secs = std::env::var("PLATEBOT_POLL_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            token,
            spool_dir,
            poll_timeout_secs,
        })
    }
}
