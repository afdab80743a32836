//! Minimal Telegram Bot API client
//!
//! Only the handful of methods the bot needs: long-poll updates, text and
//! document sending, message edits, callback acknowledgement, file download.

mod client;
mod error;
pub mod types;

pub use client::BotClient;
pub use error::{TransportError, TransportErrorKind};
