//! Inbound update dispatch
//!
//! Long-polls the Bot API, maps updates to state-machine events, and routes
//! them to the owning chat's session actor.

use crate::runtime::SessionManager;
use crate::state_machine::{CallbackAction, Command, Event};
use crate::telegram::types::{CallbackQuery, Message, Update};
use crate::telegram::BotClient;
use std::sync::Arc;
use std::time::Duration;

/// Pause before re-polling after a transport error.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Parse a leading bot command; unknown commands map to `None` and are
/// dropped entirely.
pub fn parse_command(text: &str) -> Option<Command> {
    let token = text.split_whitespace().next()?;
    // Commands may carry the bot's username: `/start@some_bot`.
    let command = token.split('@').next().unwrap_or(token);
    match command {
        "/start" => Some(Command::Single),
        "/batch" => Some(Command::Batch),
        "/txt2csv" => Some(Command::Convert),
        "/help" => Some(Command::Help),
        "/cancel" => Some(Command::Cancel),
        _ => None,
    }
}

/// Map an update to `(chat_id, event)`; `None` means nothing to route.
pub fn map_update(update: Update) -> Option<(i64, Event)> {
    if let Some(message) = update.message {
        return map_message(message);
    }
    if let Some(query) = update.callback_query {
        return map_callback(query);
    }
    None
}

fn map_message(message: Message) -> Option<(i64, Event)> {
    let chat_id = message.chat.id;

    if let Some(document) = message.document {
        return Some((
            chat_id,
            Event::Document {
                file_id: document.file_id,
                file_name: document
                    .file_name
                    .unwrap_or_else(|| "document.txt".to_string()),
                file_size: document.file_size.unwrap_or(0),
            },
        ));
    }

    let text = message.text?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('/') {
        return parse_command(trimmed).map(|command| (chat_id, Event::Command(command)));
    }
    Some((chat_id, Event::Text(trimmed.to_string())))
}

fn map_callback(query: CallbackQuery) -> Option<(i64, Event)> {
    let message = query.message?;
    let action = CallbackAction::from_data(query.data.as_deref()?)?;
    Some((
        message.chat.id,
        Event::Callback {
            action,
            message_id: message.message_id,
        },
    ))
}

/// Run the long-poll loop. Never returns under normal operation.
pub async fn run(
    client: Arc<BotClient>,
    manager: SessionManager<BotClient>,
    poll_timeout_secs: u64,
) {
    // Skip any backlog accumulated while the bot was down.
    let mut offset = match client.get_updates(-1, 0).await {
        Ok(updates) => updates.last().map_or(0, |u| u.update_id + 1),
        Err(e) => {
            tracing::warn!(error = %e, "failed to drop pending updates");
            0
        }
    };

    tracing::info!("bot is ready; commands: /start, /batch, /txt2csv, /help, /cancel");

    loop {
        let updates = match client.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "update poll failed, backing off");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            if let Some(query) = &update.callback_query {
                // Acknowledge the button press immediately so the client
                // spinner stops; a lost ack is cosmetic.
                if let Err(e) = client.answer_callback_query(&query.id).await {
                    tracing::debug!(error = %e, "failed to answer callback query");
                }
            }

            if let Some((chat_id, event)) = map_update(update) {
                manager.send_event(chat_id, event).await;
            }
        }
    }
}
