//! Effects produced by state transitions

use crate::state_machine::state::{BatchSpec, SingleSpec};
use crate::telegram::types::InlineKeyboardMarkup;

/// A prepared generation run handed to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateJob {
    Single(SingleSpec),
    Batch(BatchSpec),
}

impl GenerateJob {
    /// Command that restarts this workflow, for failure messages.
    pub fn restart_command(&self) -> &'static str {
        match self {
            GenerateJob::Single(_) => "/start",
            GenerateJob::Batch(_) => "/batch",
        }
    }
}

/// Effects to be executed after a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a text reply to the chat.
    Reply { text: String },

    /// Send a text reply carrying an inline keyboard.
    ReplyKeyboard {
        text: String,
        keyboard: InlineKeyboardMarkup,
    },

    /// Edit a previously sent message in place.
    Edit { message_id: i64, text: String },

    /// Run a generation job and deliver its artifact.
    Generate {
        job: GenerateJob,
        /// The confirm message, edited with progress and failure notices.
        message_id: i64,
    },

    /// Download an uploaded document and convert it; the runtime reports
    /// back with `ConversionReady` or `ConversionFailed`.
    ConvertDocument { file_id: String, file_name: String },

    /// Deliver the runtime-held converted artifact under `file_name`.
    Deliver { file_name: String },

    /// Drop the runtime-held artifact, removing its spool files.
    DiscardArtifact,
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }

    pub fn reply_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Effect::ReplyKeyboard {
            text: text.into(),
            keyboard,
        }
    }

    pub fn edit(message_id: i64, text: impl Into<String>) -> Self {
        Effect::Edit {
            message_id,
            text: text.into(),
        }
    }
}
