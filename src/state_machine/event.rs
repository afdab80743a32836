//! Events that drive a session's state machine

use crate::state_machine::state::ArtifactInfo;

/// Discrete command triggers parsed from inbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start` - single-series generation
    Single,
    /// `/batch` - multi-series generation
    Batch,
    /// `/txt2csv` - file conversion
    Convert,
    /// `/help`
    Help,
    /// `/cancel`
    Cancel,
}

/// Inline-keyboard button presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Run the prepared generation job.
    Confirm,
    /// Abandon a prepared generation job.
    CancelRun,
    /// Deliver the converted file under its derived name.
    UseDefault,
    /// Ask for a custom output name.
    Rename,
    /// Abandon the converted file.
    CancelConvert,
}

/// Raw `callback_data` strings, shared between keyboard construction and
/// callback parsing.
pub mod callback_data {
    pub const GENERATE: &str = "generate";
    pub const BATCH_GENERATE: &str = "batch_generate";
    pub const CANCEL_GENERATION: &str = "cancel_gen";
    pub const CSV_USE_DEFAULT: &str = "csv_use_default";
    pub const CSV_RENAME: &str = "csv_rename";
    pub const CSV_CANCEL: &str = "csv_cancel";
}

impl CallbackAction {
    /// Parse the wire `callback_data`; unknown payloads are dropped by the
    /// dispatcher before they reach the state machine.
    pub fn from_data(data: &str) -> Option<Self> {
        match data {
            callback_data::GENERATE | callback_data::BATCH_GENERATE => Some(Self::Confirm),
            callback_data::CANCEL_GENERATION => Some(Self::CancelRun),
            callback_data::CSV_USE_DEFAULT => Some(Self::UseDefault),
            callback_data::CSV_RENAME => Some(Self::Rename),
            callback_data::CSV_CANCEL => Some(Self::CancelConvert),
            _ => None,
        }
    }
}

/// Events that trigger state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Inbound from the dispatcher
    Command(Command),
    Text(String),
    Document {
        file_id: String,
        file_name: String,
        file_size: u64,
    },
    Callback {
        action: CallbackAction,
        /// Message carrying the pressed keyboard, for in-place edits.
        message_id: i64,
    },

    // Reported back by the runtime after executing effects
    ConversionReady {
        info: ArtifactInfo,
    },
    ConversionFailed {
        reason: String,
    },
    DeliveryFinished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_callback_data() {
        assert_eq!(
            CallbackAction::from_data("generate"),
            Some(CallbackAction::Confirm)
        );
        assert_eq!(
            CallbackAction::from_data("batch_generate"),
            Some(CallbackAction::Confirm)
        );
        assert_eq!(
            CallbackAction::from_data("csv_rename"),
            Some(CallbackAction::Rename)
        );
        assert_eq!(CallbackAction::from_data("nonsense"), None);
    }
}
