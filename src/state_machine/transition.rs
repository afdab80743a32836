//! Pure state transition function
//!
//! Given the same state and event this always produces the same result, with
//! no I/O. Events that do not apply to the current state are ignored: the
//! state is returned unchanged with no effects.

use super::event::{callback_data, CallbackAction, Command, Event};
use super::state::{BatchSpec, BatchStep, ConvertStep, SessionState, SingleSpec, SingleStep};
use super::{Effect, GenerateJob};
use crate::prompts;
use crate::telegram::types::InlineKeyboardMarkup;
use crate::{convert, validate};

/// Ceiling on uploaded documents (declared and downloaded size).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function.
pub fn transition(state: &SessionState, event: Event) -> TransitionResult {
    // Commands are global: they apply identically from every state.
    if let Event::Command(command) = &event {
        return handle_command(state, *command);
    }

    match (state, event) {
        // ============================================================
        // Single generation: five input steps, then confirm
        // ============================================================
        (SessionState::Single(SingleStep::Prefix), Event::Text(text)) => {
            match validate::letter_pair(&text) {
                Ok(prefix) => TransitionResult::new(SessionState::Single(SingleStep::Code {
                    prefix: prefix.clone(),
                }))
                .with_effect(Effect::reply(prompts::single_code_prompt(&prefix))),
                Err(e) => reprompt(state, &e),
            }
        }

        (SessionState::Single(SingleStep::Code { prefix }), Event::Text(text)) => {
            match validate::digit_pair(&text) {
                Ok(code) => TransitionResult::new(SessionState::Single(SingleStep::Series {
                    prefix: prefix.clone(),
                    code: code.clone(),
                }))
                .with_effect(Effect::reply(prompts::single_series_prompt(prefix, &code))),
                Err(e) => reprompt(state, &e),
            }
        }

        (SessionState::Single(SingleStep::Series { prefix, code }), Event::Text(text)) => {
            match validate::letter_pair(&text) {
                Ok(series) => TransitionResult::new(SessionState::Single(SingleStep::RangeStart {
                    prefix: prefix.clone(),
                    code: code.clone(),
                    series: series.clone(),
                }))
                .with_effect(Effect::reply(prompts::single_start_prompt(
                    prefix, code, &series,
                ))),
                Err(e) => reprompt(state, &e),
            }
        }

        (
            SessionState::Single(SingleStep::RangeStart {
                prefix,
                code,
                series,
            }),
            Event::Text(text),
        ) => match validate::digit_quad(&text) {
            Ok(start) => TransitionResult::new(SessionState::Single(SingleStep::RangeEnd {
                prefix: prefix.clone(),
                code: code.clone(),
                series: series.clone(),
                start: start.clone(),
            }))
            .with_effect(Effect::reply(prompts::single_end_prompt(
                prefix, code, series, &start,
            ))),
            Err(e) => reprompt(state, &e),
        },

        (
            SessionState::Single(SingleStep::RangeEnd {
                prefix,
                code,
                series,
                start,
            }),
            Event::Text(text),
        ) => match validate::digit_quad(&text) {
            Ok(end) => {
                // Cross-field check the per-field rules cannot express.
                if numeric(start) > numeric(&end) {
                    return TransitionResult::new(state.clone())
                        .with_effect(Effect::reply(prompts::range_invalid(start, &end)));
                }
                let spec = SingleSpec {
                    prefix: prefix.clone(),
                    code: code.clone(),
                    series: series.clone(),
                    start: start.clone(),
                    end,
                };
                let text = prompts::confirm_single(&spec);
                TransitionResult::new(SessionState::Single(SingleStep::Confirm { spec }))
                    .with_effect(Effect::reply_keyboard(
                        text,
                        InlineKeyboardMarkup::rows(&[
                            ("✅ Generate Numbers", callback_data::GENERATE),
                            ("❌ Cancel", callback_data::CANCEL_GENERATION),
                        ]),
                    ))
            }
            Err(e) => reprompt(state, &e),
        },

        (
            SessionState::Single(SingleStep::Confirm { spec }),
            Event::Callback {
                action: CallbackAction::Confirm,
                message_id,
            },
        ) => TransitionResult::new(SessionState::Delivering)
            .with_effect(Effect::edit(message_id, prompts::generating()))
            .with_effect(Effect::Generate {
                job: GenerateJob::Single(spec.clone()),
                message_id,
            }),

        // ============================================================
        // Batch generation
        // ============================================================
        (SessionState::Batch(BatchStep::Prefix), Event::Text(text)) => {
            match validate::letter_pair(&text) {
                Ok(prefix) => TransitionResult::new(SessionState::Batch(BatchStep::Code {
                    prefix: prefix.clone(),
                }))
                .with_effect(Effect::reply(prompts::batch_code_prompt(&prefix))),
                Err(e) => reprompt(state, &e),
            }
        }

        (SessionState::Batch(BatchStep::Code { prefix }), Event::Text(text)) => {
            match validate::digit_pair(&text) {
                Ok(code) => TransitionResult::new(SessionState::Batch(BatchStep::SeriesList {
                    prefix: prefix.clone(),
                    code: code.clone(),
                }))
                .with_effect(Effect::reply(prompts::batch_series_prompt(&code))),
                Err(e) => reprompt(state, &e),
            }
        }

        (SessionState::Batch(BatchStep::SeriesList { prefix, code }), Event::Text(text)) => {
            match validate::series_list(&text) {
                Ok(series) => TransitionResult::new(SessionState::Batch(BatchStep::RangeStart {
                    prefix: prefix.clone(),
                    code: code.clone(),
                    series: series.clone(),
                }))
                .with_effect(Effect::reply(prompts::batch_start_prompt(&series))),
                Err(e) => reprompt(state, &e),
            }
        }

        (
            SessionState::Batch(BatchStep::RangeStart {
                prefix,
                code,
                series,
            }),
            Event::Text(text),
        ) => match validate::digit_quad(&text) {
            Ok(start) => TransitionResult::new(SessionState::Batch(BatchStep::RangeEnd {
                prefix: prefix.clone(),
                code: code.clone(),
                series: series.clone(),
                start: start.clone(),
            }))
            .with_effect(Effect::reply(prompts::batch_end_prompt(&start))),
            Err(e) => reprompt(state, &e),
        },

        (
            SessionState::Batch(BatchStep::RangeEnd {
                prefix,
                code,
                series,
                start,
            }),
            Event::Text(text),
        ) => match validate::digit_quad(&text) {
            Ok(end) => {
                if numeric(start) > numeric(&end) {
                    return TransitionResult::new(state.clone())
                        .with_effect(Effect::reply(prompts::range_invalid(start, &end)));
                }
                let spec = BatchSpec {
                    prefix: prefix.clone(),
                    code: code.clone(),
                    series: series.clone(),
                    start: start.clone(),
                    end,
                };
                let text = prompts::confirm_batch(&spec);
                TransitionResult::new(SessionState::Batch(BatchStep::Confirm { spec }))
                    .with_effect(Effect::reply_keyboard(
                        text,
                        InlineKeyboardMarkup::rows(&[
                            ("✅ Generate Batch", callback_data::BATCH_GENERATE),
                            ("❌ Cancel", callback_data::CANCEL_GENERATION),
                        ]),
                    ))
            }
            Err(e) => reprompt(state, &e),
        },

        (
            SessionState::Batch(BatchStep::Confirm { spec }),
            Event::Callback {
                action: CallbackAction::Confirm,
                message_id,
            },
        ) => TransitionResult::new(SessionState::Delivering)
            .with_effect(Effect::edit(
                message_id,
                prompts::generating_batch(spec.series.len()),
            ))
            .with_effect(Effect::Generate {
                job: GenerateJob::Batch(spec.clone()),
                message_id,
            }),

        // Abandoning a prepared run from either confirm step
        (
            SessionState::Single(SingleStep::Confirm { .. })
            | SessionState::Batch(BatchStep::Confirm { .. }),
            Event::Callback {
                action: CallbackAction::CancelRun,
                message_id,
            },
        ) => TransitionResult::new(SessionState::Idle)
            .with_effect(Effect::edit(message_id, prompts::generation_cancelled())),

        // ============================================================
        // TXT → CSV conversion
        // ============================================================
        (
            SessionState::Convert(ConvertStep::WaitingFile),
            Event::Document {
                file_id,
                file_name,
                file_size,
            },
        ) => {
            if !file_name.to_ascii_lowercase().ends_with(".txt") {
                return TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(prompts::not_a_txt_file()));
            }
            if file_size > MAX_UPLOAD_BYTES {
                return TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(prompts::file_too_large()));
            }
            TransitionResult::new(SessionState::Convert(ConvertStep::Converting))
                .with_effect(Effect::reply(prompts::downloading()))
                .with_effect(Effect::ConvertDocument { file_id, file_name })
        }

        (SessionState::Convert(ConvertStep::Converting), Event::ConversionReady { info }) => {
            let text = prompts::ask_rename(&info);
            TransitionResult::new(SessionState::Convert(ConvertStep::AskRename { info }))
                .with_effect(Effect::reply_keyboard(
                    text,
                    InlineKeyboardMarkup::rows(&[
                        ("✅ Use Default Name", callback_data::CSV_USE_DEFAULT),
                        ("✏️ Rename File", callback_data::CSV_RENAME),
                        ("❌ Cancel", callback_data::CSV_CANCEL),
                    ]),
                ))
        }

        (SessionState::Convert(ConvertStep::Converting), Event::ConversionFailed { reason }) => {
            TransitionResult::new(SessionState::Idle)
                .with_effect(Effect::reply(prompts::conversion_failed(&reason)))
        }

        (
            SessionState::Convert(ConvertStep::AskRename { info }),
            Event::Callback {
                action: CallbackAction::UseDefault,
                message_id,
            },
        ) => TransitionResult::new(SessionState::Delivering)
            .with_effect(Effect::edit(message_id, prompts::sending_default()))
            .with_effect(Effect::Deliver {
                file_name: info.file_name.clone(),
            }),

        (
            SessionState::Convert(ConvertStep::AskRename { info }),
            Event::Callback {
                action: CallbackAction::Rename,
                message_id,
            },
        ) => TransitionResult::new(SessionState::Convert(ConvertStep::WaitingRename {
            info: info.clone(),
        }))
        .with_effect(Effect::edit(message_id, prompts::rename_prompt())),

        (
            SessionState::Convert(
                ConvertStep::AskRename { .. } | ConvertStep::WaitingRename { .. },
            ),
            Event::Callback {
                action: CallbackAction::CancelConvert,
                message_id,
            },
        ) => TransitionResult::new(SessionState::Idle)
            .with_effect(Effect::DiscardArtifact)
            .with_effect(Effect::edit(message_id, prompts::convert_cancelled())),

        (SessionState::Convert(ConvertStep::WaitingRename { .. }), Event::Text(text)) => {
            match convert::sanitize_file_name(&text) {
                Some(file_name) => TransitionResult::new(SessionState::Delivering)
                    .with_effect(Effect::Deliver { file_name }),
                None => TransitionResult::new(state.clone())
                    .with_effect(Effect::reply(prompts::invalid_file_name())),
            }
        }

        // ============================================================
        // Pipeline completion
        // ============================================================
        // The pipeline already messaged the user on both outcomes.
        (SessionState::Delivering, Event::DeliveryFinished) => {
            TransitionResult::new(SessionState::Idle)
        }

        // Anything else is inapplicable to the current state: ignore.
        (state, _) => TransitionResult::new(state.clone()),
    }
}

fn handle_command(state: &SessionState, command: Command) -> TransitionResult {
    let mut result = match command {
        Command::Help => {
            return TransitionResult::new(state.clone()).with_effect(Effect::reply(prompts::help()))
        }
        Command::Cancel => TransitionResult::new(SessionState::Idle)
            .with_effect(Effect::reply(prompts::cancelled())),
        Command::Single => TransitionResult::new(SessionState::Single(SingleStep::Prefix))
            .with_effect(Effect::reply(prompts::welcome_single())),
        Command::Batch => TransitionResult::new(SessionState::Batch(BatchStep::Prefix))
            .with_effect(Effect::reply(prompts::welcome_batch())),
        Command::Convert => TransitionResult::new(SessionState::Convert(ConvertStep::WaitingFile))
            .with_effect(Effect::reply(prompts::welcome_convert())),
    };

    // Abandoning a workflow that already materialized a file removes it.
    if state.holds_artifact() {
        result.effects.insert(0, Effect::DiscardArtifact);
    }
    result
}

fn reprompt(state: &SessionState, error: &validate::ValidationError) -> TransitionResult {
    TransitionResult::new(state.clone()).with_effect(Effect::reply(prompts::invalid_input(error)))
}

fn numeric(digits: &str) -> u64 {
    digits.parse().unwrap_or(0)
}
