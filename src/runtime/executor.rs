//! Session runtime executor
//!
//! One actor per chat: events are processed strictly in arrival order, so a
//! session's state is never mutated concurrently, while other chats' actors
//! run independently.

use super::delivery::{self, Delivery, DeliveryReport};
use super::traits::Transport;
use crate::generate::{self, Artifact};
use crate::state_machine::state::ArtifactInfo;
use crate::state_machine::transition::MAX_UPLOAD_BYTES;
use crate::state_machine::{transition, Effect, Event, GenerateJob, SessionState};
use crate::{convert, prompts};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempPath;
use tokio::sync::mpsc;

/// A converted file held between conversion and the user's rename decision.
///
/// Both paths are drop-guarded: dropping the pending artifact (cancel, new
/// workflow, actor shutdown) removes the spool files.
#[derive(Debug)]
pub struct PendingArtifact {
    pub output: TempPath,
    pub source: TempPath,
    pub records: u64,
    pub bytes: u64,
}

/// Generic session runtime, parameterized over the transport for testing.
pub struct SessionRuntime<T: Transport + 'static> {
    chat_id: i64,
    state: SessionState,
    transport: Arc<T>,
    spool_dir: PathBuf,
    event_rx: mpsc::Receiver<Event>,
    pending_artifact: Option<PendingArtifact>,
}

impl<T: Transport + 'static> SessionRuntime<T> {
    pub fn new(
        chat_id: i64,
        transport: Arc<T>,
        spool_dir: PathBuf,
        event_rx: mpsc::Receiver<Event>,
    ) -> Self {
        Self {
            chat_id,
            state: SessionState::Idle,
            transport,
            spool_dir,
            event_rx,
            pending_artifact: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(chat_id = self.chat_id, "starting session runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event).await;
        }

        tracing::info!(chat_id = self.chat_id, "session runtime stopped");
    }

    /// Apply one inbound event, executing effects and any events they
    /// generate until the machine settles.
    pub(crate) async fn process_event(&mut self, event: Event) {
        let mut queue = vec![event];

        while let Some(event) = queue.pop() {
            let result = transition(&self.state, event);
            let from = self.state.label();
            self.state = result.new_state;
            if from != self.state.label() {
                tracing::debug!(
                    chat_id = self.chat_id,
                    from,
                    to = self.state.label(),
                    "state transition"
                );
            }

            for effect in result.effects {
                if let Some(generated) = self.execute_effect(effect).await {
                    queue.push(generated);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn has_pending_artifact(&self) -> bool {
        self.pending_artifact.is_some()
    }

    /// Execute an effect and optionally return a generated event.
    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Reply { text } => {
                delivery::send_text_with_retry(self.transport.as_ref(), self.chat_id, &text, None)
                    .await;
                None
            }

            Effect::ReplyKeyboard { text, keyboard } => {
                delivery::send_text_with_retry(
                    self.transport.as_ref(),
                    self.chat_id,
                    &text,
                    Some(keyboard),
                )
                .await;
                None
            }

            Effect::Edit { message_id, text } => {
                if let Err(e) = self
                    .transport
                    .edit_text(self.chat_id, message_id, &text)
                    .await
                {
                    tracing::warn!(chat_id = self.chat_id, error = %e, "failed to edit message");
                }
                None
            }

            Effect::Generate { job, message_id } => {
                Some(self.run_generation(job, message_id).await)
            }

            Effect::ConvertDocument { file_id, file_name } => {
                Some(self.run_conversion(&file_id, &file_name).await)
            }

            Effect::Deliver { file_name } => Some(self.deliver_pending(file_name).await),

            Effect::DiscardArtifact => {
                if self.pending_artifact.take().is_some() {
                    tracing::debug!(chat_id = self.chat_id, "discarded pending artifact");
                }
                None
            }
        }
    }

    /// Run a generation job to a spool file and deliver it. Always resolves
    /// the `Delivering` state via `DeliveryFinished`.
    async fn run_generation(&mut self, job: GenerateJob, message_id: i64) -> Event {
        let spool_dir = self.spool_dir.clone();
        let blocking_job = job.clone();
        let generated = tokio::task::spawn_blocking(move || match &blocking_job {
            GenerateJob::Single(spec) => generate::generate_single(
                &spool_dir,
                &spec.prefix,
                &spec.code,
                &spec.series,
                &spec.start,
                &spec.end,
            ),
            GenerateJob::Batch(spec) => generate::generate_batch(
                &spool_dir,
                &spec.prefix,
                &spec.code,
                &spec.series,
                &spec.start,
                &spec.end,
            ),
        })
        .await;

        let artifact: Artifact = match generated {
            Ok(Ok(artifact)) => artifact,
            Ok(Err(e)) => {
                tracing::warn!(chat_id = self.chat_id, error = %e, "generation failed");
                self.edit_or_reply(
                    message_id,
                    &prompts::generation_failed(&e.to_string(), job.restart_command()),
                )
                .await;
                return Event::DeliveryFinished;
            }
            Err(e) => {
                tracing::error!(chat_id = self.chat_id, error = %e, "generation task panicked");
                self.edit_or_reply(message_id, &prompts::generic_error()).await;
                return Event::DeliveryFinished;
            }
        };

        tracing::info!(
            chat_id = self.chat_id,
            records = artifact.records,
            bytes = artifact.bytes,
            "generated spool file"
        );

        let report = match &job {
            GenerateJob::Single(spec) => DeliveryReport {
                caption: prompts::single_caption(spec, artifact.records, artifact.bytes),
                success: prompts::single_done(artifact.records),
                exhausted: prompts::generation_send_failed(artifact.records),
                progress_message_id: Some(message_id),
            },
            GenerateJob::Batch(spec) => DeliveryReport {
                caption: prompts::batch_caption(spec, artifact.records, artifact.bytes),
                success: prompts::batch_done(artifact.records, spec.series.len()),
                exhausted: prompts::generation_send_failed(artifact.records),
                progress_message_id: Some(message_id),
            },
        };
        let outcome = delivery::deliver(
            self.transport.as_ref(),
            self.chat_id,
            Delivery {
                path: artifact.path,
                source: None,
                file_name: artifact.file_name,
            },
            report,
        )
        .await;
        tracing::info!(chat_id = self.chat_id, ?outcome, "generation delivery finished");

        Event::DeliveryFinished
    }

    /// Download an uploaded document and convert it; the resulting files are
    /// stashed as the pending artifact until the user picks an output name.
    async fn run_conversion(&mut self, file_id: &str, file_name: &str) -> Event {
        let source = match self.spool_file("upload_", ".txt") {
            Ok(path) => path,
            Err(reason) => return Event::ConversionFailed { reason },
        };

        let size = match self.transport.download_document(file_id, &source).await {
            Ok(size) => size,
            Err(e) => {
                tracing::warn!(chat_id = self.chat_id, error = %e, "document download failed");
                return Event::ConversionFailed {
                    reason: e.to_string(),
                };
            }
        };
        if size > MAX_UPLOAD_BYTES {
            return Event::ConversionFailed {
                reason: "File too large! Maximum: 50 MB".to_string(),
            };
        }

        delivery::send_text_with_retry(
            self.transport.as_ref(),
            self.chat_id,
            &prompts::converting(),
            None,
        )
        .await;

        let output = match self.spool_file("converted_", ".csv") {
            Ok(path) => path,
            Err(reason) => return Event::ConversionFailed { reason },
        };

        let source_path = source.to_path_buf();
        let output_path = output.to_path_buf();
        let converted =
            tokio::task::spawn_blocking(move || convert::convert_file(&source_path, &output_path))
                .await;

        match converted {
            Ok(Ok(stats)) => {
                let info = ArtifactInfo {
                    file_name: convert::default_output_name(file_name),
                    records: stats.records,
                    bytes: stats.bytes,
                };
                self.pending_artifact = Some(PendingArtifact {
                    output,
                    source,
                    records: stats.records,
                    bytes: stats.bytes,
                });
                tracing::info!(
                    chat_id = self.chat_id,
                    records = stats.records,
                    bytes = stats.bytes,
                    "conversion complete"
                );
                Event::ConversionReady { info }
            }
            Ok(Err(e)) => {
                // Source and output guards drop here, removing both files.
                tracing::warn!(chat_id = self.chat_id, error = %e, "conversion failed");
                Event::ConversionFailed {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                tracing::error!(chat_id = self.chat_id, error = %e, "conversion task panicked");
                Event::ConversionFailed {
                    reason: "internal error".to_string(),
                }
            }
        }
    }

    /// Deliver the pending converted artifact under the chosen name.
    async fn deliver_pending(&mut self, file_name: String) -> Event {
        let Some(pending) = self.pending_artifact.take() else {
            // The button outlived the artifact (e.g. after a restart of the
            // workflow); tell the user to start over.
            delivery::send_text_with_retry(
                self.transport.as_ref(),
                self.chat_id,
                &prompts::artifact_missing(),
                None,
            )
            .await;
            return Event::DeliveryFinished;
        };

        let info = ArtifactInfo {
            file_name: file_name.clone(),
            records: pending.records,
            bytes: pending.bytes,
        };
        let report = DeliveryReport {
            caption: prompts::convert_caption(&info, &file_name),
            success: prompts::convert_done(pending.records, &file_name),
            exhausted: prompts::convert_send_failed(pending.bytes),
            progress_message_id: None,
        };
        let outcome = delivery::deliver(
            self.transport.as_ref(),
            self.chat_id,
            Delivery {
                path: pending.output,
                source: Some(pending.source),
                file_name,
            },
            report,
        )
        .await;
        tracing::info!(chat_id = self.chat_id, ?outcome, "conversion delivery finished");

        Event::DeliveryFinished
    }

    fn spool_file(&self, prefix: &str, suffix: &str) -> Result<TempPath, String> {
        tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.spool_dir)
            .map(tempfile::NamedTempFile::into_temp_path)
            .map_err(|e| {
                tracing::error!(chat_id = self.chat_id, error = %e, "failed to create spool file");
                "could not create a temporary file".to_string()
            })
    }

    async fn edit_or_reply(&self, message_id: i64, text: &str) {
        if self
            .transport
            .edit_text(self.chat_id, message_id, text)
            .await
            .is_err()
        {
            delivery::send_text_with_retry(self.transport.as_ref(), self.chat_id, text, None)
                .await;
        }
    }
}
