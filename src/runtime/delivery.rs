//! Artifact delivery pipeline
//!
//! Transmits a spool file with a bounded retry budget on transient transport
//! failures and guarantees the spool files are removed on every exit path:
//! the [`Delivery`] owns `TempPath` guards, so cleanup happens exactly once
//! when it goes out of scope.

use super::traits::Transport;
use crate::prompts;
use std::time::Duration;
use tempfile::TempPath;

/// Attempts for document uploads.
pub const DOCUMENT_ATTEMPTS: u32 = 3;
/// Attempts for plain text replies.
pub const TEXT_ATTEMPTS: u32 = 2;

const DOCUMENT_BACKOFF: Duration = Duration::from_secs(2);
const TEXT_BACKOFF: Duration = Duration::from_secs(1);

/// A deliverable spool file plus everything that must be cleaned up with it.
#[derive(Debug)]
pub struct Delivery {
    /// The file to transmit.
    pub path: TempPath,
    /// Intermediate input file (the downloaded TXT for conversions).
    pub source: Option<TempPath>,
    /// Name presented to the recipient.
    pub file_name: String,
}

/// User-facing texts for the possible outcomes of one delivery.
#[derive(Debug)]
pub struct DeliveryReport {
    /// Caption attached to the document on success.
    pub caption: String,
    /// Closing message after a successful upload.
    pub success: String,
    /// Message when the retry budget is exhausted.
    pub exhausted: String,
    /// Progress message to edit with failure notices, when one exists.
    pub progress_message_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Transient failures exhausted the retry budget.
    Exhausted,
    /// A permanent transport failure; not retried.
    Failed,
}

/// Send a text message with the smaller text retry budget.
///
/// Returns whether the message went out. Failures are logged, never
/// propagated: a lost status message must not take the session down.
pub async fn send_text_with_retry<T: Transport + ?Sized>(
    transport: &T,
    chat_id: i64,
    text: &str,
    keyboard: Option<crate::telegram::types::InlineKeyboardMarkup>,
) -> bool {
    let mut attempt = 1;
    loop {
        match transport.send_text(chat_id, text, keyboard.clone()).await {
            Ok(()) => return true,
            Err(e) if e.is_retryable() && attempt < TEXT_ATTEMPTS => {
                tracing::debug!(chat_id, attempt, error = %e, "retrying text send");
                attempt += 1;
                tokio::time::sleep(TEXT_BACKOFF).await;
            }
            Err(e) => {
                tracing::warn!(chat_id, attempt, error = %e, "failed to send message");
                return false;
            }
        }
    }
}

/// Transmit `delivery` and report the outcome to the user.
///
/// Consumes the delivery: its temp paths drop (and the files are removed)
/// when this returns, regardless of outcome.
pub async fn deliver<T: Transport + ?Sized>(
    transport: &T,
    chat_id: i64,
    delivery: Delivery,
    report: DeliveryReport,
) -> DeliveryOutcome {
    let mut attempt = 1;
    let outcome = loop {
        match transport
            .send_document(chat_id, &delivery.path, &delivery.file_name, &report.caption)
            .await
        {
            Ok(()) => break DeliveryOutcome::Delivered,
            Err(e) if e.is_retryable() && attempt < DOCUMENT_ATTEMPTS => {
                tracing::warn!(chat_id, attempt, error = %e, "transient send failure, retrying");
                // A server-provided flood delay wins when longer.
                let delay = e.retry_after.map_or(DOCUMENT_BACKOFF, |d| d.max(DOCUMENT_BACKOFF));
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(chat_id, attempt, error = %e, "delivery retry budget exhausted");
                break DeliveryOutcome::Exhausted;
            }
            Err(e) => {
                tracing::error!(chat_id, error = %e, "delivery failed");
                break DeliveryOutcome::Failed;
            }
        }
    };

    tracing::debug!(
        spool = %delivery.path.display(),
        with_source = delivery.source.is_some(),
        ?outcome,
        "delivery settled, removing spool files"
    );

    match outcome {
        DeliveryOutcome::Delivered => {
            send_text_with_retry(transport, chat_id, &report.success, None).await;
        }
        DeliveryOutcome::Exhausted => {
            notify_failure(transport, chat_id, &report, &report.exhausted).await;
        }
        DeliveryOutcome::Failed => {
            notify_failure(transport, chat_id, &report, &prompts::generic_error()).await;
        }
    }

    outcome
}

/// Prefer editing the progress message in place; fall back to a fresh reply.
async fn notify_failure<T: Transport + ?Sized>(
    transport: &T,
    chat_id: i64,
    report: &DeliveryReport,
    text: &str,
) {
    if let Some(message_id) = report.progress_message_id {
        if transport.edit_text(chat_id, message_id, text).await.is_ok() {
            return;
        }
    }
    send_text_with_retry(transport, chat_id, text, None).await;
}
