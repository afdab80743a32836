//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::telegram::types::InlineKeyboardMarkup;
use crate::telegram::{BotClient, TransportError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Outbound transport operations the runtime depends on.
///
/// Every method is fallible with a [`TransportError`] whose kind
/// distinguishes transient failures (retried by the delivery pipeline) from
/// permanent ones.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a Markdown text message, optionally with an inline keyboard.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TransportError>;

    /// Edit a previously sent message in place.
    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError>;

    /// Upload a document from disk with a caption.
    async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> Result<(), TransportError>;

    /// Download an uploaded document to `dest`, returning its byte size.
    async fn download_document(&self, file_id: &str, dest: &Path)
        -> Result<u64, TransportError>;
}

// ============================================================================
// Arc implementation for trait objects
// ============================================================================

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        (**self).send_text(chat_id, text, keyboard).await
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        (**self).edit_text(chat_id, message_id, text).await
    }

    async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        (**self)
            .send_document(chat_id, path, file_name, caption)
            .await
    }

    async fn download_document(
        &self,
        file_id: &str,
        dest: &Path,
    ) -> Result<u64, TransportError> {
        (**self).download_document(file_id, dest).await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

#[async_trait]
impl Transport for BotClient {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        self.send_message(chat_id, text, keyboard.as_ref())
            .await
            .map(|_| ())
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        self.edit_message_text(chat_id, message_id, text).await
    }

    async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        BotClient::send_document(self, chat_id, path, file_name, caption).await
    }

    async fn download_document(
        &self,
        file_id: &str,
        dest: &Path,
    ) -> Result<u64, TransportError> {
        self.download_file(file_id, dest).await
    }
}
