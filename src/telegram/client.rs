//! Bot API HTTP client

use super::error::{TransportError, TransportErrorKind};
use super::types::{ApiResponse, FileInfo, InlineKeyboardMarkup, Message, Update};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

/// Extra slack on top of the long-poll window before the HTTP request itself
/// times out.
const POLL_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// Telegram Bot API client.
pub struct BotClient {
    http: Client,
    base_url: String,
    file_base_url: String,
}

impl BotClient {
    pub fn new(token: &str) -> Result<Self, TransportError> {
        Self::with_base_url(token, "https://api.telegram.org")
    }

    /// Point the client at a different API host (used by tests).
    pub fn with_base_url(token: &str, host: &str) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| TransportError::unknown(format!("failed to build HTTP client: {e}")))?;

        let host = host.trim_end_matches('/');
        Ok(Self {
            http,
            base_url: format!("{host}/bot{token}"),
            file_base_url: format!("{host}/file/bot{token}"),
        })
    }

    /// Long-poll for updates. Blocks up to `timeout_secs` server-side.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        #[derive(Serialize)]
        struct GetUpdates {
            offset: i64,
            timeout: u64,
            allowed_updates: [&'static str; 2],
        }

        let payload = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: ["message", "callback_query"],
        };

        let response = self
            .http
            .post(format!("{}/getUpdates", self.base_url))
            .timeout(Duration::from_secs(timeout_secs) + POLL_TIMEOUT_SLACK)
            .json(&payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode(response).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError> {
        #[derive(Serialize)]
        struct SendMessage<'a> {
            chat_id: i64,
            text: &'a str,
            parse_mode: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            reply_markup: Option<&'a InlineKeyboardMarkup>,
        }

        self.call(
            "sendMessage",
            &SendMessage {
                chat_id,
                text,
                parse_mode: "Markdown",
                reply_markup: keyboard,
            },
        )
        .await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        #[derive(Serialize)]
        struct EditMessageText<'a> {
            chat_id: i64,
            message_id: i64,
            text: &'a str,
            parse_mode: &'static str,
        }

        // The result is the edited Message or `true`; neither is needed.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &EditMessageText {
                    chat_id,
                    message_id,
                    text,
                    parse_mode: "Markdown",
                },
            )
            .await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<(), TransportError> {
        let _: serde_json::Value = self
            .call(
                "answerCallbackQuery",
                &serde_json::json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }

    /// Upload a document from disk, streamed.
    pub async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| TransportError::unknown(format!("failed to open spool file: {e}")))?;

        let part = Part::stream(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| TransportError::unknown(format!("invalid mime type: {e}")))?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("parse_mode", "Markdown")
            .part("document", part);

        let response = self
            .http
            .post(format!("{}/sendDocument", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let _: serde_json::Value = decode(response).await?;
        Ok(())
    }

    /// Resolve a file id via `getFile` and stream its contents to `dest`.
    /// Returns the number of bytes written.
    pub async fn download_file(&self, file_id: &str, dest: &Path) -> Result<u64, TransportError> {
        let info: FileInfo = self
            .call("getFile", &serde_json::json!({ "file_id": file_id }))
            .await?;
        let file_path = info
            .file_path
            .ok_or_else(|| TransportError::unknown("getFile returned no file_path"))?;

        let response = self
            .http
            .get(format!("{}/{}", self.file_base_url, file_path))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, "file download failed"));
        }

        let mut out = tokio::fs::File::create(dest)
            .await
            .map_err(|e| TransportError::unknown(format!("failed to create temp file: {e}")))?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| TransportError::network(format!("download interrupted: {e}")))?;
            out.write_all(&chunk)
                .await
                .map_err(|e| TransportError::unknown(format!("failed to write temp file: {e}")))?;
            written += chunk.len() as u64;
        }
        out.flush()
            .await
            .map_err(|e| TransportError::unknown(format!("failed to flush temp file: {e}")))?;
        Ok(written)
    }

    async fn call<R, P>(&self, method: &str, payload: &P) -> Result<R, TransportError>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode(response).await
    }
}

/// Unwrap the Bot API response envelope, classifying failures.
async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::network(format!("failed to read response: {e}")))?;

    // The Bot API wraps errors in the same JSON envelope; fall back to the
    // HTTP status when the body is not parseable.
    let Ok(envelope) = serde_json::from_str::<ApiResponse<R>>(&body) else {
        return Err(classify_status(status, &body));
    };

    if envelope.ok {
        envelope
            .result
            .ok_or_else(|| TransportError::unknown("response envelope missing result"))
    } else {
        let description = envelope
            .description
            .unwrap_or_else(|| format!("HTTP {status}"));
        let code = envelope.error_code.unwrap_or_else(|| i64::from(status.as_u16()));
        let mut err = match code {
            401 | 403 => TransportError::auth(description),
            429 => TransportError::flood(description),
            400 => TransportError::bad_request(description),
            500..=599 => TransportError::server_error(description),
            _ => TransportError::unknown(description),
        };
        if err.kind == TransportErrorKind::Flood {
            if let Some(retry_after) = envelope.parameters.and_then(|p| p.retry_after) {
                err = err.with_retry_after(Duration::from_secs(retry_after));
            }
        }
        Err(err)
    }
}

fn classify_status(status: StatusCode, body: &str) -> TransportError {
    let message = format!("HTTP {status}: {body}");
    match status.as_u16() {
        401 | 403 => TransportError::auth(message),
        429 => TransportError::flood(message),
        400 => TransportError::bad_request(message),
        500..=599 => TransportError::server_error(message),
        _ => TransportError::unknown(message),
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout(format!("request timeout: {e}"))
    } else if e.is_connect() {
        TransportError::network(format!("connection failed: {e}"))
    } else {
        TransportError::unknown(format!("request failed: {e}"))
    }
}
