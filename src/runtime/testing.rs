//! Mock implementations for testing
//!
//! These mocks enable integration testing without real network I/O.

use super::executor::SessionRuntime;
use super::traits::Transport;
use crate::state_machine::{CallbackAction, Command, Event};
use crate::telegram::types::InlineKeyboardMarkup;
use crate::telegram::TransportError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// ============================================================================
// Mock Transport
// ============================================================================

/// A document the mock "sent", with its content captured before the spool
/// file is removed.
#[derive(Debug, Clone)]
pub struct SentDocument {
    pub chat_id: i64,
    pub file_name: String,
    pub caption: String,
    pub content: String,
}

/// Mock transport recording all outbound calls, with scriptable failures.
#[derive(Default)]
pub struct MockTransport {
    /// Text replies, in order.
    pub texts: Mutex<Vec<String>>,
    /// Keyboards attached to replies.
    pub keyboards: Mutex<Vec<InlineKeyboardMarkup>>,
    /// In-place edits, in order.
    pub edits: Mutex<Vec<String>>,
    /// Successfully sent documents.
    pub documents: Mutex<Vec<SentDocument>>,
    /// Total `send_document` attempts, including failed ones.
    pub document_attempts: Mutex<u32>,

    document_failures: Mutex<VecDeque<TransportError>>,
    download_body: Mutex<Option<String>>,
    download_error: Mutex<Option<TransportError>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue failures for the next `send_document` calls; once drained,
    /// sends succeed.
    pub fn script_document_failures(&self, errors: impl IntoIterator<Item = TransportError>) {
        self.document_failures.lock().unwrap().extend(errors);
    }

    /// Serve this body for `download_document` calls.
    pub fn serve_download(&self, body: &str) {
        *self.download_body.lock().unwrap() = Some(body.to_string());
    }

    /// Fail the next `download_document` call.
    pub fn fail_download(&self, error: TransportError) {
        *self.download_error.lock().unwrap() = Some(error);
    }

    pub fn recorded_texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn recorded_documents(&self) -> Vec<SentDocument> {
        self.documents.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> u32 {
        *self.document_attempts.lock().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(
        &self,
        _chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), TransportError> {
        self.texts.lock().unwrap().push(text.to_string());
        if let Some(keyboard) = keyboard {
            self.keyboards.lock().unwrap().push(keyboard);
        }
        Ok(())
    }

    async fn edit_text(
        &self,
        _chat_id: i64,
        _message_id: i64,
        text: &str,
    ) -> Result<(), TransportError> {
        self.edits.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        path: &Path,
        file_name: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        *self.document_attempts.lock().unwrap() += 1;
        if let Some(error) = self.document_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| TransportError::unknown(format!("mock read failed: {e}")))?;
        self.documents.lock().unwrap().push(SentDocument {
            chat_id,
            file_name: file_name.to_string(),
            caption: caption.to_string(),
            content,
        });
        Ok(())
    }

    async fn download_document(
        &self,
        _file_id: &str,
        dest: &Path,
    ) -> Result<u64, TransportError> {
        if let Some(error) = self.download_error.lock().unwrap().take() {
            return Err(error);
        }
        let body = self
            .download_body
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| TransportError::unknown("no scripted download body"))?;
        std::fs::write(dest, &body)
            .map_err(|e| TransportError::unknown(format!("mock write failed: {e}")))?;
        Ok(body.len() as u64)
    }
}

// ============================================================================
// Test Session Builder
// ============================================================================

/// A session runtime driven directly (no spawned actor), so tests apply
/// events deterministically and inspect state between them.
pub struct TestSession {
    pub transport: Arc<MockTransport>,
    pub runtime: SessionRuntime<MockTransport>,
    spool: tempfile::TempDir,
    _event_tx: mpsc::Sender<Event>,
}

impl TestSession {
    pub fn new() -> Self {
        let transport = Arc::new(MockTransport::new());
        let spool = tempfile::tempdir().expect("spool dir");
        let (event_tx, event_rx) = mpsc::channel(8);
        let runtime = SessionRuntime::new(
            42,
            transport.clone(),
            spool.path().to_path_buf(),
            event_rx,
        );
        Self {
            transport,
            runtime,
            spool,
            _event_tx: event_tx,
        }
    }

    pub async fn send(&mut self, event: Event) {
        self.runtime.process_event(event).await;
    }

    pub async fn send_text(&mut self, text: &str) {
        self.send(Event::Text(text.to_string())).await;
    }

    pub async fn send_command(&mut self, command: Command) {
        self.send(Event::Command(command)).await;
    }

    pub async fn press(&mut self, action: CallbackAction) {
        self.send(Event::Callback {
            action,
            message_id: 7,
        })
        .await;
    }

    pub async fn upload(&mut self, file_name: &str, file_size: u64) {
        self.send(Event::Document {
            file_id: "file-1".to_string(),
            file_name: file_name.to_string(),
            file_size,
        })
        .await;
    }

    /// Number of files left in the spool directory.
    pub fn spool_count(&self) -> usize {
        std::fs::read_dir(self.spool.path()).unwrap().count()
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::SessionState;

    async fn walk_to_confirm(session: &mut TestSession) {
        session.send_command(Command::Single).await;
        for input in ["AB", "12", "CD", "0001", "0100"] {
            session.send_text(input).await;
        }
    }

    #[tokio::test]
    async fn mock_transport_records_and_scripts() {
        let mock = MockTransport::new();
        mock.send_text(1, "hello", None).await.unwrap();
        assert_eq!(mock.recorded_texts(), vec!["hello"]);

        mock.script_document_failures([TransportError::timeout("t")]);
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "body").unwrap();
        assert!(mock.send_document(1, &file, "f.txt", "c").await.is_err());
        assert!(mock.send_document(1, &file, "f.txt", "c").await.is_ok());
        assert_eq!(mock.attempts(), 2);
        assert_eq!(mock.recorded_documents()[0].content, "body");
    }

    #[tokio::test]
    async fn single_generation_delivers_document() {
        let mut session = TestSession::new();
        walk_to_confirm(&mut session).await;
        session.press(CallbackAction::Confirm).await;

        let documents = session.transport.recorded_documents();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file_name, "vehicle_numbers_AB12CD.txt");
        let lines: Vec<&str> = documents[0].content.lines().collect();
        assert_eq!(lines.len(), 100);
        assert_eq!(lines[0], "AB12CD0001");
        assert_eq!(lines[99], "AB12CD0100");
        assert!(documents[0].caption.contains("100"));

        // Success closing message went out and the session reset.
        assert!(session
            .transport
            .recorded_texts()
            .iter()
            .any(|t| t.contains("Generation Complete")));
        assert_eq!(session.runtime.state(), &SessionState::Idle);
        assert_eq!(session.spool_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_is_retried_then_delivered() {
        let mut session = TestSession::new();
        session
            .transport
            .script_document_failures([TransportError::timeout("slow network")]);

        walk_to_confirm(&mut session).await;
        session.press(CallbackAction::Confirm).await;

        assert_eq!(session.transport.attempts(), 2);
        assert_eq!(session.transport.recorded_documents().len(), 1);
        assert_eq!(session.runtime.state(), &SessionState::Idle);
        assert_eq!(session.spool_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_exhaustion_cleans_up_exactly_once() {
        let mut session = TestSession::new();
        session.transport.script_document_failures([
            TransportError::timeout("t1"),
            TransportError::network("t2"),
            TransportError::timeout("t3"),
        ]);

        walk_to_confirm(&mut session).await;
        session.press(CallbackAction::Confirm).await;

        assert_eq!(session.transport.attempts(), 3);
        assert!(session.transport.recorded_documents().is_empty());
        // Failure notice edits the progress message.
        assert!(session
            .transport
            .edits
            .lock()
            .unwrap()
            .iter()
            .any(|t| t.contains("File too large to send")));
        assert_eq!(session.runtime.state(), &SessionState::Idle);
        assert_eq!(session.spool_count(), 0);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let mut session = TestSession::new();
        session
            .transport
            .script_document_failures([TransportError::bad_request("caption too long")]);

        walk_to_confirm(&mut session).await;
        session.press(CallbackAction::Confirm).await;

        assert_eq!(session.transport.attempts(), 1);
        assert_eq!(session.runtime.state(), &SessionState::Idle);
        assert_eq!(session.spool_count(), 0);
    }

    #[tokio::test]
    async fn cancel_mid_workflow_restarts_fresh() {
        let mut session = TestSession::new();
        session.send_command(Command::Single).await;
        session.send_text("AB").await;
        session.send_command(Command::Cancel).await;
        assert_eq!(session.runtime.state(), &SessionState::Idle);

        // A new run starts from the first step: "AB" must be re-entered.
        session.send_command(Command::Single).await;
        session.send_text("12").await; // not letters: rejected
        assert!(session
            .transport
            .recorded_texts()
            .iter()
            .any(|t| t.contains("Invalid Input")));
    }

    #[tokio::test]
    async fn conversion_delivers_with_default_name() {
        let mut session = TestSession::new();
        session
            .transport
            .serve_download("AB12CD0001 - 555 - extra\n\nbad line\nXY99ZZ0002 - 777\n");

        session.send_command(Command::Convert).await;
        session.upload("numbers.txt", 1000).await;
        assert!(session.runtime.has_pending_artifact());

        session.press(CallbackAction::UseDefault).await;

        let documents = session.transport.recorded_documents();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].chat_id, 42);
        assert_eq!(documents[0].file_name, "numbers.csv");
        assert_eq!(
            documents[0].content,
            "Number,Vehicle Number\n555,AB12CD0001\n777,XY99ZZ0002\n"
        );
        assert!(!session.runtime.has_pending_artifact());
        assert_eq!(session.runtime.state(), &SessionState::Idle);
        assert_eq!(session.spool_count(), 0);
    }

    #[tokio::test]
    async fn conversion_rename_sanitizes_custom_name() {
        let mut session = TestSession::new();
        session.transport.serve_download("AB12CD0001 - 555\n");

        session.send_command(Command::Convert).await;
        session.upload("in.txt", 100).await;
        session.press(CallbackAction::Rename).await;
        session.send_text("my:plates").await;

        let documents = session.transport.recorded_documents();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].file_name, "my_plates.csv");
        assert_eq!(session.spool_count(), 0);
    }

    #[tokio::test]
    async fn cancel_after_conversion_removes_spool_files() {
        let mut session = TestSession::new();
        session.transport.serve_download("AB12CD0001 - 555\n");

        session.send_command(Command::Convert).await;
        session.upload("in.txt", 100).await;
        assert!(session.runtime.has_pending_artifact());

        session.send_command(Command::Cancel).await;
        assert!(!session.runtime.has_pending_artifact());
        assert_eq!(session.spool_count(), 0);
        assert_eq!(session.runtime.state(), &SessionState::Idle);
    }

    #[tokio::test]
    async fn empty_upload_fails_conversion_and_resets() {
        let mut session = TestSession::new();
        session.transport.serve_download("");

        session.send_command(Command::Convert).await;
        session.upload("in.txt", 100).await;

        assert!(session
            .transport
            .recorded_texts()
            .iter()
            .any(|t| t.contains("Conversion failed")));
        assert_eq!(session.runtime.state(), &SessionState::Idle);
        assert_eq!(session.spool_count(), 0);
    }

    #[tokio::test]
    async fn download_failure_resets_session() {
        let mut session = TestSession::new();
        session
            .transport
            .fail_download(TransportError::network("gone"));

        session.send_command(Command::Convert).await;
        session.upload("in.txt", 100).await;

        assert_eq!(session.runtime.state(), &SessionState::Idle);
        assert_eq!(session.spool_count(), 0);
    }
}
