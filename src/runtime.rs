//! Runtime for executing sessions
//!
//! One actor per chat, owned by the [`SessionManager`]. Events for the same
//! chat are processed in order; unrelated chats never block each other.

mod delivery;
mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::Transport;

use crate::state_machine::Event;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Handle to interact with a running session
struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
}

/// Manager for all per-chat session runtimes
pub struct SessionManager<T: Transport + 'static> {
    transport: Arc<T>,
    spool_dir: PathBuf,
    sessions: RwLock<HashMap<i64, SessionHandle>>,
}

impl<T: Transport + 'static> SessionManager<T> {
    pub fn new(transport: Arc<T>, spool_dir: PathBuf) -> Self {
        Self {
            transport,
            spool_dir,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Route an event to the owning chat's actor, starting one if needed.
    pub async fn send_event(&self, chat_id: i64, event: Event) {
        let event_tx = self.get_or_create(chat_id).await;
        if event_tx.send(event).await.is_err() {
            // The actor died; drop the stale handle so the next event
            // starts a fresh one.
            tracing::warn!(chat_id, "session actor gone, dropping handle");
            self.sessions.write().await.remove(&chat_id);
        }
    }

    async fn get_or_create(&self, chat_id: i64) -> mpsc::Sender<Event> {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(&chat_id) {
                return handle.event_tx.clone();
            }
        }

        let (event_tx, event_rx) = mpsc::channel(32);
        let runtime = SessionRuntime::new(
            chat_id,
            self.transport.clone(),
            self.spool_dir.clone(),
            event_rx,
        );
        tokio::spawn(async move {
            runtime.run().await;
        });

        self.sessions.write().await.insert(
            chat_id,
            SessionHandle {
                event_tx: event_tx.clone(),
            },
        );
        tracing::debug!(chat_id, "started session actor");

        event_tx
    }
}
