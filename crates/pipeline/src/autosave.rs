//! Background writer for session snapshots.
//!
//! Saves are queued and applied one at a time in the order they were
//! issued, so the snapshot on disk always trails the in-memory session by
//! at most the queue. Failures are logged and never reach the caller.

use std::sync::Arc;

use cardsmith_core::session::Session;
use cardsmith_core::store::SessionStore;
use tokio::sync::{mpsc, oneshot};

enum SaveCommand {
    Save(Box<Session>),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Handle to the ordered snapshot writer task.
#[derive(Clone)]
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<SaveCommand>,
}

impl AutoSaver {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(store: Arc<dyn SessionStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    SaveCommand::Save(session) => {
                        if let Err(e) = store.save(&session).await {
                            tracing::warn!(error = %e, "Failed to auto-save session");
                        }
                    }
                    SaveCommand::Clear => {
                        if let Err(e) = store.clear().await {
                            tracing::warn!(error = %e, "Failed to clear saved session");
                        }
                    }
                    SaveCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!("Session writer stopped");
        });

        Self { tx }
    }

    /// Queue a snapshot of `session`.
    pub fn save(&self, session: &Session) {
        self.send(SaveCommand::Save(Box::new(session.clone())));
    }

    /// Queue deletion of the snapshot.
    pub fn clear(&self) {
        self.send(SaveCommand::Clear);
    }

    /// Wait until every command queued so far has been applied.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.send(SaveCommand::Flush(tx));
        let _ = rx.await;
    }

    fn send(&self, command: SaveCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!("Session writer is gone; dropping snapshot command");
        }
    }
}
