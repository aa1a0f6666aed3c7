//! Collaborator traits for durable storage.
//!
//! [`SessionStore`] persists the in-progress review session;
//! [`NoteStore`] is the permanent collection approved cards are committed
//! into. Both are used behind `Arc<dyn _>` so the workflow can run against
//! the real backends or test doubles.

use async_trait::async_trait;

use crate::note::NativeNote;
use crate::session::Session;
use crate::types::DeckId;

/// Errors reported by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached (closed pool, I/O failure, ...).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The backend refused this particular item.
    #[error("Rejected by store: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable snapshot of the current review session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Overwrite the snapshot with `session`.
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Read the snapshot. Absent, unreadable, unrecognised and expired
    /// snapshots all yield `None`.
    async fn load(&self) -> Option<Session>;

    /// Delete the snapshot; a no-op if there is none.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Whether an added note was new or matched an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

/// The permanent note collection.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn deck_exists(&self, deck_id: DeckId) -> Result<bool, StoreError>;

    /// Add a note unless the collection's duplicate policy matches it.
    async fn add_note(&self, note: &NativeNote) -> Result<AddOutcome, StoreError>;
}
