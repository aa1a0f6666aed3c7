//! SQLite-backed note collection.

use async_trait::async_trait;
use cardsmith_core::note::NativeNote;
use cardsmith_core::store::{AddOutcome, NoteStore, StoreError};
use cardsmith_core::types::DeckId;
use cardsmith_core::validate::sanitize_tag;

use crate::models::note::CreateNote;
use crate::repositories::{DeckRepo, NoteRepo};
use crate::DbPool;

/// The permanent collection approved cards are committed into.
///
/// A note is a duplicate when another note of the same notetype has the
/// same normalized first field, in any deck.
#[derive(Clone)]
pub struct SqliteCollection {
    pool: DbPool,
}

impl SqliteCollection {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl NoteStore for SqliteCollection {
    async fn deck_exists(&self, deck_id: DeckId) -> Result<bool, StoreError> {
        let deck = DeckRepo::find_by_id(&self.pool, deck_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(deck.is_some())
    }

    async fn add_note(&self, note: &NativeNote) -> Result<AddOutcome, StoreError> {
        let sort_field = note.sort_field();
        let checksum = note.checksum();

        let existing = NoteRepo::find_duplicate(&self.pool, &note.notetype, checksum, &sort_field)
            .await
            .map_err(map_sqlx_error)?;
        if let Some(existing) = existing {
            tracing::debug!(note_id = existing.id, notetype = %note.notetype, "Skipping duplicate note");
            return Ok(AddOutcome::Duplicate);
        }

        // Tags are stored space-separated, so each one must be a single token.
        let tags = note
            .tags
            .iter()
            .map(|t| sanitize_tag(t))
            .filter(|t| !t.is_empty())
            .collect();

        let input = CreateNote {
            notetype: note.notetype.clone(),
            deck_id: note.deck_id,
            fields: note.fields.clone(),
            tags,
            sort_field,
            checksum,
        };
        let created = NoteRepo::create(&self.pool, &input)
            .await
            .map_err(map_sqlx_error)?;
        tracing::debug!(note_id = created.id, deck_id = created.deck_id, "Note added");
        Ok(AddOutcome::Added)
    }
}

/// Split sqlx failures into "collection unreachable" and "this note refused".
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Rejected(other.to_string()),
    }
}
