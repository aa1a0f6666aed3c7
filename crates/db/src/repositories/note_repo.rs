//! Repository for the `notes` table.

use cardsmith_core::types::DeckId;
use chrono::Utc;

use crate::models::note::{CreateNote, Note};
use crate::DbPool;

/// Column list for `notes` queries.
const COLUMNS: &str = "\
    id, guid, notetype, deck_id, fields, tags, sort_field, checksum, created_at";

/// Provides inserts and duplicate lookups for notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a note with a fresh GUID.
    pub async fn create(pool: &DbPool, input: &CreateNote) -> Result<Note, sqlx::Error> {
        let fields = serde_json::to_string(&input.fields)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let guid = uuid::Uuid::new_v4().simple().to_string();

        let query = format!(
            "INSERT INTO notes \
                (guid, notetype, deck_id, fields, tags, sort_field, checksum, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(guid)
            .bind(&input.notetype)
            .bind(input.deck_id)
            .bind(fields)
            .bind(input.tags.join(" "))
            .bind(&input.sort_field)
            .bind(input.checksum)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find an existing note with the same notetype and normalized first field.
    ///
    /// The checksum narrows the search through the index; the sort field
    /// comparison rules out checksum collisions.
    pub async fn find_duplicate(
        pool: &DbPool,
        notetype: &str,
        checksum: i64,
        sort_field: &str,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notes \
             WHERE notetype = ? AND checksum = ? AND sort_field = ? \
             LIMIT 1"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(notetype)
            .bind(checksum)
            .bind(sort_field)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_deck(pool: &DbPool, deck_id: DeckId) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE deck_id = ? ORDER BY id");
        sqlx::query_as::<_, Note>(&query)
            .bind(deck_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notes")
            .fetch_one(pool)
            .await
    }
}
