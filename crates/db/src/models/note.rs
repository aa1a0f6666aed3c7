//! Note rows and the insert DTO.

use cardsmith_core::types::{DbId, DeckId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub guid: String,
    pub notetype: String,
    pub deck_id: DeckId,
    /// JSON array of field values.
    pub fields: String,
    /// Space-separated tags.
    pub tags: String,
    pub sort_field: String,
    pub checksum: i64,
    pub created_at: Timestamp,
}

impl Note {
    /// Decode the stored field array. A malformed column yields no fields.
    pub fn field_values(&self) -> Vec<String> {
        serde_json::from_str(&self.fields).unwrap_or_default()
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags.split_whitespace().map(str::to_string).collect()
    }
}

/// DTO for inserting a note.
#[derive(Debug, Clone)]
pub struct CreateNote {
    pub notetype: String,
    pub deck_id: DeckId,
    pub fields: Vec<String>,
    pub tags: Vec<String>,
    pub sort_field: String,
    pub checksum: i64,
}
