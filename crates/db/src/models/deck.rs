//! Deck rows (import target containers).

use cardsmith_core::types::{DeckId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `decks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub created_at: Timestamp,
}
