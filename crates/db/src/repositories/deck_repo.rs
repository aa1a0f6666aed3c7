//! Repository for the `decks` table.

use cardsmith_core::types::DeckId;
use chrono::Utc;

use crate::models::deck::Deck;
use crate::DbPool;

/// Column list for `decks` queries.
const COLUMNS: &str = "id, name, created_at";

/// Provides lookups and creation for decks.
pub struct DeckRepo;

impl DeckRepo {
    /// Create a deck, returning the inserted row.
    pub async fn create(pool: &DbPool, name: &str) -> Result<Deck, sqlx::Error> {
        let query = format!(
            "INSERT INTO decks (name, created_at) VALUES (?, ?) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(name.trim())
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &DbPool, id: DeckId) -> Result<Option<Deck>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decks WHERE id = ?");
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &DbPool, name: &str) -> Result<Option<Deck>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decks WHERE name = ?");
        sqlx::query_as::<_, Deck>(&query)
            .bind(name.trim())
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &DbPool) -> Result<Vec<Deck>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decks ORDER BY name");
        sqlx::query_as::<_, Deck>(&query).fetch_all(pool).await
    }
}
