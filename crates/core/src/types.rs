/// Collection primary keys are SQLite INTEGER rowids.
pub type DbId = i64;

/// Identifier of the deck (target container) cards are imported into.
pub type DeckId = DbId;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
