//! The review session: provenance plus the ordered card list.

use chrono::{TimeDelta, Utc};
use serde::Serialize;

use crate::card::{Card, CardStatus, StatusCounts};
use crate::types::Timestamp;

/// Snapshot format version written by this build.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Days an un-imported session is kept before it is treated as expired.
pub const SESSION_RETENTION_DAYS: i64 = 7;

/// Retention window as a duration.
pub fn retention_window() -> TimeDelta {
    TimeDelta::days(SESSION_RETENTION_DAYS)
}

/// The persisted unit of work.
///
/// `cards` keeps generation order. `created_at` is set once, when the
/// generation that produced the cards completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub source_name: String,
    pub source_text: String,
    pub cards: Vec<Card>,
    pub created_at: Timestamp,
    pub format_version: u32,
}

impl Session {
    /// Create a session stamped with the current time.
    pub fn new(source_name: impl Into<String>, source_text: impl Into<String>, cards: Vec<Card>) -> Self {
        Self::created_at(source_name, source_text, cards, Utc::now())
    }

    pub fn created_at(
        source_name: impl Into<String>,
        source_text: impl Into<String>,
        cards: Vec<Card>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            source_text: source_text.into(),
            cards,
            created_at,
            format_version: SESSION_FORMAT_VERSION,
        }
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts::from_cards(&self.cards)
    }

    /// Clones of every card currently approved, in session order.
    pub fn approved_cards(&self) -> Vec<Card> {
        self.cards.iter().filter(|c| c.is_approved()).cloned().collect()
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == card_id)
    }

    /// Set one card's status. Returns `false` if no card has that id.
    pub fn set_status(&mut self, card_id: &str, status: CardStatus) -> bool {
        match self.cards.iter_mut().find(|c| c.id() == card_id) {
            Some(card) => {
                card.status = status;
                true
            }
            None => false,
        }
    }

    /// Set every card's status regardless of its previous value.
    pub fn set_all_statuses(&mut self, status: CardStatus) {
        for card in &mut self.cards {
            card.status = status;
        }
    }

    /// Whether the session is older than the retention window at `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now - self.created_at > retention_window()
    }
}
