//! Generated flashcard candidates and their review status.
//!
//! Both enums are closed: the wire and snapshot strings map onto them
//! exhaustively, and an unrecognised string is an error rather than a
//! silent default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Card type
// ---------------------------------------------------------------------------

pub const CARD_TYPE_BASIC: &str = "basic";
pub const CARD_TYPE_BASIC_REVERSED: &str = "basic_reversed";
pub const CARD_TYPE_CLOZE: &str = "cloze";

/// Layout of a generated card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Basic,
    BasicReversed,
    Cloze,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => CARD_TYPE_BASIC,
            Self::BasicReversed => CARD_TYPE_BASIC_REVERSED,
            Self::Cloze => CARD_TYPE_CLOZE,
        }
    }

    /// Name of the collection notetype this card type is imported as.
    pub fn notetype_name(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::BasicReversed => "Basic (and reversed card)",
            Self::Cloze => "Cloze",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = CoreError;

    /// Case-insensitive parse of the wire representation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            CARD_TYPE_BASIC => Ok(Self::Basic),
            CARD_TYPE_BASIC_REVERSED => Ok(Self::BasicReversed),
            CARD_TYPE_CLOZE => Ok(Self::Cloze),
            _ => Err(CoreError::UnknownVariant {
                kind: "card type",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Card status
// ---------------------------------------------------------------------------

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

/// Review decision for a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Approved => STATUS_APPROVED,
            Self::Rejected => STATUS_REJECTED,
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_APPROVED => Ok(Self::Approved),
            STATUS_REJECTED => Ok(Self::Rejected),
            _ => Err(CoreError::UnknownVariant {
                kind: "card status",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// One generated flashcard candidate.
///
/// The `id` is fixed at construction and only readable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    id: String,
    pub card_type: CardType,
    /// Question side, or the full cloze text for cloze cards.
    pub front: String,
    /// Answer side; unused (usually empty) for cloze cards.
    #[serde(default)]
    pub back: String,
    #[serde(default)]
    pub suggested_tags: Vec<String>,
    #[serde(default)]
    pub status: CardStatus,
}

impl Card {
    /// Create a pending card with a fresh UUID v4 identifier.
    pub fn new(card_type: CardType, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), card_type, front, back)
    }

    /// Create a pending card with a caller-supplied identifier.
    pub fn with_id(
        id: impl Into<String>,
        card_type: CardType,
        front: impl Into<String>,
        back: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            card_type,
            front: front.into(),
            back: back.into(),
            suggested_tags: Vec::new(),
            status: CardStatus::Pending,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.suggested_tags = tags;
        self
    }

    pub fn with_status(mut self, status: CardStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_approved(&self) -> bool {
        self.status == CardStatus::Approved
    }
}

// ---------------------------------------------------------------------------
// Derived counts
// ---------------------------------------------------------------------------

/// Per-status tallies, recomputed from the card list on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn from_cards(cards: &[Card]) -> Self {
        cards.iter().fold(Self::default(), |mut counts, card| {
            match card.status {
                CardStatus::Pending => counts.pending += 1,
                CardStatus::Approved => counts.approved += 1,
                CardStatus::Rejected => counts.rejected += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}
