//! Wire types exchanged with the generation worker.
//!
//! Requests go out as `{"requestId": ..., "action": "generate", ...}`. The
//! worker answers synchronously with an acknowledgement and later posts a
//! completion envelope carrying either `cards` or `error`.

use std::collections::HashSet;

use cardsmith_core::card::{Card, CardType};
use cardsmith_core::error::CoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::outcome::{FailureReason, GenerationOutcome};

/// Default maximum number of cards requested per generation.
pub const DEFAULT_CARD_LIMIT: u32 = 20;

/// Message used when a completion yields no usable cards.
pub const NO_CARDS_MESSAGE: &str = "No cards were generated";

/// Errors from decoding bridge messages.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Malformed bridge message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unexpected acknowledgement: {0}")]
    UnexpectedAck(String),

    #[error("Completion carries neither cards nor an error")]
    EmptyCompletion,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Hints forwarded to the generator; it may use or ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConstraints {
    #[serde(default = "default_card_limit")]
    pub card_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_card_type: Option<CardType>,
}

fn default_card_limit() -> u32 {
    DEFAULT_CARD_LIMIT
}

impl Default for GenerationConstraints {
    fn default() -> Self {
        Self {
            card_limit: DEFAULT_CARD_LIMIT,
            preferred_card_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub text: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub constraints: GenerationConstraints,
}

/// Operations the worker understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BridgeAction {
    Generate(GenerateRequest),
}

/// An action tagged with the id its completion will carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub action: BridgeAction,
}

// ---------------------------------------------------------------------------
// Acknowledgement
// ---------------------------------------------------------------------------

/// Synchronous answer to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    /// Work has started; the result arrives as a completion.
    Started,
    /// The request was refused and no completion will follow.
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct RawAck {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse a worker acknowledgement: `{"status":"generating"}` or `{"error":"..."}`.
pub fn parse_ack(body: &[u8]) -> Result<Ack, MessageError> {
    let raw: RawAck = serde_json::from_slice(body)?;
    match (raw.error, raw.status.as_deref()) {
        (Some(error), _) => Ok(Ack::Rejected(error)),
        (None, Some("generating")) => Ok(Ack::Started),
        _ => Err(MessageError::UnexpectedAck(
            String::from_utf8_lossy(body).into_owned(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// A generated card as the worker reports it.
///
/// `type` stays a string here so one unknown value drops a single card
/// instead of failing the whole envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", alias = "cardType")]
    pub card_type: String,
    pub front: String,
    #[serde(default)]
    pub back: String,
    #[serde(default, alias = "suggested_tags", alias = "tags")]
    pub suggested_tags: Vec<String>,
}

impl WireCard {
    pub fn new(card_type: CardType, front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: None,
            card_type: card_type.as_str().to_string(),
            front: front.into(),
            back: back.into(),
            suggested_tags: Vec::new(),
        }
    }

    pub fn with_suggested_tags(mut self, tags: Vec<String>) -> Self {
        self.suggested_tags = tags;
        self
    }

    /// Convert to a pending [`Card`], assigning a fresh id when none was sent.
    pub fn into_card(self) -> Result<Card, CoreError> {
        let card_type: CardType = self.card_type.parse()?;
        let card = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Card::with_id(id, card_type, self.front, self.back),
            None => Card::new(card_type, self.front, self.back),
        };
        Ok(card.with_tags(self.suggested_tags))
    }
}

impl From<&Card> for WireCard {
    fn from(card: &Card) -> Self {
        Self {
            id: Some(card.id().to_string()),
            card_type: card.card_type.as_str().to_string(),
            front: card.front.clone(),
            back: card.back.clone(),
            suggested_tags: card.suggested_tags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Cards(Vec<WireCard>),
    Error(String),
}

/// Out-of-band result for the request named by `request_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCompletion", into = "RawCompletion")]
pub struct CompletionEnvelope {
    pub request_id: Uuid,
    pub result: CompletionResult,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompletion {
    request_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cards: Option<Vec<WireCard>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<RawCompletion> for CompletionEnvelope {
    type Error = MessageError;

    fn try_from(raw: RawCompletion) -> Result<Self, Self::Error> {
        let result = match (raw.error, raw.cards) {
            (Some(error), _) => CompletionResult::Error(error),
            (None, Some(cards)) => CompletionResult::Cards(cards),
            (None, None) => return Err(MessageError::EmptyCompletion),
        };
        Ok(Self {
            request_id: raw.request_id,
            result,
        })
    }
}

impl From<CompletionEnvelope> for RawCompletion {
    fn from(envelope: CompletionEnvelope) -> Self {
        let (cards, error) = match envelope.result {
            CompletionResult::Cards(cards) => (Some(cards), None),
            CompletionResult::Error(error) => (None, Some(error)),
        };
        Self {
            request_id: envelope.request_id,
            cards,
            error,
        }
    }
}

impl CompletionEnvelope {
    pub fn cards(request_id: Uuid, cards: Vec<WireCard>) -> Self {
        Self {
            request_id,
            result: CompletionResult::Cards(cards),
        }
    }

    pub fn error(request_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            request_id,
            result: CompletionResult::Error(message.into()),
        }
    }

    /// Interpret the envelope. Cards of an unknown type are logged and
    /// dropped; an envelope left with no cards is a provider failure.
    pub fn into_outcome(self) -> GenerationOutcome {
        let wire_cards = match self.result {
            CompletionResult::Error(message) => {
                return GenerationOutcome::Failure(FailureReason::Provider(message));
            }
            CompletionResult::Cards(cards) => cards,
        };

        // Card ids must be unique within a session; repeats get a fresh id.
        let mut seen: HashSet<String> = HashSet::new();
        let cards: Vec<Card> = wire_cards
            .into_iter()
            .filter_map(|mut wire| {
                if wire.id.as_ref().is_some_and(|id| seen.contains(id.as_str())) {
                    tracing::debug!(request_id = %self.request_id, id = ?wire.id, "Replacing repeated card id");
                    wire.id = None;
                }
                match wire.into_card() {
                    Ok(card) => {
                        seen.insert(card.id().to_string());
                        Some(card)
                    }
                    Err(e) => {
                        tracing::warn!(request_id = %self.request_id, error = %e, "Dropping generated card");
                        None
                    }
                }
            })
            .collect();

        if cards.is_empty() {
            GenerationOutcome::Failure(FailureReason::Provider(NO_CARDS_MESSAGE.to_string()))
        } else {
            GenerationOutcome::Success(cards)
        }
    }
}
