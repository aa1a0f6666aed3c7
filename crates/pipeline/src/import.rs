//! Commits approved cards into the note collection.

use std::sync::Arc;

use cardsmith_core::import::{ImportRequest, ImportResult};
use cardsmith_core::note::{to_native_note, AI_GENERATED_TAG};
use cardsmith_core::store::{AddOutcome, NoteStore, StoreError};
use cardsmith_core::types::DeckId;
use cardsmith_core::validate::validate_card;

/// Failures that abort a whole import batch.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Target deck {0} does not exist")]
    InvalidTarget(DeckId),

    #[error("Collection unavailable: {0}")]
    StoreUnavailable(String),
}

pub struct ImportCoordinator {
    store: Arc<dyn NoteStore>,
    default_tags: Vec<String>,
}

impl ImportCoordinator {
    /// Coordinator tagging every note with [`AI_GENERATED_TAG`].
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            store,
            default_tags: vec![AI_GENERATED_TAG.to_string()],
        }
    }

    pub fn with_default_tags(mut self, tags: Vec<String>) -> Self {
        self.default_tags = tags;
        self
    }

    /// Import the approved cards of `request`; other statuses are skipped.
    ///
    /// A card that fails validation or is refused by the store is reported
    /// in `errors` and the batch continues. An unknown deck or an
    /// unreachable store fails the batch.
    pub async fn import_approved(&self, request: &ImportRequest) -> Result<ImportResult, ImportError> {
        let deck_id = request.target_deck_id;
        match self.store.deck_exists(deck_id).await {
            Ok(true) => {}
            Ok(false) => return Err(ImportError::InvalidTarget(deck_id)),
            Err(e) => return Err(ImportError::StoreUnavailable(e.to_string())),
        }

        let mut result = ImportResult::default();
        for card in request.cards.iter().filter(|c| c.is_approved()) {
            let card = match validate_card(card) {
                Ok(card) => card,
                Err(e) => {
                    result.errors.push(format!("Failed to import card '{}': {e}", card.id()));
                    continue;
                }
            };

            let note = to_native_note(&card, deck_id, &self.default_tags, &request.additional_tags);
            match self.store.add_note(&note).await {
                Ok(AddOutcome::Added) => result.imported_count += 1,
                Ok(AddOutcome::Duplicate) => result.duplicate_count += 1,
                Err(StoreError::Unavailable(msg)) => return Err(ImportError::StoreUnavailable(msg)),
                Err(e) => result.errors.push(format!("Failed to import card '{}': {e}", card.id())),
            }
        }

        tracing::info!(
            deck_id,
            imported = result.imported_count,
            duplicates = result.duplicate_count,
            errors = result.errors.len(),
            "Import finished",
        );
        Ok(result)
    }
}
