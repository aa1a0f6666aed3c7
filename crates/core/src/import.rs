//! Import request and result shapes shared by the coordinator and the API.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::types::DeckId;

/// Cards to commit plus their destination.
///
/// Only cards whose status is approved are imported; the rest are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub cards: Vec<Card>,
    #[serde(alias = "targetContainerId")]
    pub target_deck_id: DeckId,
    #[serde(default)]
    pub additional_tags: Vec<String>,
}

/// Outcome of one import attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported_count: u32,
    pub duplicate_count: u32,
    pub errors: Vec<String>,
}

impl ImportResult {
    /// One-line summary suitable for showing to the user.
    pub fn summary(&self) -> String {
        let mut summary = format!("Imported {} card(s)", self.imported_count);
        if self.duplicate_count > 0 {
            summary.push_str(&format!(", {} duplicate(s) skipped", self.duplicate_count));
        }
        if !self.errors.is_empty() {
            summary.push_str(&format!(", {} failed", self.errors.len()));
        }
        summary
    }
}
