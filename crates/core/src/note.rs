//! Mapping reviewed cards onto the collection's native note shape.

use serde::Serialize;

use crate::card::Card;
use crate::hashing::{field_checksum, normalize_field};
use crate::types::DeckId;

/// Tag applied to every imported note.
pub const AI_GENERATED_TAG: &str = "ai-generated";

/// Prefix of the provenance tag derived from the source name.
pub const SOURCE_TAG_PREFIX: &str = "source::";

/// A note ready to be added to the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeNote {
    /// Notetype name (see [`crate::card::CardType::notetype_name`]).
    pub notetype: String,
    pub deck_id: DeckId,
    /// Field values in notetype order: `[Front, Back]` or `[Text, Extra]`.
    pub fields: Vec<String>,
    pub tags: Vec<String>,
}

impl NativeNote {
    pub fn first_field(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }

    /// Normalized first field, the value duplicates are compared on.
    pub fn sort_field(&self) -> String {
        normalize_field(self.first_field())
    }

    pub fn checksum(&self) -> i64 {
        field_checksum(self.first_field())
    }
}

/// Build the provenance tag for a source, or `None` for a blank name.
pub fn source_tag(source_name: &str) -> Option<String> {
    let trimmed = source_name.trim();
    if trimmed.is_empty() {
        return None;
    }
    let safe: String = trimmed
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    Some(format!("{SOURCE_TAG_PREFIX}{safe}"))
}

/// Append `tags` to `into`, skipping blanks and anything already present.
pub fn merge_tags<'a>(into: &mut Vec<String>, tags: impl IntoIterator<Item = &'a String>) {
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !into.iter().any(|t| t == tag) {
            into.push(tag.to_string());
        }
    }
}

/// Convert a card into a note for `deck_id`.
///
/// Tag order: `default_tags`, the card's suggested tags, then `extra_tags`.
pub fn to_native_note(
    card: &Card,
    deck_id: DeckId,
    default_tags: &[String],
    extra_tags: &[String],
) -> NativeNote {
    let mut tags = Vec::new();
    merge_tags(&mut tags, default_tags);
    merge_tags(&mut tags, &card.suggested_tags);
    merge_tags(&mut tags, extra_tags);

    // Both layouts are two-field: Front/Back, or Text (with deletions)/Extra.
    let fields = vec![card.front.clone(), card.back.clone()];

    NativeNote {
        notetype: card.card_type.notetype_name().to_string(),
        deck_id,
        fields,
        tags,
    }
}
