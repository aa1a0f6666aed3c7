//! Validation of generated cards before they are committed.

use std::sync::LazyLock;

use regex::Regex;

use crate::card::{Card, CardType};
use crate::error::CoreError;

/// Maximum length for card fields (in characters).
pub const MAX_FIELD_LENGTH: usize = 100_000;

static CLOZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{c\d+::.*?\}\}").expect("valid regex"));

/// Check a card's content and return a copy with sanitized tags.
///
/// Rules:
/// - the front must not be blank
/// - the back must not be blank unless the card is a cloze
/// - neither field may exceed [`MAX_FIELD_LENGTH`] characters
/// - cloze cards need at least one `{{cN::...}}` deletion
///
/// Both fields are then passed through [`sanitize_html`]; a front that is
/// left blank by sanitization is rejected.
pub fn validate_card(card: &Card) -> Result<Card, CoreError> {
    if card.front.trim().is_empty() {
        return Err(CoreError::Validation("Front field is empty".to_string()));
    }

    if card.card_type != CardType::Cloze && card.back.trim().is_empty() {
        return Err(CoreError::Validation(
            "Back field is empty for non-cloze card".to_string(),
        ));
    }

    for (name, value) in [("Front", &card.front), ("Back", &card.back)] {
        let len = value.chars().count();
        if len > MAX_FIELD_LENGTH {
            return Err(CoreError::Validation(format!(
                "{name} field exceeds maximum length ({len} > {MAX_FIELD_LENGTH})"
            )));
        }
    }

    if card.card_type == CardType::Cloze && !CLOZE_RE.is_match(&card.front) {
        return Err(CoreError::Validation(
            "Cloze card is missing a valid cloze deletion ({{c1::...}})".to_string(),
        ));
    }

    let mut sanitized = card.clone();
    sanitized.front = sanitize_html(&card.front);
    sanitized.back = sanitize_html(&card.back);
    if sanitized.front.trim().is_empty() {
        return Err(CoreError::Validation(
            "Front field is empty after HTML sanitization".to_string(),
        ));
    }

    sanitized.suggested_tags = card
        .suggested_tags
        .iter()
        .map(|t| sanitize_tag(t))
        .filter(|t| !t.is_empty())
        .collect();
    Ok(sanitized)
}

/// Strip scripts, event handlers and other unsafe markup from a field,
/// keeping formatting tags such as `<b>` and `<br>`.
pub fn sanitize_html(html: &str) -> String {
    ammonia::clean(html)
}

/// Make a tag safe for the collection: trimmed, spaces to underscores, and
/// only alphanumerics plus `_`, `-` and `:` kept.
pub fn sanitize_tag(tag: &str) -> String {
    tag.trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ':'))
        .collect()
}
