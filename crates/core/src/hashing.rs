//! Content hashing used by the collection's duplicate policy.
//!
//! A note's first field is normalized (markup stripped, whitespace
//! collapsed) before hashing so cosmetic differences do not defeat
//! duplicate detection.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Strip HTML tags, decode non-breaking spaces, and collapse whitespace.
pub fn normalize_field(text: &str) -> String {
    let stripped = HTML_TAG_RE.replace_all(text, " ");
    let decoded = stripped.replace("&nbsp;", " ");
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Checksum of a normalized field: the first 32 bits of its SHA-256.
pub fn field_checksum(text: &str) -> i64 {
    let digest = sha256_hex(normalize_field(text).as_bytes());
    // The digest is always 64 lowercase hex characters.
    i64::from_str_radix(&digest[..8], 16).unwrap_or_default()
}
