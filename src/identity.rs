//! Stable content fingerprints for articles.
//!
//! The fingerprint is the only deduplication mechanism: the same logical item
//! fetched on different days must always map to the same id.

use sha2::{Digest, Sha256};

/// Separator placed between the normalized fields before hashing.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Derive the article id for `(title, source, url)`.
///
/// Each field is trimmed and lower-cased, the three are joined with an ASCII
/// unit separator and the result is hashed with SHA-256. The id is the
/// 64-character lower-case hex digest.
pub fn make_id(title: &str, source: &str, url: &str) -> String {
    let key = [title, source, url]
        .iter()
        .map(|field| field.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(&FIELD_SEPARATOR.to_string());

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}
