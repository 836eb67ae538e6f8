//! SHA-256 hashing of text and paths
//!
//! File identity in this crate is keyed by path, not content: the same bytes
//! at two paths get two ids, and moving a file gives it a new id. Do not use
//! [`path_id`] for deduplication.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Hash trimmed text to an uppercase hex SHA-256 digest.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    format!("{:X}", hasher.finalize())
}

/// Stable identifier for a file path.
pub fn path_id(path: &Path) -> String {
    hash_text(&path.to_string_lossy())
}
