//! Content hashing for duplicate detection.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of a byte buffer.
///
/// The digest identifies a document's content independently of its name,
/// so byte-identical uploads hash to the same value.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
