use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::error::SerializationError;

/// Hashes a structured record into a 64-char lowercase hex digest.
///
/// The record is re-encoded through `serde_json::Value` first: the default
/// `Value` map is BTreeMap-backed, so object keys serialize in sorted order
/// and two records with the same logical content hash identically no matter
/// how their fields were declared or inserted. The pre-hash encoding is
/// observable only through the `trace` level.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let canonical = serde_json::to_value(value)?;
    let encoded = serde_json::to_string(&canonical)?;
    trace!(encoding = %encoded, "canonical pre-hash encoding");

    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// True iff `digest` begins with `difficulty` consecutive `'0'` hex chars.
pub fn meets_difficulty(digest: &str, difficulty: u32) -> bool {
    let want = difficulty as usize;
    digest.len() >= want && digest.as_bytes()[..want].iter().all(|b| *b == b'0')
}
