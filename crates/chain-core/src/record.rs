//! Interchange records: the dict-shaped schema blocks persist and travel as.
//!
//! Parsing is strict. A record with an unknown field, a missing field, or a
//! type mismatch is rejected rather than silently defaulted.

use serde::{Deserialize, Serialize};

use crate::Transaction;

/// `{header: {...}, body: {txns: [...]}}` — the full on-wire block shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockRecord {
    pub header: HeaderRecord,
    pub body: BodyRecord,
}

/// Header fields that vary during the nonce search, plus the body hash that
/// does not. `nonce: None` encodes an unsolved block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderRecord {
    pub prev_hash: String,
    pub body_hash: String,
    pub difficulty: u32,
    pub nonce: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyRecord {
    pub txns: Vec<Transaction>,
}

// Borrowing mirrors of the records above, used when hashing so the digest of
// every candidate nonce does not clone the transaction list.

#[derive(Clone, Copy, Serialize)]
pub(crate) struct BlockView<'a> {
    pub header: HeaderView<'a>,
    pub body: BodyView<'a>,
}

#[derive(Clone, Copy, Serialize)]
pub(crate) struct HeaderView<'a> {
    pub prev_hash: &'a str,
    pub body_hash: &'a str,
    pub difficulty: u32,
    pub nonce: Option<u64>,
}

#[derive(Clone, Copy, Serialize)]
pub(crate) struct BodyView<'a> {
    pub txns: &'a [Transaction],
}
