//! Single-process proof-of-work ledger core: value-transfer records grouped
//! into transactions, transactions batched into blocks, blocks linked into a
//! locally-held chain, and a brute-force nonce search to solve each block
//! under a leading-zeros difficulty target.

pub mod constants;
pub mod error;
pub mod hash;
pub mod mine;
pub mod node;
pub mod record;
pub mod store;

pub use crate::constants::{GENESIS_PREV_HASH, MINING_REWARD};
pub use crate::error::{MineError, SerializationError, ValidationError};
pub use crate::hash::{canonical_hash, meets_difficulty};
pub use crate::mine::SearchLimit;
pub use crate::node::Node;
pub use crate::record::{BlockRecord, BodyRecord, HeaderRecord};
pub use crate::store::ChainStore;

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::record::{BlockView, BodyView, HeaderView};

/// A quantity of value attributable to an owner. Structural equality,
/// immutable once created. Magnitude sign and range are the caller's
/// responsibility. Wire names are `uuid`/`amount`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Amount {
    #[serde(rename = "uuid")]
    pub owner: String,
    #[serde(rename = "amount")]
    pub magnitude: u64,
}

impl Amount {
    pub fn new(owner: impl Into<String>, magnitude: u64) -> Self {
        Self {
            owner: owner.into(),
            magnitude,
        }
    }
}

/// Consumed and produced amounts plus a creation timestamp. The timestamp is
/// part of the transaction's identity, not just metadata. No check that
/// inputs cover outputs is performed at this layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    pub inputs: Vec<Amount>,
    pub outputs: Vec<Amount>,
    pub timestamp: u64,
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.inputs == other.inputs
            && self.outputs == other.outputs
    }
}

impl Eq for Transaction {}

impl Transaction {
    /// Builds a transaction, capturing the current UNIX time when no
    /// timestamp is supplied.
    pub fn new(inputs: Vec<Amount>, outputs: Vec<Amount>, timestamp: Option<u64>) -> Self {
        Self {
            inputs,
            outputs,
            timestamp: timestamp.unwrap_or_else(unix_now),
        }
    }

    /// The reward transaction mining prepends to every block: no inputs, one
    /// output crediting `owner` with [`MINING_REWARD`].
    pub fn coinbase(owner: impl Into<String>, timestamp: Option<u64>) -> Self {
        Self::new(vec![], vec![Amount::new(owner, MINING_REWARD)], timestamp)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}

/// A candidate block before the nonce search has solved it.
///
/// The body (transaction list) is hashed on its own, decoupled from the
/// header fields that vary during the search; the full digest covers
/// `{header: {prev_hash, body_hash, difficulty, nonce}, body: {txns}}`.
#[derive(Clone, Debug)]
pub struct UnsolvedBlock {
    pub txns: Vec<Transaction>,
    pub prev_hash: String,
    pub difficulty: u32,
}

impl PartialEq for UnsolvedBlock {
    fn eq(&self, other: &Self) -> bool {
        self.prev_hash == other.prev_hash && self.txns == other.txns
    }
}

impl Eq for UnsolvedBlock {}

impl UnsolvedBlock {
    pub fn new(txns: Vec<Transaction>, prev_hash: impl Into<String>, difficulty: u32) -> Self {
        Self {
            txns,
            prev_hash: prev_hash.into(),
            difficulty,
        }
    }

    /// Canonical hash of the body alone.
    pub fn body_hash(&self) -> Result<String, SerializationError> {
        canonical_hash(&BodyView { txns: &self.txns })
    }

    /// Digest of the block for a candidate nonce. Pure: recomputes the body
    /// hash and full hash on every call without touching the block.
    pub fn digest(&self, nonce: u64) -> Result<String, SerializationError> {
        digest_parts(&self.txns, &self.prev_hash, self.difficulty, nonce)
    }

    /// Consumes the candidate, fixing `nonce` for good. There is no way back
    /// to the unsolved state.
    pub fn seal(self, nonce: u64) -> SolvedBlock {
        SolvedBlock {
            txns: self.txns,
            prev_hash: self.prev_hash,
            difficulty: self.difficulty,
            nonce,
        }
    }
}

fn digest_parts(
    txns: &[Transaction],
    prev_hash: &str,
    difficulty: u32,
    nonce: u64,
) -> Result<String, SerializationError> {
    let body = BodyView { txns };
    let body_hash = canonical_hash(&body)?;
    canonical_hash(&BlockView {
        header: HeaderView {
            prev_hash,
            body_hash: &body_hash,
            difficulty,
            nonce: Some(nonce),
        },
        body,
    })
}

/// A block whose nonce search has finished. Immutable; appended to a node's
/// chain as-is.
#[derive(Clone, Debug)]
pub struct SolvedBlock {
    txns: Vec<Transaction>,
    prev_hash: String,
    difficulty: u32,
    nonce: u64,
}

impl PartialEq for SolvedBlock {
    fn eq(&self, other: &Self) -> bool {
        self.prev_hash == other.prev_hash && self.txns == other.txns
    }
}

impl Eq for SolvedBlock {}

impl SolvedBlock {
    pub fn txns(&self) -> &[Transaction] {
        &self.txns
    }

    pub fn prev_hash(&self) -> &str {
        &self.prev_hash
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Digest recomputed fresh from the stored nonce.
    pub fn digest(&self) -> Result<String, SerializationError> {
        digest_parts(&self.txns, &self.prev_hash, self.difficulty, self.nonce)
    }

    /// True iff `claimed` equals the freshly recomputed digest. This confirms
    /// the proof for the stored nonce and claimed hash only; whether the
    /// digest carries enough leading zeros ([`check_difficulty`]) and whether
    /// `prev_hash` links where the caller expects are separate checks.
    ///
    /// [`check_difficulty`]: SolvedBlock::check_difficulty
    pub fn validate(&self, claimed: &str) -> bool {
        self.digest().map(|d| d == claimed).unwrap_or(false)
    }

    /// [`validate`](SolvedBlock::validate) as a rejection the caller can't
    /// ignore.
    pub fn check_proof(&self, claimed: &str) -> Result<(), ValidationError> {
        if self.validate(claimed) {
            Ok(())
        } else {
            Err(ValidationError::WrongProof {
                nonce: self.nonce,
                claimed: claimed.to_owned(),
            })
        }
    }

    /// Rejects the block unless its digest starts with `difficulty` leading
    /// zero hex chars.
    pub fn check_difficulty(&self) -> Result<(), ValidationError> {
        let digest = self.digest()?;
        if meets_difficulty(&digest, self.difficulty) {
            Ok(())
        } else {
            Err(ValidationError::DifficultyNotMet {
                digest,
                difficulty: self.difficulty,
            })
        }
    }

    /// The block as its interchange record, body hash freshly computed.
    pub fn to_record(&self) -> Result<BlockRecord, SerializationError> {
        let body = BodyRecord {
            txns: self.txns.clone(),
        };
        let body_hash = canonical_hash(&body)?;
        Ok(BlockRecord {
            header: HeaderRecord {
                prev_hash: self.prev_hash.clone(),
                body_hash,
                difficulty: self.difficulty,
                nonce: Some(self.nonce),
            },
            body,
        })
    }

    /// Reconstructs a solved block from its interchange record. A record
    /// without a nonce describes an unsolved block and is refused here.
    pub fn from_record(record: BlockRecord) -> Result<Self, SerializationError> {
        let nonce = record
            .header
            .nonce
            .ok_or(SerializationError::MissingField {
                record: "block.header",
                field: "nonce",
            })?;
        Ok(Self {
            txns: record.body.txns,
            prev_hash: record.header.prev_hash,
            difficulty: record.header.difficulty,
            nonce,
        })
    }
}
