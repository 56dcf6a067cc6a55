use tracing::debug;

use crate::{
    constants::GENESIS_PREV_HASH,
    mine::{search, SearchLimit},
    MineError, SolvedBlock, Transaction, UnsolvedBlock,
};

/// A single miner holding a local, append-only chain. Fully synchronous; no
/// block is ever removed or replaced once appended.
///
/// Linkage note: for compatibility with the reference behavior, a new block
/// takes the chain tail's own `prev_hash` field rather than the tail's
/// digest, with the empty-string sentinel for an empty chain. The backward
/// pointers therefore do not chain block digests together.
#[derive(Clone, Debug)]
pub struct Node {
    identity: String,
    chain: Vec<SolvedBlock>,
}

impl Node {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            chain: Vec::new(),
        }
    }

    /// Rebuilds a node around a previously persisted chain.
    pub fn with_chain(identity: impl Into<String>, chain: Vec<SolvedBlock>) -> Self {
        Self {
            identity: identity.into(),
            chain,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn chain(&self) -> &[SolvedBlock] {
        &self.chain
    }

    /// Mines `txns` into the next block with an unbounded nonce search.
    ///
    /// A coinbase transaction crediting this node is prepended at index 0
    /// (stamped with `timestamp` when given), the block is linked to the
    /// chain tail, solved, appended, and returned with its digest.
    pub fn process_txns(
        &mut self,
        txns: Vec<Transaction>,
        difficulty: u32,
        timestamp: Option<u64>,
    ) -> Result<(SolvedBlock, String), MineError> {
        self.process_txns_limited(txns, difficulty, timestamp, &SearchLimit::NONE)
    }

    /// [`process_txns`](Node::process_txns) with a caller-imposed search
    /// bound. Nothing is appended when the search runs out.
    pub fn process_txns_limited(
        &mut self,
        mut txns: Vec<Transaction>,
        difficulty: u32,
        timestamp: Option<u64>,
        limit: &SearchLimit,
    ) -> Result<(SolvedBlock, String), MineError> {
        txns.insert(0, Transaction::coinbase(self.identity.clone(), timestamp));

        let prev_hash = match self.chain.last() {
            Some(tail) => tail.prev_hash().to_owned(),
            None => GENESIS_PREV_HASH.to_owned(),
        };
        debug!(
            identity = %self.identity,
            height = self.chain.len(),
            difficulty,
            txns = txns.len(),
            "assembling candidate block"
        );

        let candidate = UnsolvedBlock::new(txns, prev_hash, difficulty);
        let (block, digest) = search(candidate, limit)?;
        self.chain.push(block.clone());
        Ok((block, digest))
    }
}
