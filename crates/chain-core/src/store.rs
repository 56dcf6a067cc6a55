use anyhow::Result;

use crate::SolvedBlock;

/// Trait persistence backends implement for chains to round-trip through.
/// Lives in `chain-core` to avoid a circular dependency on the storage crate.
///
/// Contract: `load_blocks` after `store_blocks(chain)` reproduces an equal
/// ordered sequence under block equality (`prev_hash` + `txns`), and
/// additionally preserves each block's `difficulty` and `nonce`.
pub trait ChainStore: Send + Sync {
    fn store_blocks(&self, chain: &[SolvedBlock]) -> Result<()>;
    fn load_blocks(&self) -> Result<Vec<SolvedBlock>>;
}
