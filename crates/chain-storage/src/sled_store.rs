use anyhow::{bail, Context, Result};
use chain_core::{ChainStore, SolvedBlock};
use sled::Db;
use std::path::Path;
use tracing::{debug, info};

const TREE_BLOCKS: &str = "blocks";
const KEY_BLOCK_COUNT: &[u8] = b"block_count";
const KEY_SCHEMA_VERSION: &[u8] = b"schema_version";

/// Bumped whenever the persisted record shape changes incompatibly. Checked
/// on open so a mismatched database fails loudly instead of misparsing.
const SCHEMA_VERSION: u64 = 1;

/// Sled-backed chain store. Blocks live in the `"blocks"` tree as JSON
/// interchange records under big-endian insertion-index keys, so iteration
/// order is insertion order.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        match db.get(KEY_SCHEMA_VERSION)? {
            None => {
                db.insert(KEY_SCHEMA_VERSION, &SCHEMA_VERSION.to_be_bytes())?;
            }
            Some(v) if v.as_ref() == SCHEMA_VERSION.to_be_bytes().as_slice() => {}
            Some(v) => bail!(
                "unsupported schema version {:?} (supported: {SCHEMA_VERSION})",
                v.as_ref()
            ),
        }
        info!("sled store opened");
        Ok(Self { db })
    }

    fn blocks(&self) -> Result<sled::Tree> {
        self.db.open_tree(TREE_BLOCKS).context("open blocks tree")
    }

    pub fn block_count(&self) -> Result<u64> {
        Ok(self
            .db
            .get(KEY_BLOCK_COUNT)?
            .map(|v| {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(&v);
                u64::from_be_bytes(arr)
            })
            .unwrap_or(0))
    }

    /// Drops every stored block. Used by tests and reset tooling.
    pub fn clear(&self) -> Result<()> {
        self.blocks()?.clear()?;
        self.db.remove(KEY_BLOCK_COUNT)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn close(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl ChainStore for SledStore {
    /// Replaces the stored chain with `chain`, in order, flushing to disk.
    fn store_blocks(&self, chain: &[SolvedBlock]) -> Result<()> {
        let tree = self.blocks()?;
        tree.clear()?;
        for (index, block) in chain.iter().enumerate() {
            let record = block
                .to_record()
                .with_context(|| format!("block {index}: encoding record"))?;
            let bytes = serde_json::to_vec(&record)
                .with_context(|| format!("block {index}: encoding record"))?;
            tree.insert((index as u64).to_be_bytes(), bytes)?;
        }
        self.db
            .insert(KEY_BLOCK_COUNT, &(chain.len() as u64).to_be_bytes())?;
        self.db.flush()?;
        debug!(blocks = chain.len(), "chain stored");
        Ok(())
    }

    /// Loads the chain in insertion order. One malformed record aborts the
    /// whole load, naming the block it belongs to.
    fn load_blocks(&self) -> Result<Vec<SolvedBlock>> {
        let tree = self.blocks()?;
        let mut chain = Vec::new();
        for (position, entry) in tree.iter().enumerate() {
            let (key, bytes) = entry?;
            let index = block_index(&key, position);
            let record = serde_json::from_slice(&bytes)
                .with_context(|| format!("block {index}: malformed record"))?;
            let block = SolvedBlock::from_record(record)
                .with_context(|| format!("block {index}"))?;
            chain.push(block);
        }
        debug!(blocks = chain.len(), "chain loaded");
        Ok(chain)
    }
}

fn block_index(key: &[u8], fallback: usize) -> u64 {
    match <[u8; 8]>::try_from(key) {
        Ok(arr) => u64::from_be_bytes(arr),
        Err(_) => fallback as u64,
    }
}
