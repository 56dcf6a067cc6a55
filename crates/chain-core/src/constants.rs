/// Fixed reward credited to the miner by each block's coinbase transaction.
pub const MINING_REWARD: u64 = 1;

/// Sentinel `prev_hash` carried by a block mined onto an empty chain.
pub const GENESIS_PREV_HASH: &str = "";

pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
