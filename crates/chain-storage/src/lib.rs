//! Persistence adapter for the ledger core: a sled-backed [`ChainStore`]
//! holding blocks as their dict-shaped JSON interchange records, keyed by
//! insertion order.
//!
//! [`ChainStore`]: chain_core::ChainStore

pub mod sled_store;

pub use sled_store::SledStore;
