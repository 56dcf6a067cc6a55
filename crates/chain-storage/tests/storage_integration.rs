use chain_core::{Amount, ChainStore, Node, SolvedBlock, Transaction};
use chain_storage::SledStore;
use rand::Rng;
use tempfile::tempdir;

/// Mines a small chain the way a caller would: each batch gets a coinbase
/// prepended and is solved at difficulty 1.
fn mine_chain(identity: &str, batches: usize) -> Vec<SolvedBlock> {
    let mut rng = rand::thread_rng();
    let mut node = Node::new(identity);
    for i in 0..batches {
        let txns = if i == 0 {
            vec![]
        } else {
            vec![Transaction::new(
                vec![Amount::new(identity, rng.gen_range(1..10))],
                vec![Amount::new("fred", rng.gen_range(1..10))],
                Some(1_600_000_000 + i as u64),
            )]
        };
        node.process_txns(txns, 1, Some(1_600_000_000 + i as u64))
            .expect("unbounded search at difficulty 1 must solve");
    }
    node.chain().to_vec()
}

#[tokio::test]
async fn chain_round_trip_preserves_every_block() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let store = SledStore::open(temp_dir.path())?;

    let chain = mine_chain("matt", 4);
    store.store_blocks(&chain)?;
    let loaded = store.load_blocks()?;

    assert_eq!(loaded, chain);
    assert_eq!(store.block_count()?, 4);
    for (stored, original) in loaded.iter().zip(&chain) {
        assert_eq!(stored.txns(), original.txns());
        assert_eq!(stored.difficulty(), original.difficulty());
        // Nonce survives the round-trip too: the header record carries it.
        assert_eq!(stored.nonce(), original.nonce());
        assert_eq!(stored.digest()?, original.digest()?);
    }

    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn chain_survives_reopen() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let chain = mine_chain("matt", 2);
    {
        let store = SledStore::open(temp_dir.path())?;
        store.store_blocks(&chain)?;
        store.close()?;
    }
    {
        let store = SledStore::open(temp_dir.path())?;
        assert_eq!(store.load_blocks()?, chain);
    }
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn empty_store_loads_an_empty_chain() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let store = SledStore::open(temp_dir.path())?;
    assert!(store.load_blocks()?.is_empty());
    assert_eq!(store.block_count()?, 0);
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn storing_replaces_the_previous_chain() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let store = SledStore::open(temp_dir.path())?;

    store.store_blocks(&mine_chain("matt", 3))?;
    let replacement = mine_chain("fred", 1);
    store.store_blocks(&replacement)?;

    assert_eq!(store.load_blocks()?, replacement);
    assert_eq!(store.block_count()?, 1);
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn clear_empties_the_store() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let store = SledStore::open(temp_dir.path())?;
    store.store_blocks(&mine_chain("matt", 2))?;
    store.clear()?;
    assert!(store.load_blocks()?.is_empty());
    assert_eq!(store.block_count()?, 0);
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn corrupted_record_aborts_the_load_naming_the_block() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    {
        let store = SledStore::open(temp_dir.path())?;
        store.store_blocks(&mine_chain("matt", 2))?;
        store.close()?;
    }
    // Smash block 1 on disk behind the store's back.
    {
        let db = sled::open(temp_dir.path())?;
        let blocks = db.open_tree("blocks")?;
        blocks.insert(1u64.to_be_bytes(), b"not json".as_slice())?;
        db.flush()?;
    }
    let store = SledStore::open(temp_dir.path())?;
    let err = store.load_blocks().unwrap_err();
    let rendered = format!("{err:#}");
    assert!(
        rendered.contains("block 1"),
        "error should name the record: {rendered}"
    );
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn record_without_a_nonce_is_refused() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    {
        let store = SledStore::open(temp_dir.path())?;
        store.close()?;
    }
    // An unsolved block's record (nonce null) cannot rejoin a chain.
    {
        let db = sled::open(temp_dir.path())?;
        let blocks = db.open_tree("blocks")?;
        let record = serde_json::json!({
            "header": {"prev_hash": "", "body_hash": "", "difficulty": 1, "nonce": null},
            "body": {"txns": []},
        });
        blocks.insert(0u64.to_be_bytes(), serde_json::to_vec(&record)?)?;
        db.flush()?;
    }
    let store = SledStore::open(temp_dir.path())?;
    let err = store.load_blocks().unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("block 0"), "{rendered}");
    assert!(rendered.contains("nonce"), "{rendered}");
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn mismatched_schema_version_refuses_to_open() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    {
        let store = SledStore::open(temp_dir.path())?;
        store.close()?;
    }
    {
        let db = sled::open(temp_dir.path())?;
        db.insert(b"schema_version", &2u64.to_be_bytes())?;
        db.flush()?;
    }
    assert!(SledStore::open(temp_dir.path()).is_err());
    temp_dir.close()?;
    Ok(())
}

#[tokio::test]
async fn a_loaded_chain_keeps_mining_where_it_left_off() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let store = SledStore::open(temp_dir.path())?;
    store.store_blocks(&mine_chain("matt", 2))?;

    let loaded = store.load_blocks()?;
    let tail_prev = loaded.last().unwrap().prev_hash().to_owned();
    let mut node = Node::with_chain("matt", loaded);
    let (block, _) = node.process_txns(vec![], 1, None)?;

    // New blocks reuse the tail's own backward pointer, same as before the
    // round-trip.
    assert_eq!(block.prev_hash(), tail_prev);
    assert_eq!(node.chain().len(), 3);
    store.store_blocks(node.chain())?;
    assert_eq!(store.block_count()?, 3);
    temp_dir.close()?;
    Ok(())
}
