//! Integration tests for the contract cache across backends and threads.

use std::sync::{Arc, Barrier};
use std::thread;

use ilcontract_core::{
    BinOp, ClauseKind, ClausePosition, ConstValue, ContractClause, ContractSet, Extraction, Fingerprint,
    IlOffset, Node, FINGERPRINT_LEN,
};
use ilcontract_storage::codec::{self, FORMAT_VERSION};
use ilcontract_storage::{
    CacheFormatError, ContractCache, ContractStore, InMemoryStore, Lookup, PutOutcome, SqliteStore,
    StorageError,
};
use proptest::prelude::*;

fn fingerprint(seed: &str) -> Fingerprint {
    Fingerprint(*blake3::hash(seed.as_bytes()).as_bytes())
}

fn contracts(bound: i32, message: Option<&str>) -> ContractSet {
    let mut set = ContractSet::new();
    set.try_push(
        ContractClause::new(
            ClauseKind::Requires,
            Node::binary(BinOp::Ge, Node::arg(0, "amount"), Node::literal(ConstValue::I32(bound))),
            ClausePosition {
                statement_index: 0,
                offset: Some(IlOffset(0x02)),
            },
        )
        .with_message(message.map(str::to_string)),
    )
    .unwrap();
    set.try_push(ContractClause::new(
        ClauseKind::Ensures,
        Node::binary(BinOp::Ne, Node::arg(1, "memo"), Node::literal(ConstValue::Null)),
        ClausePosition {
            statement_index: 3,
            offset: None,
        },
    ))
    .unwrap();
    set
}

fn backends() -> Vec<(&'static str, Arc<dyn ContractStore>)> {
    vec![
        ("memory", Arc::new(InMemoryStore::new())),
        ("sqlite", Arc::new(SqliteStore::in_memory().expect("sqlite store"))),
    ]
}

#[test]
fn content_addressing_holds_on_every_backend() {
    for (name, store) in backends() {
        let cache = ContractCache::new(store);
        let fp = fingerprint("Bank.Account::Withdraw");

        assert_eq!(cache.get(&fp).unwrap(), None, "{name}");
        assert_eq!(cache.put(&fp, &contracts(0, None)).unwrap(), PutOutcome::Stored, "{name}");
        assert_eq!(cache.put(&fp, &contracts(0, None)).unwrap(), PutOutcome::Unchanged, "{name}");
        assert!(
            matches!(
                cache.put(&fp, &contracts(0, Some("changed message"))),
                Err(StorageError::CacheInconsistency { .. })
            ),
            "{name}"
        );
        assert_eq!(cache.get(&fp).unwrap(), Some(contracts(0, None)), "{name}");
    }
}

#[test]
fn concurrent_puts_of_one_key_store_exactly_once() {
    for (name, store) in backends() {
        let cache = Arc::new(ContractCache::new(store));
        let fp = fingerprint("Bank.Account::Deposit");
        let workers = 8;
        let barrier = Arc::new(Barrier::new(workers));

        let outcomes: Vec<PutOutcome> = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let cache = Arc::clone(&cache);
                    let barrier = Arc::clone(&barrier);
                    s.spawn(move || {
                        barrier.wait();
                        cache.put(&fp, &contracts(1, Some("positive"))).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let stored = outcomes.iter().filter(|o| **o == PutOutcome::Stored).count();
        let unchanged = outcomes.iter().filter(|o| **o == PutOutcome::Unchanged).count();
        assert_eq!(stored, 1, "{name}");
        assert_eq!(unchanged, workers - 1, "{name}");
        assert_eq!(cache.len().unwrap(), 1, "{name}");
    }
}

#[test]
fn concurrent_conflicting_puts_keep_first_writer() {
    let cache = Arc::new(ContractCache::in_memory());
    let fp = fingerprint("Bank.Account::Close");

    let results: Vec<(i32, Result<PutOutcome, StorageError>)> = thread::scope(|s| {
        let handles: Vec<_> = (0..6)
            .map(|bound| {
                let cache = Arc::clone(&cache);
                s.spawn(move || (bound, cache.put(&fp, &contracts(bound, None))))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<i32> = results
        .iter()
        .filter(|(_, r)| matches!(r, Ok(PutOutcome::Stored)))
        .map(|(bound, _)| *bound)
        .collect();
    assert_eq!(winners.len(), 1);
    let rejected = results
        .iter()
        .filter(|(_, r)| matches!(r, Err(StorageError::CacheInconsistency { .. })))
        .count();
    assert_eq!(rejected, 5);
    assert_eq!(cache.get(&fp).unwrap(), Some(contracts(winners[0], None)));
}

#[test]
fn distinct_keys_from_many_threads() {
    let cache = Arc::new(ContractCache::in_memory());
    thread::scope(|s| {
        for i in 0..16 {
            let cache = Arc::clone(&cache);
            s.spawn(move || {
                let fp = fingerprint(&format!("Type::Method{i}"));
                assert_eq!(cache.put(&fp, &contracts(i, None)).unwrap(), PutOutcome::Stored);
                assert_eq!(cache.get(&fp).unwrap(), Some(contracts(i, None)));
            });
        }
    });
    assert_eq!(cache.len().unwrap(), 16);
}

#[test]
fn sqlite_cache_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contracts.db");
    let fp = fingerprint("Bank.Account::Withdraw");

    {
        let cache = ContractCache::open_sqlite(&path).unwrap();
        cache.put(&fp, &contracts(0, Some("amount"))).unwrap();
    }

    let cache = ContractCache::open_sqlite(&path).unwrap();
    assert_eq!(cache.get(&fp).unwrap(), Some(contracts(0, Some("amount"))));
    assert_eq!(cache.put(&fp, &contracts(0, Some("amount"))).unwrap(), PutOutcome::Unchanged);

    cache.invalidate_all().unwrap();
    drop(cache);
    let cache = ContractCache::open_sqlite(&path).unwrap();
    assert!(cache.is_empty().unwrap());
}

#[test]
fn record_from_older_format_is_reported_then_replaced() {
    let store: Arc<dyn ContractStore> = Arc::new(SqliteStore::in_memory().unwrap());
    let fp = fingerprint("Legacy::Method");

    let mut record = codec::encode(&Extraction::from(contracts(0, None))).unwrap();
    record[4..6].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
    store.store_record(&fp, &record).unwrap();

    let cache = ContractCache::new(Arc::clone(&store));
    assert_eq!(
        cache.lookup(&fp).unwrap(),
        Lookup::Stale(CacheFormatError::UnsupportedVersion {
            found: FORMAT_VERSION + 1,
            expected: FORMAT_VERSION,
        })
    );
    assert_eq!(cache.get(&fp).unwrap(), None);

    // A stale record is not a conflicting value.
    assert_eq!(cache.put(&fp, &contracts(7, None)).unwrap(), PutOutcome::Replaced);
    assert_eq!(cache.lookup(&fp).unwrap(), Lookup::Hit(Extraction::from(contracts(7, None))));
}

proptest! {
    #[test]
    fn cached_sets_read_back_equal(bound in any::<i32>(), message in proptest::option::of("[a-z ]{0,24}")) {
        let cache = ContractCache::in_memory();
        let fp = fingerprint(&format!("{bound}:{message:?}"));
        let set = contracts(bound, message.as_deref());
        prop_assert_eq!(cache.put(&fp, &set).unwrap(), PutOutcome::Stored);
        prop_assert_eq!(cache.get(&fp).unwrap(), Some(set));
    }
}
