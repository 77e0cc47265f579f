//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's storage properties against real
//! temporary directories.

use proptest::prelude::*;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tempfile::TempDir;

use crate::cache::FileCache;
use crate::config::CacheConfig;
use crate::error::CacheError;

// == Test Configuration ==
const TEST_MAX_ITEMS: usize = 8;
const TEST_MAX_SIZE: u64 = 512;
const TEST_NAMESPACE: &str = "prop";

fn test_config(dir: &TempDir) -> CacheConfig {
    CacheConfig {
        max_items: TEST_MAX_ITEMS,
        max_size: TEST_MAX_SIZE,
        ttl: Duration::from_secs(300),
        check_interval: Duration::ZERO,
        pipe_size: 0,
        base_dir: Some(dir.path().to_path_buf()),
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

// == Strategies ==
/// Generates flat keys
fn flat_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.-]{1,24}".prop_filter("dot segments are not keys", |k| k != "." && k != "..")
}

/// Generates keys with up to two directory levels
fn nested_key_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9_]{1,12}", 1..=3).prop_map(|parts| parts.join("/"))
}

/// Generates payloads within the size limit
fn valid_value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=TEST_MAX_SIZE as usize)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Vec<u8> },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // A small key space makes overwrites and hits likely
    let key = "[a-f]{1,2}";
    prop_oneof![
        (key, prop::collection::vec(any::<u8>(), 0..64))
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Storing a value and reading it back returns the exact bytes.
    #[test]
    fn prop_roundtrip_storage(key in nested_key_strategy(), value in valid_value_strategy()) {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(TEST_NAMESPACE, test_config(&dir)).unwrap();

        let retrieved = block_on(async {
            cache.set(&key, value.clone()).await.unwrap();
            cache.get(&key).await.unwrap()
        });

        prop_assert_eq!(retrieved, value, "Round-trip value mismatch");
    }

    // Oversized payloads are rejected before anything reaches the disk.
    #[test]
    fn prop_oversized_rejected(key in flat_key_strategy(), extra in 1usize..256) {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(TEST_NAMESPACE, test_config(&dir)).unwrap();
        let value = vec![0u8; TEST_MAX_SIZE as usize + extra];

        let result = block_on(cache.set(&key, value));

        prop_assert!(matches!(result, Err(CacheError::TooLarge { .. })), "Expected TooLarge");
        prop_assert!(!cache.namespace_dir().join(&key).exists(), "No file should be created");
    }

    // After a delete the key is gone from memory and disk.
    #[test]
    fn prop_delete_removes_entry(key in nested_key_strategy(), value in valid_value_strategy()) {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(TEST_NAMESPACE, test_config(&dir)).unwrap();

        let (before, after) = block_on(async {
            cache.set(&key, value).await.unwrap();
            let before = cache.exists(&key).await;
            cache.delete(&key).await.unwrap();
            (before, cache.get(&key).await)
        });

        prop_assert!(before, "Key should exist before delete");
        prop_assert!(matches!(after, Err(CacheError::NotFound(_))), "Key should not exist after delete");
    }

    // A second set on the same key replaces the first.
    #[test]
    fn prop_overwrite_semantics(
        key in flat_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(TEST_NAMESPACE, test_config(&dir)).unwrap();

        let (retrieved, resident) = block_on(async {
            cache.set(&key, value1).await.unwrap();
            cache.set(&key, value2.clone()).await.unwrap();
            (cache.get(&key).await.unwrap(), cache.size_in_memory().await)
        });

        prop_assert_eq!(retrieved, value2, "Overwrite should return new value");
        prop_assert_eq!(resident, 1, "Should have exactly one entry after overwrite");
    }

    // Keys that step outside the namespace are always refused.
    #[test]
    fn prop_traversal_rejected(prefix in nested_key_strategy(), suffix in "[a-z]{1,8}") {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(TEST_NAMESPACE, test_config(&dir)).unwrap();
        let key = format!("{}/../../{}", prefix, suffix);

        let result = block_on(cache.set(&key, b"x".to_vec()));

        prop_assert!(matches!(result, Err(CacheError::InvalidKey(_))), "Traversal key accepted: {}", key);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // For any sequence of operations, memory stays a bounded subset of disk
    // and statistics count every lookup.
    #[test]
    fn prop_memory_is_bounded_subset_of_disk(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(TEST_NAMESPACE, test_config(&dir)).unwrap();
        let mut on_disk: HashSet<String> = HashSet::new();
        let mut expected_lookups: u64 = 0;

        block_on(async {
            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        cache.set(&key, value).await.unwrap();
                        on_disk.insert(key);
                    }
                    CacheOp::Get { key } => {
                        let result = cache.get(&key).await;
                        assert_eq!(result.is_ok(), on_disk.contains(&key));
                        expected_lookups += 1;
                    }
                    CacheOp::Delete { key } => {
                        let result = cache.delete(&key).await;
                        assert_eq!(result.is_ok(), on_disk.remove(&key));
                    }
                }

                assert!(cache.size_in_memory().await <= TEST_MAX_ITEMS);
            }
        });

        let stats = block_on(cache.stats());
        prop_assert_eq!(stats.hits + stats.loads + stats.misses, expected_lookups);
        prop_assert!(stats.resident <= on_disk.len(), "Memory holds keys missing from disk");
        for key in &on_disk {
            prop_assert!(cache.namespace_dir().join(key).is_file(), "Missing file for {}", key);
        }
    }

    // Shutdown keeps the files, so a fresh cache on the namespace loads them back.
    #[test]
    fn prop_shutdown_preserves_disk(
        entries in prop::collection::hash_map(flat_key_strategy(), valid_value_strategy(), 1..6)
    ) {
        let dir = TempDir::new().unwrap();

        block_on(async {
            let cache = FileCache::new(TEST_NAMESPACE, test_config(&dir)).unwrap();
            for (key, value) in &entries {
                cache.set(key, value.clone()).await.unwrap();
            }
            cache.shutdown().await;
            assert_eq!(cache.size_in_memory().await, 0);
        });

        let reopened = FileCache::new(TEST_NAMESPACE, test_config(&dir)).unwrap();
        for (key, value) in &entries {
            let loaded = block_on(reopened.get(key)).unwrap();
            prop_assert_eq!(&loaded, value);
        }
    }
}
