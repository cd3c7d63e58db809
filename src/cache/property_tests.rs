//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the engine against simple reference models.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{Cache, Policy, Usage};

// == Strategies ==
/// Small key space so that operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = u32> {
    any::<u32>()
}

fn policy_strategy() -> impl Strategy<Value = Policy> {
    prop_oneof![
        Just(Policy::NoEviction),
        Just(Policy::Lru),
        Just(Policy::Lfu),
    ]
}

/// A sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: u32 },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn apply(cache: &mut Cache<String, u32>, op: CacheOp) {
    match op {
        CacheOp::Set { key, value } => {
            cache.set(key, value);
        }
        CacheOp::Get { key } => {
            cache.get(&key);
        }
        CacheOp::Delete { key } => {
            cache.delete(&key);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Capacity bound and order/entries agreement hold after every operation
    #[test]
    fn prop_capacity_enforcement(
        policy in policy_strategy(),
        capacity in 1usize..5,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut cache = Cache::new(policy, Some(capacity));

        for op in ops {
            apply(&mut cache, op);
            prop_assert!(cache.len() <= capacity, "{} entries exceed {}", cache.len(), capacity);

            let keys = cache.keys();
            prop_assert_eq!(keys.len(), cache.len());
            for key in &keys {
                prop_assert!(cache.exists(key));
            }
        }
    }

    // LRU matches a reference recency list
    #[test]
    fn prop_lru_matches_model(
        capacity in 1usize..5,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut cache = Cache::new(Policy::Lru, Some(capacity));
        let mut model: Vec<(String, u32)> = Vec::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    if let Some(pos) = model.iter().position(|(k, _)| *k == key) {
                        model.remove(pos);
                    } else if model.len() >= capacity {
                        model.remove(0);
                    }
                    model.push((key.clone(), value));
                    cache.set(key, value);
                }
                CacheOp::Get { key } => {
                    let expected = model.iter().position(|(k, _)| *k == key).map(|pos| {
                        let item = model.remove(pos);
                        let value = item.1;
                        model.push(item);
                        value
                    });
                    prop_assert_eq!(cache.get(&key), expected);
                }
                CacheOp::Delete { key } => {
                    model.retain(|(k, _)| *k != key);
                    cache.delete(&key);
                }
            }

            let model_keys: Vec<String> = model.iter().map(|(k, _)| k.clone()).collect();
            prop_assert_eq!(cache.keys(), model_keys);
        }
    }

    // The LFU victim always carries the minimum use-count
    #[test]
    fn prop_lfu_evicts_minimum_count(
        capacity in 1usize..5,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut cache = Cache::new(Policy::Lfu, Some(capacity));

        for op in ops {
            let before: HashMap<String, u64> = cache
                .keys()
                .into_iter()
                .map(|k| {
                    let count = match cache.usage(&k) {
                        Some(Usage::Count(n)) => n,
                        _ => 0,
                    };
                    (k, count)
                })
                .collect();
            let inserting_new = matches!(&op, CacheOp::Set { key, .. } if !before.contains_key(key));

            apply(&mut cache, op);

            let evicted: Vec<&String> = before.keys().filter(|k| !cache.exists(*k)).collect();
            if inserting_new && before.len() == capacity {
                prop_assert_eq!(evicted.len(), 1);
                let min = before.values().min().copied().unwrap_or(0);
                prop_assert_eq!(before[evicted[0]], min);
            }
        }
    }

    // Capped caches never drop a key they accepted, except through delete
    #[test]
    fn prop_no_eviction_keeps_accepted_keys(
        capacity in 1usize..5,
        keys in prop::collection::vec(key_strategy(), 1..40)
    ) {
        let mut cache = Cache::new(Policy::NoEviction, Some(capacity));
        let mut accepted: Vec<String> = Vec::new();

        for key in keys {
            cache.set(key.clone(), 1);
            if cache.exists(&key) && !accepted.contains(&key) {
                accepted.push(key);
            }
            for k in &accepted {
                prop_assert!(cache.exists(k));
            }
        }
        prop_assert_eq!(cache.keys(), accepted);
    }

    // Overwrite then read returns the newest value with a single entry
    #[test]
    fn prop_overwrite_semantics(
        policy in policy_strategy(),
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut cache = Cache::new(policy, Some(3));
        cache.set(key.clone(), value1);
        cache.set(key.clone(), value2);

        prop_assert_eq!(cache.get(&key), Some(value2));
        prop_assert_eq!(cache.len(), 1);
    }

    // Delete removes the entry from every structure
    #[test]
    fn prop_delete_removes_entry(policy in policy_strategy(), key in key_strategy(), value in value_strategy()) {
        let mut cache = Cache::new(policy, Some(3));
        cache.set(key.clone(), value);

        prop_assert!(cache.delete(&key));
        prop_assert_eq!(cache.get(&key), None);
        prop_assert!(cache.keys().is_empty());
    }

    // Save then load preserves every live value
    #[test]
    fn prop_snapshot_round_trip(
        policy in policy_strategy(),
        compressed in any::<bool>(),
        entries in prop::collection::vec((key_strategy(), value_strategy()), 0..20)
    ) {
        let mut cache = Cache::new(policy, None);
        for (key, value) in entries {
            cache.set(key, value);
        }

        let bytes = cache.to_bytes(compressed).unwrap();
        let mut loaded: Cache<String, u32> = Cache::from_bytes(policy, None, &bytes, compressed).unwrap();

        prop_assert_eq!(loaded.keys(), cache.keys());
        for key in cache.keys() {
            prop_assert_eq!(loaded.get(&key), cache.get(&key));
        }
    }
}

// == Additional Unit Tests for the documented scenarios ==
#[cfg(test)]
mod tests {
    use super::*;

    fn s(key: &str) -> String {
        key.to_string()
    }

    #[test]
    fn test_scenario_capped() {
        let mut cache = Cache::new(Policy::NoEviction, Some(3));
        cache.add(s("a"), 1, None);
        cache.add(s("b"), 2, None);
        cache.add(s("c"), 3, None);
        cache.add(s("d"), 4, None);

        assert_eq!(cache.get("d"), None);
        assert_eq!(cache.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_scenario_lru() {
        let mut cache = Cache::new(Policy::Lru, Some(3));
        cache.set(s("a"), 1);
        cache.set(s("b"), 2);
        cache.set(s("c"), 3);
        cache.get("a");
        cache.set(s("d"), 4);

        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.get("d"), Some(4));
    }

    #[test]
    fn test_scenario_lfu() {
        let mut cache = Cache::new(Policy::Lfu, Some(3));
        cache.set(s("a"), 1);
        cache.set(s("b"), 2);
        cache.set(s("c"), 3);
        for _ in 0..2 {
            cache.get("a");
        }
        for _ in 0..3 {
            cache.get("b");
        }
        cache.set(s("d"), 4);

        assert_eq!(cache.get("c"), None);
        assert_eq!(cache.get("d"), Some(4));
    }
}
