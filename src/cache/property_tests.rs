//! Property-Based Tests for Cache Module
//!
//! Uses proptest with a manual clock, so expiry is checked without sleeping.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, CachedValue, ManualClock};
use crate::settings::{Settings, SettingsHandle};

const MS_PER_DAY: u64 = 86_400_000;

// == Strategies ==
/// Listing identifiers are short digit strings
fn key_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,4}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = CachedValue> {
    prop_oneof![
        Just(CachedValue::NotFound),
        "[1-9][0-9]{4,6}".prop_map(CachedValue::Found),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: CachedValue },
    Get { key: String },
    Advance { ms: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        (0..3 * MS_PER_DAY).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

fn store_with(ttl_days: u64) -> (CacheStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let settings = SettingsHandle::new(Settings {
        ttl_days,
        ..Settings::default()
    });
    (CacheStore::with_clock(settings, clock.clone()), clock)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A get returns the last put value exactly while its age is below the TTL;
    // otherwise it returns nothing and the entry is gone.
    #[test]
    fn prop_get_matches_model(
        ttl_days in 1u64..5,
        ops in prop::collection::vec(cache_op_strategy(), 1..60)
    ) {
        let (mut store, clock) = store_with(ttl_days);
        let ttl_ms = ttl_days * MS_PER_DAY;
        let mut model: HashMap<String, (CachedValue, u64)> = HashMap::new();
        let mut now = 0u64;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    store.put(key.clone(), value.clone()).unwrap();
                    model.insert(key, (value, now));
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key);
                    let expected = match model.get(&key).cloned() {
                        Some((value, stamped)) if now - stamped < ttl_ms => Some(value),
                        Some(_) => {
                            model.remove(&key);
                            None
                        }
                        None => None,
                    };
                    prop_assert_eq!(got, expected);
                }
                CacheOp::Advance { ms } => {
                    clock.advance(Duration::from_millis(ms));
                    now += ms;
                }
            }
            prop_assert_eq!(store.size(), model.len(), "Size should count unread expired entries");
        }
    }

    // Clearing always leaves an empty store, whatever came before.
    #[test]
    fn prop_clear_empties(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 0..40)
    ) {
        let (mut store, _) = store_with(7);
        for (key, value) in entries {
            store.put(key, value).unwrap();
        }

        store.clear().unwrap();
        prop_assert_eq!(store.size(), 0);
    }

    // Hits plus misses equals the number of lookups.
    #[test]
    fn prop_stats_count_every_lookup(
        ops in prop::collection::vec(cache_op_strategy(), 1..60)
    ) {
        let (mut store, clock) = store_with(1);
        let mut lookups = 0u64;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => store.put(key, value).unwrap(),
                CacheOp::Get { key } => {
                    store.get(&key);
                    lookups += 1;
                }
                CacheOp::Advance { ms } => clock.advance(Duration::from_millis(ms)),
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits + stats.misses, lookups);
        prop_assert!(stats.expirations <= stats.misses);
    }
}
