//! Property-based tests for HashTrieMap.
//!
//! This module verifies that HashTrieMap satisfies the map laws and behaves
//! like `std::collections::HashMap` under arbitrary sequences of updates,
//! including with providers that force deep tries and collision buckets.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use hashtrie::persistent::HashTrieMap;
use hashtrie::provider::KeyProvider;
use proptest::prelude::*;

// =============================================================================
// Strategy for generating test data
// =============================================================================

fn arbitrary_key() -> impl Strategy<Value = String> {
    "[a-z]{1,10}".prop_map(|s| s)
}

fn arbitrary_value() -> impl Strategy<Value = i32> {
    any::<i32>()
}

fn arbitrary_entry() -> impl Strategy<Value = (String, i32)> {
    (arbitrary_key(), arbitrary_value())
}

fn arbitrary_entries() -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::vec(arbitrary_entry(), 0..50)
}

#[derive(Clone, Debug)]
enum Operation {
    Insert(u16, i32),
    Remove(u16),
}

fn arbitrary_operations() -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(
        prop_oneof![
            3 => (any::<u16>(), any::<i32>()).prop_map(|(key, value)| Operation::Insert(key, value)),
            1 => any::<u16>().prop_map(Operation::Remove),
        ],
        0..300,
    )
}

/// Keeps only a few bits of each key, so many keys share full hashes while
/// the rest spread over the top of the trie.
#[derive(Clone, Copy, Default)]
struct LowEntropy;

impl KeyProvider<u16> for LowEntropy {
    type Error = Infallible;

    fn hash_key(&self, key: &u16) -> Result<u32, Infallible> {
        let key = u32::from(*key);
        Ok((key & 0x3F) | ((key & 0x3C0) << 20))
    }

    fn keys_equal(&self, left: &u16, right: &u16) -> Result<bool, Infallible> {
        Ok(left == right)
    }
}

fn run_against_model<P>(provider: P, operations: &[Operation]) -> Result<(), TestCaseError>
where
    P: KeyProvider<u16, Error = Infallible> + Clone,
{
    let mut map = HashTrieMap::with_provider(provider);
    let mut model = HashMap::new();
    let mut history = Vec::new();

    for operation in operations {
        history.push((map.clone(), model.clone()));
        match *operation {
            Operation::Insert(key, value) => {
                map = map.insert(key, value);
                model.insert(key, value);
            }
            Operation::Remove(key) => {
                map = map.remove(&key);
                model.remove(&key);
            }
        }
        prop_assert_eq!(map.len(), model.len());
    }

    for (key, value) in &model {
        prop_assert_eq!(map.get(key), Some(value));
    }
    let collected: HashMap<u16, i32> = map.iter().map(|(key, value)| (*key, *value)).collect();
    prop_assert_eq!(&collected, &model);

    // Earlier versions are untouched by later updates.
    for (snapshot, expected) in &history {
        prop_assert_eq!(snapshot.len(), expected.len());
        for (key, value) in expected {
            prop_assert_eq!(snapshot.get(key), Some(value));
        }
    }
    Ok(())
}

// =============================================================================
// Model Laws: a HashTrieMap agrees with std HashMap
// =============================================================================

proptest! {
    #[test]
    fn prop_matches_std_hash_map(operations in arbitrary_operations()) {
        run_against_model(hashtrie::provider::StandardProvider::new(), &operations)?;
    }
}

proptest! {
    #[test]
    fn prop_matches_std_hash_map_with_collisions(operations in arbitrary_operations()) {
        run_against_model(LowEntropy, &operations)?;
    }
}

// =============================================================================
// Get-Insert Law: map.insert(k, v).get(&k) == Some(&v)
// =============================================================================

proptest! {
    #[test]
    fn prop_get_insert_law(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in arbitrary_value()
    ) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        let inserted = map.insert(key.clone(), value);

        prop_assert_eq!(inserted.get(&key), Some(&value));
    }
}

// =============================================================================
// Get-Insert-Other Law: k1 != k2 => map.insert(k1, v).get(&k2) == map.get(&k2)
// =============================================================================

proptest! {
    #[test]
    fn prop_get_insert_other_law(
        entries in arbitrary_entries(),
        key1 in arbitrary_key(),
        key2 in arbitrary_key(),
        value in arbitrary_value()
    ) {
        prop_assume!(key1 != key2);

        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        let inserted = map.insert(key1, value);

        prop_assert_eq!(inserted.get(&key2), map.get(&key2));
    }
}

// =============================================================================
// Remove-Get Law: map.remove(&k).get(&k) == None
// =============================================================================

proptest! {
    #[test]
    fn prop_remove_get_law(
        entries in arbitrary_entries(),
        key in arbitrary_key()
    ) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        let removed = map.remove(&key);

        prop_assert_eq!(removed.get(&key), None);
    }
}

// =============================================================================
// Remove-Insert Law: !map.contains_key(&k) => map.insert(k, v).remove(&k) == map
// =============================================================================

proptest! {
    #[test]
    fn prop_remove_insert_law(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in arbitrary_value()
    ) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        prop_assume!(!map.contains_key(&key));

        let inserted_then_removed = map.insert(key.clone(), value).remove(&key);

        prop_assert_eq!(inserted_then_removed, map);
    }
}

// =============================================================================
// Idempotence Law: map.insert(k, v).insert(k, v) == map.insert(k, v)
// =============================================================================

proptest! {
    #[test]
    fn prop_insert_idempotent(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in arbitrary_value()
    ) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        let once = map.insert(key.clone(), value);
        let twice = once.insert(key.clone(), value);

        prop_assert_eq!(&twice, &once);
        prop_assert!(once.insert_if_changed(key, value).ptr_eq(&once));
    }
}

// =============================================================================
// Length Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_length_law_insert(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in arbitrary_value()
    ) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        let expected = map.len() + usize::from(!map.contains_key(&key));

        prop_assert_eq!(map.insert(key, value).len(), expected);
    }
}

proptest! {
    #[test]
    fn prop_length_law_remove(
        entries in arbitrary_entries(),
        key in arbitrary_key()
    ) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        let expected = map.len() - usize::from(map.contains_key(&key));

        prop_assert_eq!(map.remove(&key).len(), expected);
    }
}

// =============================================================================
// Persistence Law: Operations do not modify the original map
// =============================================================================

proptest! {
    #[test]
    fn prop_updates_preserve_original(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in arbitrary_value()
    ) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        let original: HashMap<String, i32> =
            map.iter().map(|(key, value)| (key.clone(), *value)).collect();

        let _ = map.insert(key.clone(), value);
        let _ = map.remove(&key);

        prop_assert_eq!(map.len(), original.len());
        for (key, value) in &original {
            prop_assert_eq!(map.get(key), Some(value));
        }
    }
}

// =============================================================================
// Equality and Hash Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_insertion_order_does_not_matter(entries in arbitrary_entries()) {
        // Deduplicate so both orders agree on the winning value.
        let unique: HashMap<String, i32> = entries.into_iter().collect();
        let forward: HashTrieMap<String, i32> = unique.clone().into_iter().collect();
        let mut reversed: Vec<(String, i32)> = unique.into_iter().collect();
        reversed.reverse();
        let backward: HashTrieMap<String, i32> = reversed.into_iter().collect();

        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward.structural_hash(), backward.structural_hash());
    }
}

proptest! {
    #[test]
    fn prop_equality_is_symmetric(
        entries1 in arbitrary_entries(),
        entries2 in arbitrary_entries()
    ) {
        let map1: HashTrieMap<String, i32> = entries1.into_iter().collect();
        let map2: HashTrieMap<String, i32> = entries2.into_iter().collect();

        prop_assert_eq!(map1 == map2, map2 == map1);
    }
}

// =============================================================================
// Merge Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_merge_identity(entries in arbitrary_entries()) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();
        let empty: HashTrieMap<String, i32> = HashTrieMap::new();

        prop_assert_eq!(&empty.merge(&map), &map);
        prop_assert_eq!(&map.merge(&empty), &map);
    }
}

proptest! {
    #[test]
    fn prop_merge_contains_all_keys(
        entries1 in arbitrary_entries(),
        entries2 in arbitrary_entries()
    ) {
        let map1: HashTrieMap<String, i32> = entries1.into_iter().collect();
        let map2: HashTrieMap<String, i32> = entries2.into_iter().collect();

        let merged = map1.merge(&map2);

        for key in map1.keys() {
            prop_assert!(merged.contains_key(key));
        }
        for (key, value) in &map2 {
            prop_assert_eq!(merged.get(key), Some(value));
        }
    }
}

// =============================================================================
// Iterator Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_iter_yields_each_key_once(entries in arbitrary_entries()) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();

        let keys: HashSet<&String> = map.keys().collect();
        prop_assert_eq!(keys.len(), map.len());
        prop_assert_eq!(map.iter().len(), map.len());
        prop_assert_eq!(map.values().count(), map.len());
    }
}

proptest! {
    #[test]
    fn prop_fold_matches_values_sum(entries in arbitrary_entries()) {
        let map: HashTrieMap<String, i32> = entries.into_iter().collect();

        let fold_sum = map.fold(0_i64, |accumulator, _, value| accumulator + i64::from(*value));
        let values_sum: i64 = map.values().map(|value| i64::from(*value)).sum();

        prop_assert_eq!(fold_sum, values_sum);
    }
}
