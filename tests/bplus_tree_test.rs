//! B+ Tree Tests
//!
//! Behavior of the public index: inserts, searches, deletes, scans and
//! the utility operations, with the tree validated after structural work.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotdb::{BPlusTree, Entry, Error, PageId, RecordId};

const ORDER: usize = 4;

fn rid(page: u32, slot: u16) -> RecordId {
    RecordId::new(PageId::new(page), slot)
}

fn new_tree() -> BPlusTree<i32, RecordId> {
    BPlusTree::new(ORDER).unwrap()
}

fn keys_of(entries: &[Entry<i32, RecordId>]) -> Vec<i32> {
    entries.iter().map(|e| e.key).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

/// Ascending inserts grow the tree past one level.
#[test]
fn test_scenario_ascending_inserts() {
    let tree = new_tree();
    for i in 1..=20 {
        tree.insert(i * 10, rid(i as u32, 0)).unwrap();
    }

    assert_eq!(tree.size(), 20);
    assert!(tree.height() > 1);
    assert!(tree.search(&100).unwrap().is_some());
    tree.validate().unwrap();
}

/// Deleting everything in insertion order empties the tree.
#[test]
fn test_scenario_delete_all_ascending() {
    let tree = new_tree();
    for i in 1..=20 {
        tree.insert(i * 10, rid(i as u32, 0)).unwrap();
    }
    for i in 1..=20 {
        assert!(tree.delete(&(i * 10)).unwrap());
        tree.validate().unwrap();
    }

    assert!(tree.is_empty());
    assert_eq!(tree.size(), 0);
    assert_eq!(tree.height(), 1);
}

/// Out-of-order inserts come back sorted.
#[test]
fn test_scenario_unordered_inserts_scan_sorted() {
    let tree = new_tree();
    for key in [50, 20, 80, 10, 30, 70, 90, 40, 60] {
        tree.insert(key, rid(key as u32, 0)).unwrap();
    }

    let entries = tree.all_entries().unwrap();
    assert_eq!(keys_of(&entries), vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
}

/// Range queries are inclusive and may be empty.
#[test]
fn test_scenario_range_queries() {
    let tree = new_tree();
    for i in 1..=10 {
        tree.insert(i * 10, rid(i as u32, 0)).unwrap();
    }

    let hits = tree.range_query(&20, &50).unwrap();
    assert_eq!(keys_of(&hits), vec![20, 30, 40, 50]);

    assert!(tree.range_query(&105, &200).unwrap().is_empty());
}

/// Re-inserting a key replaces its value.
#[test]
fn test_scenario_upsert_replaces() {
    let tree = new_tree();
    let a = rid(1, 100);
    let b = rid(2, 200);

    assert_eq!(tree.insert(10, a).unwrap(), None);
    assert_eq!(tree.insert(10, b).unwrap(), Some(a));

    assert_eq!(tree.size(), 1);
    assert_eq!(tree.search(&10).unwrap(), Some(b));
}

// ============================================================================
// Insert
// ============================================================================

#[test]
fn test_insert_into_empty_tree() {
    let tree = new_tree();
    let value = rid(1, 100);
    tree.insert(10, value).unwrap();

    assert_eq!(tree.search(&10).unwrap(), Some(value));
    assert_eq!(tree.size(), 1);
    assert!(!tree.is_empty());
}

#[test]
fn test_insert_reverse_order() {
    let tree = new_tree();
    for i in (1..=10).rev() {
        tree.insert(i * 10, rid(i as u32, 0)).unwrap();
    }

    assert_eq!(tree.size(), 10);
    for i in 1..=10 {
        assert!(tree.contains(&(i * 10)).unwrap());
    }
    tree.validate().unwrap();
}

#[test]
fn test_insert_many_splits() {
    let tree = new_tree();
    for i in 0..1000 {
        tree.insert(i, rid(i as u32, 0)).unwrap();
    }

    assert_eq!(tree.size(), 1000);
    for i in 0..1000 {
        assert!(tree.search(&i).unwrap().is_some(), "key {i} should exist");
    }
    tree.validate().unwrap();
}

#[test]
fn test_height_grows() {
    let tree = new_tree();
    tree.insert(10, rid(1, 1)).unwrap();
    assert_eq!(tree.height(), 1);

    for i in 1..=50 {
        tree.insert(i, rid(i as u32, 0)).unwrap();
    }
    assert!(tree.height() > 1);
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_search_empty_tree() {
    let tree = new_tree();
    assert_eq!(tree.search(&10).unwrap(), None);
    assert!(!tree.contains(&10).unwrap());
}

#[test]
fn test_search_missing_keys() {
    let tree = new_tree();
    for i in 1..=50 {
        tree.insert(i, rid(i as u32, 0)).unwrap();
    }

    assert!(tree.search(&1).unwrap().is_some());
    assert!(tree.search(&25).unwrap().is_some());
    assert!(tree.search(&50).unwrap().is_some());
    assert!(tree.search(&51).unwrap().is_none());
    assert!(tree.search(&0).unwrap().is_none());
}

/// A zero locator is a real value, not "absent".
#[test]
fn test_search_zero_value_is_present() {
    let tree = new_tree();
    tree.insert(0, rid(0, 0)).unwrap();
    assert_eq!(tree.search(&0).unwrap(), Some(rid(0, 0)));
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn test_delete_tombstone() {
    let tree = new_tree();
    tree.insert(10, rid(1, 100)).unwrap();
    tree.insert(20, rid(2, 200)).unwrap();

    assert!(tree.delete(&10).unwrap());
    assert_eq!(tree.search(&10).unwrap(), None);
    assert!(!tree.delete(&10).unwrap());

    assert_eq!(tree.size(), 1);
    assert!(tree.search(&20).unwrap().is_some());
}

#[test]
fn test_delete_missing_key() {
    let tree = new_tree();
    tree.insert(10, rid(1, 100)).unwrap();

    assert!(!tree.delete(&20).unwrap());
    assert_eq!(tree.size(), 1);
}

#[test]
fn test_delete_with_borrowing() {
    let tree = new_tree();
    for i in 1..=20 {
        tree.insert(i * 10, rid(i as u32, 0)).unwrap();
    }

    assert!(tree.delete(&50).unwrap());
    assert!(tree.delete(&60).unwrap());
    tree.validate().unwrap();

    assert_eq!(tree.size(), 18);
    assert!(tree.search(&50).unwrap().is_none());
    assert!(tree.search(&60).unwrap().is_none());
    assert!(tree.search(&10).unwrap().is_some());
    assert!(tree.search(&100).unwrap().is_some());
}

#[test]
fn test_delete_with_merges() {
    let tree = new_tree();
    for i in 1..=15 {
        tree.insert(i * 10, rid(i as u32, 0)).unwrap();
    }
    for i in 1..=10 {
        assert!(tree.delete(&(i * 10)).unwrap());
        tree.validate().unwrap();
    }

    assert_eq!(tree.size(), 5);
    for i in 11..=15 {
        assert!(tree.search(&(i * 10)).unwrap().is_some());
    }
}

#[test]
fn test_alternating_deletes() {
    let tree = new_tree();
    for i in 0..100 {
        tree.insert(i, rid(i as u32, 0)).unwrap();
    }
    for i in 0..50 {
        assert!(tree.delete(&(i * 2)).unwrap());
    }
    tree.validate().unwrap();

    assert_eq!(tree.size(), 50);
    for i in (1..100).step_by(2) {
        assert!(tree.search(&i).unwrap().is_some());
    }
    for i in (0..100).step_by(2) {
        assert!(tree.search(&i).unwrap().is_none());
    }
}

#[test]
fn test_random_inserts_and_deletes() {
    let tree = new_tree();
    let mut rng = StdRng::seed_from_u64(42);
    let mut expected = std::collections::BTreeSet::new();

    for _ in 0..500 {
        let key: i32 = rng.gen_range(0..10_000);
        tree.insert(key, rid(key as u32, 0)).unwrap();
        expected.insert(key);
    }
    assert_eq!(tree.size(), expected.len());

    let mut pool: Vec<i32> = expected.iter().copied().collect();
    for _ in 0..250 {
        let idx = rng.gen_range(0..pool.len());
        let key = pool.swap_remove(idx);
        assert!(tree.delete(&key).unwrap());
        expected.remove(&key);
    }
    tree.validate().unwrap();

    assert_eq!(tree.size(), expected.len());
    let scanned: Vec<i32> = keys_of(&tree.all_entries().unwrap());
    assert_eq!(scanned, expected.into_iter().collect::<Vec<_>>());
}

// ============================================================================
// Range queries and scans
// ============================================================================

#[test]
fn test_range_query_full_and_single() {
    let tree = new_tree();
    for i in 1..=10 {
        tree.insert(i * 10, rid(i as u32, 0)).unwrap();
    }

    assert_eq!(tree.range_query(&10, &100).unwrap().len(), 10);

    let single = tree.range_query(&50, &50).unwrap();
    assert_eq!(keys_of(&single), vec![50]);
}

#[test]
fn test_range_query_invalid_range() {
    let tree = new_tree();
    let err = tree.range_query(&50, &20).unwrap_err();
    assert_eq!(err, Error::InvalidRange);
    assert!(err.is_invalid_argument());
}

#[test]
fn test_large_range_query() {
    let tree = new_tree();
    for i in 0..1000 {
        tree.insert(i, rid(i as u32, 0)).unwrap();
    }

    let hits = tree.range_query(&100, &900).unwrap();
    assert_eq!(hits.len(), 801);
    assert!(hits.windows(2).all(|w| w[0].key < w[1].key));
}

#[test]
fn test_scans_are_restartable() {
    let tree = new_tree();
    for i in 0..30 {
        tree.insert(i, rid(i as u32, 0)).unwrap();
    }

    let first = tree.all_entries().unwrap();
    let second = tree.all_entries().unwrap();
    assert_eq!(first, second);

    tree.delete(&0).unwrap();
    assert_eq!(tree.all_entries().unwrap().len(), 29);
}

#[test]
fn test_all_entries_empty() {
    let tree = new_tree();
    assert!(tree.all_entries().unwrap().is_empty());
}

// ============================================================================
// Clear, rebuild and size
// ============================================================================

#[test]
fn test_clear() {
    let tree = new_tree();
    tree.clear();
    assert!(tree.is_empty());

    for i in 1..=20 {
        tree.insert(i * 10, rid(i as u32, 0)).unwrap();
    }
    tree.clear();

    assert!(tree.is_empty());
    assert_eq!(tree.size(), 0);
    assert_eq!(tree.height(), 1);
    assert!(tree.search(&10).unwrap().is_none());

    tree.insert(20, rid(2, 200)).unwrap();
    assert_eq!(tree.size(), 1);
    assert!(tree.search(&20).unwrap().is_some());
    tree.validate().unwrap();
}

#[test]
fn test_rebuild_from_records() {
    let tree = new_tree();
    tree.insert(-1, rid(9, 9)).unwrap();

    let records = (0..100).map(|i| (i, rid(i as u32 / 10, (i % 10) as u16)));
    assert_eq!(tree.rebuild(records).unwrap(), 100);

    assert!(tree.search(&-1).unwrap().is_none());
    assert_eq!(tree.search(&37).unwrap(), Some(rid(3, 7)));
    tree.validate().unwrap();
}

#[test]
fn test_size_tracking() {
    let tree = new_tree();
    assert_eq!(tree.size(), 0);

    tree.insert(10, rid(1, 100)).unwrap();
    assert_eq!(tree.size(), 1);
    tree.insert(20, rid(2, 200)).unwrap();
    assert_eq!(tree.size(), 2);

    tree.delete(&10).unwrap();
    assert_eq!(tree.size(), 1);
    tree.delete(&20).unwrap();
    assert_eq!(tree.size(), 0);
    assert!(tree.is_empty());
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn test_single_key_operations() {
    let tree = new_tree();
    tree.insert(42, rid(1, 100)).unwrap();

    assert_eq!(tree.all_entries().unwrap().len(), 1);
    assert_eq!(tree.range_query(&42, &42).unwrap().len(), 1);

    tree.delete(&42).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_minimum_order_tree() {
    let tree: BPlusTree<i32, RecordId> = BPlusTree::new(3).unwrap();
    for i in 1..=100 {
        tree.insert(i, rid(i as u32, 0)).unwrap();
    }
    assert_eq!(tree.size(), 100);
    tree.validate().unwrap();

    for i in (1..=100).filter(|i| i % 7 != 0) {
        assert!(tree.delete(&i).unwrap());
        tree.validate().unwrap();
    }
    for i in 1..=100 {
        assert_eq!(tree.contains(&i).unwrap(), i % 7 == 0);
    }
}

#[test]
fn test_invalid_order() {
    for order in [0, 1, 2] {
        let err = BPlusTree::<i32, RecordId>::new(order).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}

#[test]
fn test_string_keys() {
    let tree: BPlusTree<String, RecordId> = BPlusTree::new(ORDER).unwrap();
    tree.insert("cherry".to_string(), rid(3, 300)).unwrap();
    tree.insert("apple".to_string(), rid(1, 100)).unwrap();
    tree.insert("banana".to_string(), rid(2, 200)).unwrap();

    assert_eq!(tree.search(&"banana".to_string()).unwrap(), Some(rid(2, 200)));
    assert_eq!(tree.size(), 3);

    let keys: Vec<String> = tree.all_entries().unwrap().into_iter().map(|e| e.key).collect();
    assert_eq!(keys, vec!["apple", "banana", "cherry"]);
}

#[test]
fn test_larger_orders_round_trip() {
    for order in [5, 8, 16, 64] {
        let tree: BPlusTree<u64, u64> = BPlusTree::new(order).unwrap();
        for i in (0..2000u64).map(|i| (i * 7919) % 2000) {
            tree.insert(i, i * 2).unwrap();
        }
        tree.validate().unwrap();
        for i in (0..2000u64).step_by(3) {
            assert!(tree.delete(&i).unwrap());
        }
        tree.validate().unwrap();
        for i in 0..2000u64 {
            let expected = if i % 3 == 0 { None } else { Some(i * 2) };
            assert_eq!(tree.search(&i).unwrap(), expected);
        }
    }
}
