//! Property-based tests for PersistentTree.
//!
//! These tests verify that PersistentTree satisfies the expected laws
//! and invariants using proptest.

use std::collections::{BTreeMap, HashSet};

use persistent_structures::persistent::{NaturalOrder, PersistentTree, ReferenceCounter, TreeNode};
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

/// Strategy for generating a PersistentTree from a vector of key-value pairs.
fn arbitrary_tree(max_size: usize) -> impl Strategy<Value = PersistentTree<i32, i32>> {
    prop::collection::vec((-100..100i32, any::<i32>()), 0..max_size)
        .prop_map(|entries| entries.into_iter().collect::<PersistentTree<i32, i32>>())
}

fn node_addresses(tree: &PersistentTree<i32, i32>) -> HashSet<usize> {
    let mut addresses = HashSet::new();
    let mut pending: Vec<&ReferenceCounter<TreeNode<i32, i32>>> = tree.root().into_iter().collect();
    while let Some(node) = pending.pop() {
        addresses.insert(ReferenceCounter::as_ptr(node) as usize);
        pending.extend(node.children().into_iter().map(|(_, child)| child));
    }
    addresses
}

fn depth_of(tree: &PersistentTree<i32, i32>, key: i32) -> usize {
    let mut depth = 0;
    let mut current = tree.root();
    while let Some(node) = current {
        depth += 1;
        current = match node.key().cmp(&key) {
            std::cmp::Ordering::Equal => return depth,
            std::cmp::Ordering::Less => node.right(),
            std::cmp::Ordering::Greater => node.left(),
        };
    }
    depth
}

// =============================================================================
// Model Laws
// =============================================================================

proptest! {
    /// Law: a tree built by inserts agrees with a BTreeMap built the same way.
    #[test]
    fn prop_matches_btreemap_model(
        entries in prop::collection::vec((-100..100i32, any::<i32>()), 0..60)
    ) {
        let tree: PersistentTree<i32, i32> = entries.iter().copied().collect();
        let model: BTreeMap<i32, i32> = entries.into_iter().collect();

        prop_assert_eq!(tree.len(), model.len());
        let tree_entries: Vec<(i32, i32)> = tree.iter().map(|(key, value)| (*key, *value)).collect();
        let model_entries: Vec<(i32, i32)> = model.into_iter().collect();
        prop_assert_eq!(tree_entries, model_entries);
    }

    /// Law: in-order keys are strictly increasing.
    #[test]
    fn prop_in_order_keys_are_sorted(tree in arbitrary_tree(60)) {
        let keys: Vec<i32> = tree.keys().copied().collect();
        prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(PersistentTree::try_from_root(NaturalOrder, tree.root().cloned()).is_ok());
    }
}

// =============================================================================
// Get-Insert Laws
// =============================================================================

proptest! {
    /// Law: get after insert returns the inserted value.
    #[test]
    fn prop_get_insert_law(tree in arbitrary_tree(40), key in -100..100i32, value: i32) {
        let updated = tree.insert(key, value);
        prop_assert_eq!(updated.get(&key), Some(&value));
    }

    /// Law: insert does not affect other keys.
    #[test]
    fn prop_get_insert_other_law(
        tree in arbitrary_tree(40),
        key1 in -100..100i32,
        key2 in -100..100i32,
        value: i32
    ) {
        prop_assume!(key1 != key2);
        let updated = tree.insert(key1, value);
        prop_assert_eq!(updated.get(&key2), tree.get(&key2));
    }

    /// Law: inserting allocates one node per level on the search path and
    /// shares every other node.
    #[test]
    fn prop_insert_copies_only_search_path(
        tree in arbitrary_tree(40),
        key in -100..100i32,
        value: i32
    ) {
        let updated = tree.insert(key, value);
        let before = node_addresses(&tree);
        let after = node_addresses(&updated);

        prop_assert_eq!(after.difference(&before).count(), depth_of(&updated, key));
        prop_assert_eq!(after.intersection(&before).count(), updated.len() - depth_of(&updated, key));
    }
}

// =============================================================================
// Remove Laws
// =============================================================================

proptest! {
    /// Law: get after remove returns None and other keys are untouched.
    #[test]
    fn prop_remove_law(tree in arbitrary_tree(40), key in -100..100i32, other in -100..100i32) {
        prop_assume!(key != other);
        let removed = tree.remove(&key);
        prop_assert_eq!(removed.get(&key), None);
        prop_assert_eq!(removed.get(&other), tree.get(&other));
        prop_assert!(PersistentTree::try_from_root(NaturalOrder, removed.root().cloned()).is_ok());
    }

    /// Law: insert then remove of a fresh key restores the size.
    #[test]
    fn prop_insert_remove_round_trip(tree in arbitrary_tree(40), key in -100..100i32, value: i32) {
        prop_assume!(!tree.contains_key(&key));
        let round_trip = tree.insert(key, value).remove(&key);
        prop_assert_eq!(round_trip.len(), tree.len());
        prop_assert_eq!(round_trip, tree);
    }

    /// Law: size counts exactly the removed entry.
    #[test]
    fn prop_remove_size(tree in arbitrary_tree(40), key in -100..100i32) {
        let removed = tree.remove(&key);
        let expected = if tree.contains_key(&key) { tree.len() - 1 } else { tree.len() };
        prop_assert_eq!(removed.len(), expected);
        prop_assert_eq!(removed.iter().count(), expected);
    }
}

// =============================================================================
// Persistence Laws
// =============================================================================

proptest! {
    /// Law: no operation changes the tree it was called on.
    #[test]
    fn prop_operations_preserve_receiver(
        tree in arbitrary_tree(40),
        key in -100..100i32,
        value: i32
    ) {
        let snapshot: Vec<(i32, i32)> = tree.iter().map(|(key, value)| (*key, *value)).collect();

        let _inserted = tree.insert(key, value);
        let _removed = tree.remove(&key);
        let _cloned = tree.clone();

        let after: Vec<(i32, i32)> = tree.iter().map(|(key, value)| (*key, *value)).collect();
        prop_assert_eq!(snapshot, after);
    }

    /// Law: min and max agree with the in-order traversal.
    #[test]
    fn prop_min_max(tree in arbitrary_tree(40)) {
        prop_assert_eq!(tree.min().map(|node| *node.key()), tree.keys().next().copied());
        prop_assert_eq!(tree.max().map(|node| *node.key()), tree.keys().last().copied());
    }
}
