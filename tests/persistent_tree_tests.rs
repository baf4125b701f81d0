//! Integration tests for PersistentTree.

use persistent_structures::PersistentError;
use persistent_structures::persistent::{
    ChildCount, NaturalOrder, PersistentTree, ReferenceCounter, Reversed, Side, TreeNode,
};
use rstest::{fixture, rstest};

#[fixture]
fn letters() -> PersistentTree<i32, &'static str> {
    PersistentTree::new().insert_all([(5, "a"), (3, "b"), (8, "c"), (3, "z")])
}

fn keys_of<V, C>(tree: &PersistentTree<i32, V, C>) -> Vec<i32> {
    tree.keys().copied().collect()
}

// =============================================================================
// Insert Tests
// =============================================================================

#[rstest]
fn test_insert_all_scenario(letters: PersistentTree<i32, &'static str>) {
    assert_eq!(letters.size(), 3);
    assert_eq!(letters.get(&3), Some(&"z"));
    assert_eq!(letters.min().map(|node| *node.key()), Some(3));
    assert_eq!(letters.max().map(|node| *node.key()), Some(8));
    assert_eq!(keys_of(&letters), vec![3, 5, 8]);
    assert_eq!(letters.values().copied().collect::<Vec<_>>(), vec!["z", "a", "c"]);
}

#[rstest]
fn test_insert_into_empty_tree_creates_root() {
    let tree = PersistentTree::new().insert("root", 1);
    let root = tree.root().unwrap();
    assert_eq!(*root.key(), "root");
    assert_eq!(root.id(), 1);
    assert!(root.is_leaf());
}

#[rstest]
fn test_insert_preserves_every_prior_version() {
    let versions: Vec<PersistentTree<i32, i32>> = (0..10)
        .scan(PersistentTree::new(), |tree, key| {
            *tree = tree.insert(key * 7 % 10, key);
            Some(tree.clone())
        })
        .collect();

    for (index, version) in versions.iter().enumerate() {
        assert_eq!(version.len(), index + 1);
    }
}

#[rstest]
fn test_sorted_insertion_degenerates_into_chain() {
    let tree: PersistentTree<i32, ()> = (0..50).map(|key| (key, ())).collect();
    assert_eq!(tree.height(), 50);
    assert_eq!(keys_of(&tree), (0..50).collect::<Vec<_>>());
}

#[rstest]
fn test_insert_round_trip_restores_size(letters: PersistentTree<i32, &'static str>) {
    let inserted = letters.insert(4, "d");
    let key = *inserted.find(&4).unwrap().key();
    let removed = inserted.remove(&key);

    assert_eq!(removed.size(), letters.size());
    assert_eq!(keys_of(&removed), keys_of(&letters));
}

// =============================================================================
// Remove Tests
// =============================================================================

#[rstest]
fn test_remove_scenario(letters: PersistentTree<i32, &'static str>) {
    let removed = letters.remove(&5);

    assert_eq!(removed.size(), 2);
    assert_eq!(removed.root().map(|node| *node.key()), Some(3));
    assert_eq!(keys_of(&removed), vec![3, 8]);
    assert_eq!(keys_of(&letters), vec![3, 5, 8]);
}

#[rstest]
#[case(&[50, 30, 70, 20, 40, 60, 80], 50)]
#[case(&[50, 30, 70, 20, 40, 60, 80], 30)]
#[case(&[50, 30, 70, 20, 40, 60, 80], 80)]
#[case(&[50, 30, 70, 20, 40, 35, 45, 42], 50)]
#[case(&[10, 5, 3], 10)]
#[case(&[10, 15, 20], 10)]
fn test_remove_keeps_order(#[case] inserted: &[i32], #[case] removed_key: i32) {
    let tree: PersistentTree<i32, i32> = inserted.iter().map(|key| (*key, *key * 2)).collect();
    let removed = tree.remove(&removed_key);

    let mut expected: Vec<i32> = inserted.to_vec();
    expected.sort_unstable();
    expected.retain(|key| *key != removed_key);

    assert_eq!(keys_of(&removed), expected);
    assert_eq!(removed.len(), inserted.len() - 1);
    assert!(removed.values().zip(removed.keys()).all(|(value, key)| *value == key * 2));
    assert!(PersistentTree::try_from_root(NaturalOrder, removed.root().cloned()).is_ok());
}

#[rstest]
fn test_remove_everything_in_insertion_order() {
    let inserted = [50, 30, 70, 20, 40, 60, 80, 35, 45];
    let mut tree: PersistentTree<i32, ()> = inserted.iter().map(|key| (*key, ())).collect();

    for key in inserted {
        tree = tree.remove(&key);
        assert!(!tree.contains_key(&key));
    }
    assert!(tree.is_empty());
    assert!(tree.root().is_none());
}

#[rstest]
fn test_remove_carries_node_ids() {
    let tree: PersistentTree<i32, ()> = [50, 30, 70, 40].into_iter().map(|key| (key, ())).collect();
    let forty_id = tree.find(&40).unwrap().id();

    let removed = tree.remove(&50);
    let root = removed.root().unwrap();
    assert_eq!(*root.key(), 40);
    assert_eq!(root.id(), forty_id);
}

#[rstest]
fn test_remove_missing_key_is_noop(letters: PersistentTree<i32, &'static str>) {
    let unchanged = letters.remove(&100);
    assert_eq!(unchanged, letters);

    let empty: PersistentTree<i32, i32> = PersistentTree::new();
    let still_empty = empty.remove(&1);
    assert!(still_empty.is_empty());
}

// =============================================================================
// Query Tests
// =============================================================================

#[rstest]
fn test_find_returns_node(letters: PersistentTree<i32, &'static str>) {
    let node = letters.find(&8).unwrap();
    assert_eq!((*node.key(), *node.value()), (8, "c"));
    assert!(letters.find(&4).is_none());
    assert!(letters.get(&4).is_none());
}

#[rstest]
fn test_contains_is_by_value(letters: PersistentTree<i32, &'static str>) {
    assert!(letters.contains(&"a"));
    assert!(!letters.contains(&"q"));
    assert!(letters.contains_key(&5));
}

#[rstest]
fn test_children_view_of_root(letters: PersistentTree<i32, &'static str>) {
    let root = letters.root().unwrap();
    let sides: Vec<Side> = root.children().iter().map(|(side, _)| *side).collect();
    assert_eq!(sides, vec![Side::Left, Side::Right]);
    assert!(matches!(root.child_count(), ChildCount::TwoChildren(_, _)));
}

#[rstest]
fn test_reversed_comparator() {
    let tree = PersistentTree::with_comparator(Reversed(NaturalOrder))
        .insert_all([(1, 'a'), (3, 'c'), (2, 'b')]);

    assert_eq!(keys_of(&tree), vec![3, 2, 1]);
    assert_eq!(tree.min().map(|node| *node.key()), Some(3));
    assert_eq!(tree.max().map(|node| *node.key()), Some(1));
    assert_eq!(keys_of(&tree.remove(&3)), vec![2, 1]);
}

#[rstest]
fn test_clone_is_distinct_but_shares_root(letters: PersistentTree<i32, &'static str>) {
    let cloned = letters.clone();
    assert_eq!(keys_of(&cloned), keys_of(&letters));
    assert!(ReferenceCounter::ptr_eq(
        cloned.root().unwrap(),
        letters.root().unwrap()
    ));
}

// =============================================================================
// Construction Tests
// =============================================================================

#[rstest]
fn test_from_root_counts_nodes() {
    let left = ReferenceCounter::new(TreeNode::leaf(1, "one", 2));
    let right = ReferenceCounter::new(TreeNode::leaf(9, "nine", 3));
    let root = TreeNode::new(5, "five", Some(left), Some(right), 1);

    let tree = PersistentTree::from_root(NaturalOrder, Some(ReferenceCounter::new(root)));
    assert_eq!(tree.len(), 3);
    assert_eq!(keys_of(&tree), vec![1, 5, 9]);
    assert_eq!(tree.insert(7, "seven").find(&7).map(TreeNode::id), Some(4));
}

#[rstest]
fn test_try_from_root_rejects_equal_child_key() {
    let duplicate = ReferenceCounter::new(TreeNode::leaf(5, "again", 2));
    let root = TreeNode::leaf(5, "five", 1).with_child(Side::Right, Some(duplicate));

    let result = PersistentTree::try_from_root(NaturalOrder, Some(ReferenceCounter::new(root)));
    assert_eq!(
        result.err(),
        Some(PersistentError::OrderingViolation {
            parent_id: 1,
            child_id: 2,
            side: Side::Right,
        })
    );
}

#[rstest]
fn test_try_from_root_accepts_empty() {
    let tree: PersistentTree<i32, i32> =
        PersistentTree::try_from_root(NaturalOrder, None).unwrap();
    assert!(tree.is_empty());
}

// =============================================================================
// Trait Tests
// =============================================================================

#[rstest]
fn test_display(letters: PersistentTree<i32, &'static str>) {
    assert_eq!(format!("{letters}"), "{3: z, 5: a, 8: c}");
    let empty: PersistentTree<i32, i32> = PersistentTree::default();
    assert_eq!(format!("{empty}"), "{}");
}

#[rstest]
fn test_equality_ignores_shape() {
    let balanced: PersistentTree<i32, ()> = [2, 1, 3].into_iter().map(|key| (key, ())).collect();
    let chain: PersistentTree<i32, ()> = [1, 2, 3].into_iter().map(|key| (key, ())).collect();
    assert_ne!(balanced.height(), chain.height());
    assert_eq!(balanced, chain);
}

#[rstest]
fn test_for_each_and_iter_agree(letters: PersistentTree<i32, &'static str>) {
    let mut visited = Vec::new();
    letters.for_each(|key, value| visited.push((*key, *value)));
    let iterated: Vec<(i32, &str)> = (&letters).into_iter().map(|(key, value)| (*key, *value)).collect();
    assert_eq!(visited, iterated);
}
