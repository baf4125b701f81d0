//! Persistent (immutable) binary search tree.
//!
//! This module provides [`PersistentTree`], an unbalanced binary search tree
//! whose every update is implemented by path copying.
//!
//! # Path copying
//!
//! A lookup descends from the root and records each `(side, node)` pair it
//! passes on an ancestor stack. An update then builds the modified node and
//! rewrites the recorded ancestors from the bottom up, each new ancestor
//! pointing at the node below it and sharing its other subtree with the
//! previous version. Inserting at depth `d` therefore allocates exactly
//! `d + 1` nodes, and every untouched subtree is shared by reference.
//!
//! No balancing is performed: the shape of the tree is determined by the
//! insertion order, and so is the cost of a lookup.
//!
//! # Examples
//!
//! ```rust
//! use persistent_structures::persistent::PersistentTree;
//!
//! let tree = PersistentTree::new()
//!     .insert(5, "a")
//!     .insert(3, "b")
//!     .insert(8, "c");
//!
//! let removed = tree.remove(&5);
//!
//! assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![3, 5, 8]); // Original unchanged
//! assert_eq!(removed.keys().copied().collect::<Vec<_>>(), vec![3, 8]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

use smallvec::SmallVec;
use tracing::trace;

use super::tree_node::{ChildCount, Link, Side, TreeNode};
use super::{Comparator, NaturalOrder, ReferenceCounter};
use crate::error::{PersistentError, PersistentResult};

/// Nodes passed on the way down, each tagged with the side that was taken.
type Ancestors<K, V> = SmallVec<[(Side, ReferenceCounter<TreeNode<K, V>>); 32]>;

// =============================================================================
// PersistentTree Definition
// =============================================================================

/// A persistent (immutable) binary search tree.
///
/// Keys are ordered by a [`Comparator`] fixed at construction and inherited by
/// every tree derived from this one.
///
/// # Time Complexity
///
/// With `h` the height of the tree (between log2 N and N, depending on the
/// insertion order):
///
/// | Operation        | Complexity |
/// |------------------|------------|
/// | `new`            | O(1)       |
/// | `find` / `get`   | O(h)       |
/// | `insert`         | O(h)       |
/// | `remove`         | O(h)       |
/// | `min` / `max`    | O(h)       |
/// | `contains`       | O(N)       |
/// | `len`            | O(1)       |
/// | `clone`          | O(1)       |
///
/// # Examples
///
/// ```rust
/// use persistent_structures::persistent::PersistentTree;
///
/// let tree = PersistentTree::new().insert_all([(5, "a"), (3, "b"), (8, "c"), (3, "z")]);
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.get(&3), Some(&"z"));
/// assert_eq!(tree.min().map(|node| *node.key()), Some(3));
/// assert_eq!(tree.max().map(|node| *node.key()), Some(8));
/// ```
pub struct PersistentTree<K, V, C = NaturalOrder> {
    root: Link<K, V>,
    count: usize,
    comparator: C,
}

impl<K, V> PersistentTree<K, V, NaturalOrder> {
    /// Creates a new empty tree ordered by [`Ord`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentTree;
    ///
    /// let tree: PersistentTree<i32, String> = PersistentTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C> PersistentTree<K, V, C> {
    /// Creates a new empty tree ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::{NaturalOrder, PersistentTree, Reversed};
    ///
    /// let tree = PersistentTree::with_comparator(Reversed(NaturalOrder))
    ///     .insert(1, ())
    ///     .insert(2, ());
    /// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![2, 1]);
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            count: 0,
            comparator,
        }
    }

    /// Wraps an existing root without copying it.
    ///
    /// The node count is recomputed by traversal. The caller is responsible
    /// for the ordering of the supplied nodes; see
    /// [`try_from_root`](Self::try_from_root) for a checked variant.
    #[must_use]
    pub fn from_root(comparator: C, root: Link<K, V>) -> Self {
        let count = count_nodes(root.as_ref());
        Self {
            root,
            count,
            comparator,
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns the number of entries; same as [`len`](Self::len).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.count
    }

    /// Returns `true` if the tree holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the comparator ordering this tree.
    #[inline]
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the root node, or `None` for the empty tree.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Option<&ReferenceCounter<TreeNode<K, V>>> {
        self.root.as_ref()
    }

    /// Returns the node with the least key.
    #[must_use]
    pub fn min(&self) -> Option<&TreeNode<K, V>> {
        self.extreme(Side::Left)
    }

    /// Returns the node with the greatest key.
    #[must_use]
    pub fn max(&self) -> Option<&TreeNode<K, V>> {
        self.extreme(Side::Right)
    }

    fn extreme(&self, side: Side) -> Option<&TreeNode<K, V>> {
        let mut current = self.root.as_ref()?;
        while let Some(next) = current.child(side) {
            current = next;
        }
        Some(&**current)
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    ///
    /// The empty tree has height 0.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&ReferenceCounter<TreeNode<K, V>>, usize)> =
            self.root.iter().map(|root| (root, 1)).collect();

        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.children().into_iter().map(|(_, child)| (child, depth + 1)));
        }
        deepest
    }

    /// Returns an in-order iterator over `(key, value)` pairs.
    ///
    /// The iterator is lazy: it holds one pending node per level of the tree.
    #[must_use]
    pub fn iter(&self) -> PersistentTreeIterator<'_, K, V> {
        let mut iterator = PersistentTreeIterator {
            pending: Vec::new(),
            remaining: self.count,
        };
        iterator.descend_left(self.root.as_ref());
        iterator
    }

    /// Returns an in-order iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values, in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Visits every entry in key order.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self {
            visitor(key, value);
        }
    }

    /// Returns `true` if some entry holds `value`.
    ///
    /// # Complexity
    ///
    /// O(N): values are not indexed.
    #[must_use]
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|candidate| candidate == value)
    }
}

impl<K, V, C: Comparator<K>> PersistentTree<K, V, C> {
    /// Wraps an existing root after checking the search-tree ordering.
    ///
    /// # Errors
    ///
    /// Returns [`PersistentError::OrderingViolation`] naming the first node
    /// (in pre-order, left first) whose key is not strictly between the keys
    /// of the ancestors bounding it, together with the ancestor it violates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::{NaturalOrder, PersistentTree, ReferenceCounter, Side, TreeNode};
    /// use persistent_structures::PersistentError;
    ///
    /// let misplaced = TreeNode::leaf(9, (), 2);
    /// let root = TreeNode::leaf(5, (), 1).with_child(Side::Left, Some(ReferenceCounter::new(misplaced)));
    ///
    /// let result = PersistentTree::try_from_root(NaturalOrder, Some(ReferenceCounter::new(root)));
    /// assert_eq!(
    ///     result.err(),
    ///     Some(PersistentError::OrderingViolation { parent_id: 1, child_id: 2, side: Side::Left })
    /// );
    /// ```
    pub fn try_from_root(comparator: C, root: Link<K, V>) -> PersistentResult<Self> {
        type Bound<'a, K, V> = Option<&'a ReferenceCounter<TreeNode<K, V>>>;

        let mut pending: Vec<(&ReferenceCounter<TreeNode<K, V>>, Bound<'_, K, V>, Bound<'_, K, V>)> =
            root.iter().map(|node| (node, None, None)).collect();

        while let Some((node, lower, upper)) = pending.pop() {
            if let Some(lower) = lower
                && comparator.compare(lower.key(), node.key()) != Ordering::Less
            {
                return Err(PersistentError::OrderingViolation {
                    parent_id: lower.id(),
                    child_id: node.id(),
                    side: Side::Right,
                });
            }
            if let Some(upper) = upper
                && comparator.compare(node.key(), upper.key()) != Ordering::Less
            {
                return Err(PersistentError::OrderingViolation {
                    parent_id: upper.id(),
                    child_id: node.id(),
                    side: Side::Left,
                });
            }

            if let Some(right) = node.right() {
                pending.push((right, Some(node), upper));
            }
            if let Some(left) = node.left() {
                pending.push((left, lower, Some(node)));
            }
        }

        Ok(Self::from_root(comparator, root))
    }

    /// Walks from the root towards `key`, calling `visit` with every node
    /// passed on the way and the side taken from it. Returns the node holding
    /// `key`, if any.
    fn descend<'a, F>(
        &'a self,
        key: &K,
        mut visit: F,
    ) -> Option<&'a ReferenceCounter<TreeNode<K, V>>>
    where
        F: FnMut(Side, &'a ReferenceCounter<TreeNode<K, V>>),
    {
        let mut current = self.root.as_ref()?;
        loop {
            let side = match self.comparator.compare(current.key(), key) {
                Ordering::Equal => return Some(current),
                Ordering::Less => Side::Right,
                Ordering::Greater => Side::Left,
            };
            visit(side, current);
            current = current.child(side)?;
        }
    }

    /// Returns the node holding `key` (if any) and every node passed on the
    /// way, each tagged with the side the descent took from it.
    fn recursive_search(&self, key: &K) -> (Link<K, V>, Ancestors<K, V>) {
        let mut ancestors = Ancestors::new();
        let found = self.descend(key, |side, node| ancestors.push((side, node.clone())));
        (found.cloned(), ancestors)
    }

    /// Returns the node holding `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentTree;
    ///
    /// let tree = PersistentTree::new().insert("k", 1);
    /// assert_eq!(tree.find(&"k").map(|node| *node.value()), Some(1));
    /// assert!(tree.find(&"missing").is_none());
    /// ```
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&TreeNode<K, V>> {
        self.descend(key, |_, _| {}).map(|node| &**node)
    }

    /// Returns the value stored under `key`.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(TreeNode::value)
    }

    /// Returns `true` if an entry is stored under `key`.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }
}

impl<K: Clone, V: Clone, C: Comparator<K> + Clone> PersistentTree<K, V, C> {
    /// Returns a tree with `value` stored under `key`.
    ///
    /// An existing entry keeps its position and id and only has its value
    /// replaced. A new entry becomes a leaf with id `len() + 1`.
    ///
    /// # Complexity
    ///
    /// O(h), allocating one node per ancestor plus the new or updated node
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentTree;
    ///
    /// let tree = PersistentTree::new().insert(1, "one");
    /// let updated = tree.insert(1, "uno");
    ///
    /// assert_eq!(tree.get(&1), Some(&"one")); // Original unchanged
    /// assert_eq!(updated.get(&1), Some(&"uno"));
    /// assert_eq!(updated.len(), 1);
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let (found, ancestors) = self.recursive_search(&key);

        let (leaf, count) = match found {
            Some(existing) => (existing.with_value(value), self.count),
            None => (TreeNode::leaf(key, value, self.count + 1), self.count + 1),
        };

        Self {
            root: construct_from_leaf(Some(ReferenceCounter::new(leaf)), ancestors),
            count,
            comparator: self.comparator.clone(),
        }
    }

    /// Inserts every pair in order; later duplicates overwrite earlier values.
    #[must_use]
    pub fn insert_all<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        entries
            .into_iter()
            .fold(self.clone(), |tree, (key, value)| tree.insert(key, value))
    }

    /// Returns a tree without the entry stored under `key`.
    ///
    /// Removing a missing key returns a tree sharing this tree's root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentTree;
    ///
    /// let tree = PersistentTree::new().insert_all([(5, 'a'), (3, 'b'), (8, 'c')]);
    /// let removed = tree.remove(&5);
    ///
    /// assert_eq!(removed.root().map(|node| *node.key()), Some(3));
    /// assert_eq!(removed.len(), 2);
    /// assert_eq!(tree.len(), 3);
    /// ```
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        let (Some(found), ancestors) = self.recursive_search(key) else {
            return self.clone();
        };

        Self {
            root: remove_node(&found, ancestors),
            count: self.count - 1,
            comparator: self.comparator.clone(),
        }
    }
}

// =============================================================================
// Path Copying
// =============================================================================

/// Rebuilds the recorded ancestors bottom-up around a replacement subtree.
///
/// Returns the new root.
fn construct_from_leaf<K: Clone, V: Clone>(
    leaf: Link<K, V>,
    ancestors: Ancestors<K, V>,
) -> Link<K, V> {
    ancestors
        .into_iter()
        .rev()
        .fold(leaf, |child, (side, ancestor)| {
            Some(ReferenceCounter::new(ancestor.with_child(side, child)))
        })
}

/// Unlinks `node` from the path described by `ancestors`; returns the new root.
fn remove_node<K: Clone, V: Clone>(
    node: &ReferenceCounter<TreeNode<K, V>>,
    mut ancestors: Ancestors<K, V>,
) -> Link<K, V> {
    match node.child_count() {
        ChildCount::NoChildren => {
            trace!(id = node.id(), depth = ancestors.len(), "removing leaf node");
            construct_from_leaf(None, ancestors)
        }
        ChildCount::OneChild(side, child) => {
            trace!(id = node.id(), %side, "splicing sole child into parent");
            construct_from_leaf(Some(child.clone()), ancestors)
        }
        ChildCount::TwoChildren(left, _) => {
            let (predecessor, walk) = find_in_order_predecessor(left);
            trace!(
                id = node.id(),
                predecessor_id = predecessor.id(),
                "removing node with two children through its in-order predecessor"
            );

            // The predecessor's entry moves up; the removed entry moves down
            // into the predecessor's slot, which has no right child.
            let replacement = node.with_entry(
                predecessor.key().clone(),
                predecessor.value().clone(),
                predecessor.id(),
            );
            let displaced = ReferenceCounter::new(predecessor.with_entry(
                node.key().clone(),
                node.value().clone(),
                node.id(),
            ));

            ancestors.push((Side::Left, ReferenceCounter::new(replacement)));
            ancestors.extend(walk);
            remove_node(&displaced, ancestors)
        }
    }
}

/// Returns the rightmost node of `subtree` and the right-walk leading to it.
fn find_in_order_predecessor<K, V>(
    subtree: &ReferenceCounter<TreeNode<K, V>>,
) -> (ReferenceCounter<TreeNode<K, V>>, Ancestors<K, V>) {
    let mut walk = Ancestors::new();
    let mut current = subtree.clone();

    loop {
        let Some(next) = current.right().cloned() else {
            return (current, walk);
        };
        walk.push((Side::Right, current));
        current = next;
    }
}

fn count_nodes<K, V>(root: Option<&ReferenceCounter<TreeNode<K, V>>>) -> usize {
    let mut count = 0;
    let mut pending: Vec<&ReferenceCounter<TreeNode<K, V>>> = root.into_iter().collect();

    while let Some(node) = pending.pop() {
        count += 1;
        pending.extend(node.children().into_iter().map(|(_, child)| child));
    }
    count
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An in-order iterator over entries of a [`PersistentTree`].
pub struct PersistentTreeIterator<'a, K, V> {
    pending: Vec<&'a ReferenceCounter<TreeNode<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> PersistentTreeIterator<'a, K, V> {
    fn descend_left(&mut self, mut node: Option<&'a ReferenceCounter<TreeNode<K, V>>>) {
        while let Some(current) = node {
            self.pending.push(current);
            node = current.left();
        }
    }
}

impl<'a, K, V> Iterator for PersistentTreeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        self.descend_left(node.right());
        self.remaining = self.remaining.saturating_sub(1);
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentTreeIterator<'_, K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, C: Clone> Clone for PersistentTree<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            count: self.count,
            comparator: self.comparator.clone(),
        }
    }
}

impl<K, V, C: Default> Default for PersistentTree<K, V, C> {
    #[inline]
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for PersistentTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new().insert_all(iter)
    }
}

impl<'a, K, V, C> IntoIterator for &'a PersistentTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentTreeIterator<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for PersistentTree<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for PersistentTree<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for PersistentTree<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display, C> fmt::Display for PersistentTree<K, V, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, C> serde::Serialize for PersistentTree<K, V, C>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentTreeVisitor<K, V, C> {
    marker: std::marker::PhantomData<fn() -> PersistentTree<K, V, C>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::de::Visitor<'de> for PersistentTreeVisitor<K, V, C>
where
    K: serde::Deserialize<'de> + Clone,
    V: serde::Deserialize<'de> + Clone,
    C: Comparator<K> + Clone + Default,
{
    type Value = PersistentTree<K, V, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut tree = PersistentTree::default();
        while let Some((key, value)) = access.next_entry()? {
            tree = tree.insert(key, value);
        }
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::Deserialize<'de> for PersistentTree<K, V, C>
where
    K: serde::Deserialize<'de> + Clone,
    V: serde::Deserialize<'de> + Clone,
    C: Comparator<K> + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(PersistentTreeVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
