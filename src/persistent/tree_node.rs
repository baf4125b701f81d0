//! Immutable binary search tree node.
//!
//! A [`TreeNode`] never changes after construction. "Setting" a field
//! produces a new node that shares every other field (and both subtrees)
//! with the original, which is what lets [`PersistentTree`](super::PersistentTree)
//! rebuild only the path it touched.

use std::fmt;

use arrayvec::ArrayVec;

use super::ReferenceCounter;

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left child slot, holding keys ordered before the node's key.
    Left,
    /// The right child slot, holding keys ordered after the node's key.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => formatter.write_str("left"),
            Self::Right => formatter.write_str("right"),
        }
    }
}

/// Shared link to a child node.
pub type Link<K, V> = Option<ReferenceCounter<TreeNode<K, V>>>;

/// The present children of a node, tagged by how many there are.
#[derive(Debug)]
pub enum ChildCount<'a, K, V> {
    /// The node is a leaf.
    NoChildren,
    /// The node has exactly one child, on the given side.
    OneChild(Side, &'a ReferenceCounter<TreeNode<K, V>>),
    /// The node has both children, left then right.
    TwoChildren(
        &'a ReferenceCounter<TreeNode<K, V>>,
        &'a ReferenceCounter<TreeNode<K, V>>,
    ),
}

/// An immutable node of a persistent binary search tree.
///
/// `id` is assigned when the logical element is first inserted and is carried
/// over by every copy of that element, so two nodes from different tree
/// versions with equal ids represent the same element.
///
/// # Examples
///
/// ```rust
/// use persistent_structures::persistent::{ReferenceCounter, Side, TreeNode};
///
/// let child = TreeNode::leaf(1, "one", 2);
/// let root = TreeNode::leaf(5, "five", 1)
///     .with_child(Side::Left, Some(ReferenceCounter::new(child)));
///
/// assert_eq!(root.left().map(|node| *node.key()), Some(1));
/// assert!(!root.is_leaf());
/// ```
pub struct TreeNode<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    id: usize,
}

impl<K, V> TreeNode<K, V> {
    /// Creates a node from all of its fields.
    #[inline]
    #[must_use]
    pub const fn new(key: K, value: V, left: Link<K, V>, right: Link<K, V>, id: usize) -> Self {
        Self {
            key,
            value,
            left,
            right,
            id,
        }
    }

    /// Creates a node without children.
    #[inline]
    #[must_use]
    pub const fn leaf(key: K, value: V, id: usize) -> Self {
        Self::new(key, value, None, None, id)
    }

    /// Returns the key.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns the value.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Returns the insertion id of the logical element.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Returns the left child.
    #[inline]
    #[must_use]
    pub const fn left(&self) -> Option<&ReferenceCounter<Self>> {
        self.left.as_ref()
    }

    /// Returns the right child.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> Option<&ReferenceCounter<Self>> {
        self.right.as_ref()
    }

    /// Returns the child on `side`.
    #[inline]
    #[must_use]
    pub const fn child(&self, side: Side) -> Option<&ReferenceCounter<Self>> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    /// Returns the present children tagged by side, left first.
    #[must_use]
    pub fn children(&self) -> ArrayVec<(Side, &ReferenceCounter<Self>), 2> {
        let mut children = ArrayVec::new();
        if let Some(left) = &self.left {
            children.push((Side::Left, left));
        }
        if let Some(right) = &self.right {
            children.push((Side::Right, right));
        }
        children
    }

    /// Classifies the node by its present children.
    #[must_use]
    pub const fn child_count(&self) -> ChildCount<'_, K, V> {
        match (&self.left, &self.right) {
            (None, None) => ChildCount::NoChildren,
            (Some(left), None) => ChildCount::OneChild(Side::Left, left),
            (None, Some(right)) => ChildCount::OneChild(Side::Right, right),
            (Some(left), Some(right)) => ChildCount::TwoChildren(left, right),
        }
    }

    /// Returns `true` if the node has no children.
    #[inline]
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl<K: Clone, V: Clone> TreeNode<K, V> {
    /// Returns a copy with the child on `side` replaced.
    ///
    /// The other child is shared, not copied.
    #[must_use]
    pub fn with_child(&self, side: Side, child: Link<K, V>) -> Self {
        let (left, right) = match side {
            Side::Left => (child, self.right.clone()),
            Side::Right => (self.left.clone(), child),
        };
        Self::new(self.key.clone(), self.value.clone(), left, right, self.id)
    }

    /// Returns a copy carrying `value`.
    #[must_use]
    pub fn with_value(&self, value: V) -> Self {
        Self::new(
            self.key.clone(),
            value,
            self.left.clone(),
            self.right.clone(),
            self.id,
        )
    }

    /// Returns a copy holding another element in the same position.
    #[must_use]
    pub fn with_entry(&self, key: K, value: V, id: usize) -> Self {
        Self::new(key, value, self.left.clone(), self.right.clone(), id)
    }
}

impl<K: Clone, V: Clone> Clone for TreeNode<K, V> {
    fn clone(&self) -> Self {
        self.with_value(self.value.clone())
    }
}

// Shows children by key only, so formatting a deep chain stays shallow.
impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TreeNode<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TreeNode")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("id", &self.id)
            .field("left", &self.left.as_ref().map(|node| &node.key))
            .field("right", &self.right.as_ref().map(|node| &node.key))
            .finish()
    }
}

// Structural equality over both subtrees, walked with an explicit stack.
impl<K: PartialEq, V: PartialEq> PartialEq for TreeNode<K, V> {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&Self, &Self)> = vec![(self, other)];

        while let Some((first, second)) = pending.pop() {
            if first.id != second.id || first.key != second.key || first.value != second.value {
                return false;
            }
            for side in [Side::Left, Side::Right] {
                match (first.child(side), second.child(side)) {
                    (None, None) => {}
                    (Some(first_child), Some(second_child)) => {
                        pending.push((&**first_child, &**second_child));
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}

impl<K: Eq, V: Eq> Eq for TreeNode<K, V> {}

// Unbalanced trees can degenerate into long chains; release them iteratively.
impl<K, V> Drop for TreeNode<K, V> {
    fn drop(&mut self) {
        let mut pending: Vec<ReferenceCounter<Self>> = Vec::new();
        pending.extend(self.left.take());
        pending.extend(self.right.take());

        while let Some(link) = pending.pop() {
            if let Some(mut node) = ReferenceCounter::into_inner(link) {
                pending.extend(node.left.take());
                pending.extend(node.right.take());
            }
        }
    }
}
