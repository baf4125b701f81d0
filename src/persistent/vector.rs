//! Persistent (immutable) vector based on a Radix Balanced Tree.
//!
//! This module provides [`PersistentVector`], the immutable ordered sequence
//! backing [`PersistentHeap`](super::PersistentHeap), and
//! [`TransientVector`], its short-lived mutable counterpart.
//!
//! # Overview
//!
//! `PersistentVector` is a 32-way branching trie with a tail buffer:
//!
//! - O(log32 N) `get` and `update`
//! - O(log32 N) `push_back` and `pop_back` (amortized O(1) through the tail)
//! - O(1) `len` and `is_empty`
//!
//! Every operation copies only the path from the root to the touched leaf;
//! all other leaves and branches are shared with the source vector.
//!
//! # Transient batches
//!
//! A [`TransientVector`] performs a batch of writes in place and is frozen
//! back with [`TransientVector::persistent`]. A node is cloned the first time
//! the batch writes through it while it is still shared with a persistent
//! vector, so `k` writes copy at most `k` root-to-leaf paths and never touch
//! the vector the batch started from.
//!
//! # Examples
//!
//! ```rust
//! use persistent_structures::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (1..=3).collect();
//! let extended = vector.push_back(4);
//!
//! assert_eq!(vector.len(), 3);   // Original unchanged
//! assert_eq!(extended.len(), 4);
//!
//! let mut transient = extended.clone().transient();
//! transient.swap(0, 3).unwrap();
//! let swapped = transient.persistent();
//!
//! assert_eq!(swapped.get(0), Some(&4));
//! assert_eq!(extended.get(0), Some(&1)); // Still unchanged
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::rc::Rc;

use super::ReferenceCounter;
use crate::error::{PersistentError, PersistentResult};

const WIDTH: usize = 32;
const LEVEL_BITS: usize = 5;
const SLOT_MASK: usize = WIDTH - 1;

type Children<T> = [Option<ReferenceCounter<Node<T>>>; WIDTH];

/// A trie node: either 32 optional children or one full chunk of elements.
#[derive(Clone)]
enum Node<T> {
    Inner(ReferenceCounter<Children<T>>),
    Chunk(ReferenceCounter<[T]>),
}

impl<T> Node<T> {
    fn empty_branch() -> Self {
        Self::Inner(ReferenceCounter::new(std::array::from_fn(|_| None)))
    }
}

/// Returns the starting index of the tail buffer for a sequence of `count`.
#[inline]
const fn tail_offset(count: usize) -> usize {
    if count < WIDTH {
        0
    } else {
        ((count - 1) >> LEVEL_BITS) << LEVEL_BITS
    }
}

/// Finds the leaf holding `index` in the trie rooted at `root`.
fn leaf_in<T>(root: &ReferenceCounter<Node<T>>, shift: usize, index: usize) -> Option<&[T]> {
    let mut node = root;
    let mut level = shift;

    loop {
        match node.as_ref() {
            Node::Inner(children) => {
                node = children[(index >> level) & SLOT_MASK].as_ref()?;
                level = level.checked_sub(LEVEL_BITS)?;
            }
            Node::Chunk(elements) => return Some(elements.as_ref()),
        }
    }
}

/// Wraps `leaf` in single-child branches until it reaches `level`.
fn new_path<T>(level: usize, leaf: ReferenceCounter<Node<T>>) -> ReferenceCounter<Node<T>> {
    if level == 0 {
        leaf
    } else {
        let mut children: Children<T> = std::array::from_fn(|_| None);
        children[0] = Some(new_path(level - LEVEL_BITS, leaf));
        ReferenceCounter::new(Node::Inner(ReferenceCounter::new(children)))
    }
}

/// Path-copies `node`, hanging `leaf` at the slot for `offset`.
fn push_leaf<T>(
    node: &ReferenceCounter<Node<T>>,
    level: usize,
    offset: usize,
    leaf: ReferenceCounter<Node<T>>,
) -> ReferenceCounter<Node<T>> {
    let Node::Inner(children) = node.as_ref() else {
        return leaf;
    };

    let subindex = (offset >> level) & SLOT_MASK;
    let mut new_children = children.as_ref().clone();

    let child = if level == LEVEL_BITS {
        leaf
    } else {
        match &children[subindex] {
            Some(existing) => push_leaf(existing, level - LEVEL_BITS, offset, leaf),
            None => new_path(level - LEVEL_BITS, leaf),
        }
    };
    new_children[subindex] = Some(child);

    ReferenceCounter::new(Node::Inner(ReferenceCounter::new(new_children)))
}

/// Returns `true` when a leaf for `offset` no longer fits under a root at `shift`.
#[inline]
const fn root_overflows(offset: usize, shift: usize) -> bool {
    (offset >> shift) >= WIDTH
}

/// Builds a new root one level higher, holding `root` and the path to `leaf`.
fn grow_root<T>(
    root: ReferenceCounter<Node<T>>,
    shift: usize,
    leaf: ReferenceCounter<Node<T>>,
) -> ReferenceCounter<Node<T>> {
    let mut children: Children<T> = std::array::from_fn(|_| None);
    children[0] = Some(root);
    children[1] = Some(new_path(shift, leaf));
    ReferenceCounter::new(Node::Inner(ReferenceCounter::new(children)))
}

/// An immutable indexed sequence stored as a 32-way trie plus a tail chunk.
///
/// Element `i` lives in the tail when `i >= tail_offset(len)`, otherwise in
/// the trie leaf reached by consuming `i` five bits at a time from `shift`
/// down to zero. Reads and point writes walk at most `shift / 5 + 1` nodes.
///
/// ```rust
/// use persistent_structures::persistent::PersistentVector;
///
/// let squares: PersistentVector<u64> = (0..70).map(|n| n * n).collect();
/// assert_eq!(squares.len(), 70);
/// assert_eq!(squares.get(33), Some(&1089));
/// ```
pub struct PersistentVector<T> {
    count: usize,
    // Bit offset of the root level; 5 for a root whose children are chunks.
    shift: usize,
    root: ReferenceCounter<Node<T>>,
    // Trailing 1..=32 elements not yet pushed into the trie.
    tail: ReferenceCounter<[T]>,
}

impl<T> PersistentVector<T> {
    /// An empty vector with a single-level trie.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: 0,
            shift: LEVEL_BITS,
            root: ReferenceCounter::new(Node::empty_branch()),
            tail: ReferenceCounter::from(Vec::<T>::new()),
        }
    }

    /// A one-element vector; the element sits in the tail.
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentVector;
    ///
    /// let only = PersistentVector::singleton('x');
    /// assert_eq!((only.len(), only.last()), (1, Some(&'x')));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self {
            count: 1,
            shift: LEVEL_BITS,
            root: ReferenceCounter::new(Node::empty_branch()),
            tail: ReferenceCounter::from(vec![element]),
        }
    }

    /// Element count.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the leaf chunk (or the tail) holding `index`.
    fn chunk_for(&self, index: usize) -> Option<&[T]> {
        if index >= tail_offset(self.count) {
            Some(self.tail.as_ref())
        } else {
            leaf_in(&self.root, self.shift, index)
        }
    }

    /// Borrows element `index`, or `None` past the end.
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentVector;
    ///
    /// let letters: PersistentVector<char> = "heap".chars().collect();
    /// assert_eq!(letters.get(1), Some(&'e'));
    /// assert_eq!(letters.get(4), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }
        self.chunk_for(index)
            .and_then(|chunk| chunk.get(index & SLOT_MASK))
    }

    /// Same as `get(0)`.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// The final element, read straight from the tail.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            self.tail.last()
        }
    }

    /// Returns an iterator over references to the elements, front to back.
    ///
    /// The iterator resolves each 32-element chunk once, so a full pass is
    /// O(N).
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator {
            vector: self,
            chunk: &[],
            chunk_start: 0,
            index: 0,
        }
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Returns a copy with `element` appended.
    ///
    /// Only the tail is copied until it holds 32 elements; the 33rd push moves
    /// the full tail into the trie as a shared chunk.
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentVector;
    ///
    /// let base: PersistentVector<u8> = (0..32).collect();
    /// let spilled = base.push_back(200);
    /// assert_eq!(spilled.get(32), Some(&200));
    /// assert_eq!(base.len(), 32);
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        if self.tail.len() < WIDTH {
            let mut new_tail = Vec::with_capacity(self.tail.len() + 1);
            new_tail.extend_from_slice(&self.tail);
            new_tail.push(element);

            return Self {
                count: self.count + 1,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::from(new_tail),
            };
        }

        // The tail is full: it becomes a leaf of the trie, shared rather than copied.
        let tail_leaf = ReferenceCounter::new(Node::Chunk(self.tail.clone()));
        let offset = tail_offset(self.count);

        let (root, shift) = if root_overflows(offset, self.shift) {
            (
                grow_root(self.root.clone(), self.shift, tail_leaf),
                self.shift + LEVEL_BITS,
            )
        } else {
            (push_leaf(&self.root, self.shift, offset, tail_leaf), self.shift)
        };

        Self {
            count: self.count + 1,
            shift,
            root,
            tail: ReferenceCounter::from(vec![element]),
        }
    }

    /// Splits off the final element, or `None` when empty.
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentVector;
    ///
    /// let words: PersistentVector<&str> = ["min", "max"].into_iter().collect();
    /// let (shorter, popped) = words.pop_back().unwrap();
    /// assert_eq!((popped, shorter.len()), ("max", 1));
    /// ```
    #[must_use]
    pub fn pop_back(&self) -> Option<(Self, T)> {
        let element = self.last()?.clone();

        if self.count == 1 {
            return Some((Self::new(), element));
        }

        if self.tail.len() > 1 {
            let remaining = Self {
                count: self.count - 1,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::from(&self.tail[..self.tail.len() - 1]),
            };
            return Some((remaining, element));
        }

        // The tail empties: the rightmost leaf of the trie becomes the new tail.
        let remaining_count = self.count - 1;
        let last_index = remaining_count - 1;
        let new_tail = self.leaf_at(last_index)?;

        let mut root = Self::without_last_leaf(&self.root, self.shift, last_index)
            .unwrap_or_else(|| ReferenceCounter::new(Node::empty_branch()));
        let mut shift = self.shift;

        while shift > LEVEL_BITS {
            let only_child = match root.as_ref() {
                Node::Inner(children) if children[1].is_none() => children[0].clone(),
                _ => None,
            };
            match only_child {
                Some(child) => {
                    root = child;
                    shift -= LEVEL_BITS;
                }
                None => break,
            }
        }

        let remaining = Self {
            count: remaining_count,
            shift,
            root,
            tail: new_tail,
        };
        Some((remaining, element))
    }

    /// Returns the shared leaf holding `index`.
    fn leaf_at(&self, index: usize) -> Option<ReferenceCounter<[T]>> {
        let mut node = &self.root;
        let mut level = self.shift;

        loop {
            match node.as_ref() {
                Node::Inner(children) => {
                    node = children[(index >> level) & SLOT_MASK].as_ref()?;
                    level = level.checked_sub(LEVEL_BITS)?;
                }
                Node::Chunk(elements) => return Some(elements.clone()),
            }
        }
    }

    /// Path-copies `node` without its rightmost leaf; `None` when nothing remains.
    fn without_last_leaf(
        node: &ReferenceCounter<Node<T>>,
        level: usize,
        index: usize,
    ) -> Option<ReferenceCounter<Node<T>>> {
        let Node::Inner(children) = node.as_ref() else {
            return None;
        };

        let subindex = (index >> level) & SLOT_MASK;
        let replacement = match &children[subindex] {
            Some(child) if level > LEVEL_BITS => {
                Self::without_last_leaf(child, level - LEVEL_BITS, index)
            }
            _ => None,
        };

        if subindex == 0 && replacement.is_none() {
            return None;
        }

        let mut new_children = children.as_ref().clone();
        new_children[subindex] = replacement;
        Some(ReferenceCounter::new(Node::Inner(ReferenceCounter::new(
            new_children,
        ))))
    }

    /// Returns a copy with slot `index` replaced, or `None` past the end.
    ///
    /// The copy shares every chunk except the one holding `index`.
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentVector;
    ///
    /// let zeros: PersistentVector<i32> = std::iter::repeat(0).take(40).collect();
    /// let marked = zeros.update(7, -1).unwrap();
    /// assert_eq!((marked.get(7), zeros.get(7)), (Some(&-1), Some(&0)));
    /// ```
    #[must_use]
    pub fn update(&self, index: usize, element: T) -> Option<Self> {
        if index >= self.count {
            return None;
        }

        if index >= tail_offset(self.count) {
            let mut new_tail = self.tail.to_vec();
            new_tail[index & SLOT_MASK] = element;

            Some(Self {
                count: self.count,
                shift: self.shift,
                root: self.root.clone(),
                tail: ReferenceCounter::from(new_tail),
            })
        } else {
            Some(Self {
                count: self.count,
                shift: self.shift,
                root: Self::update_in_root(&self.root, self.shift, index, element),
                tail: self.tail.clone(),
            })
        }
    }

    fn update_in_root(
        node: &ReferenceCounter<Node<T>>,
        level: usize,
        index: usize,
        element: T,
    ) -> ReferenceCounter<Node<T>> {
        match node.as_ref() {
            Node::Inner(children) => {
                let subindex = (index >> level) & SLOT_MASK;
                let mut new_children = children.as_ref().clone();
                if let Some(child) = &children[subindex] {
                    new_children[subindex] = Some(Self::update_in_root(
                        child,
                        level.saturating_sub(LEVEL_BITS),
                        index,
                        element,
                    ));
                }
                ReferenceCounter::new(Node::Inner(ReferenceCounter::new(new_children)))
            }
            Node::Chunk(elements) => {
                let mut new_elements = elements.to_vec();
                if let Some(slot) = new_elements.get_mut(index & SLOT_MASK) {
                    *slot = element;
                }
                ReferenceCounter::new(Node::Chunk(ReferenceCounter::from(new_elements)))
            }
        }
    }

    /// Concatenation. The receiver's trie is reused and `other` is pushed
    /// through a single transient batch.
    #[must_use]
    pub fn append(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        let mut transient = self.clone().transient();
        for element in other {
            transient.push_back(element.clone());
        }
        transient.persistent()
    }

    /// Opens a mutable batch over this vector. Costs one tail copy.
    #[must_use]
    pub fn transient(self) -> TransientVector<T> {
        TransientVector {
            count: self.count,
            shift: self.shift,
            root: self.root,
            tail: self.tail.to_vec(),
            _marker: PhantomData,
        }
    }
}

/// Single-owner write handle over a [`PersistentVector`].
///
/// Each write clones a node only while some persistent vector still holds it;
/// nodes the batch has already copied are written in place. The handle never
/// leaves the thread that opened it.
///
/// ```rust
/// use persistent_structures::persistent::PersistentVector;
///
/// let before: PersistentVector<i32> = (0..64).collect();
/// let mut batch = before.clone().transient();
/// batch.swap(0, 63).unwrap();
/// batch.set(40, 0).unwrap();
/// let after = batch.persistent();
///
/// assert_eq!((after.get(0), after.get(40)), (Some(&63), Some(&0)));
/// assert_eq!(before.get(0), Some(&0));
/// ```
pub struct TransientVector<T> {
    count: usize,
    shift: usize,
    root: ReferenceCounter<Node<T>>,
    tail: Vec<T>,
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientVector<i32>: Send, Sync);

#[cfg(feature = "arc")]
mod arc_send_sync_verification_vector {
    use super::TransientVector;
    use std::sync::Arc;

    static_assertions::assert_not_impl_any!(TransientVector<Arc<i32>>: Send, Sync);
}

impl<T> TransientVector<T> {
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Reads element `index` through the batch's current nodes.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }
        let offset = tail_offset(self.count);
        if index >= offset {
            self.tail.get(index - offset)
        } else {
            leaf_in(&self.root, self.shift, index).and_then(|leaf| leaf.get(index & SLOT_MASK))
        }
    }

    const fn check_bounds(&self, index: usize) -> PersistentResult<()> {
        if index < self.count {
            Ok(())
        } else {
            Err(PersistentError::IndexOutOfBounds {
                index,
                length: self.count,
            })
        }
    }
}

impl<T: Clone> TransientVector<T> {
    /// Overwrites the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistentError::IndexOutOfBounds`] if `index >= len()`.
    pub fn set(&mut self, index: usize, element: T) -> PersistentResult<()> {
        self.check_bounds(index)?;

        let offset = tail_offset(self.count);
        if index >= offset {
            self.tail[index - offset] = element;
        } else {
            Self::set_in_node(&mut self.root, self.shift, index, element);
        }
        Ok(())
    }

    fn set_in_node(node: &mut ReferenceCounter<Node<T>>, level: usize, index: usize, element: T) {
        match ReferenceCounter::make_mut(node) {
            Node::Inner(children) => {
                let children = ReferenceCounter::make_mut(children);
                if let Some(child) = children[(index >> level) & SLOT_MASK].as_mut() {
                    Self::set_in_node(
                        child,
                        level.saturating_sub(LEVEL_BITS),
                        index,
                        element,
                    );
                }
            }
            Node::Chunk(elements) => {
                if let Some(slot) = ReferenceCounter::make_mut(elements).get_mut(index & SLOT_MASK) {
                    *slot = element;
                }
            }
        }
    }

    /// Exchanges the elements at `first` and `second`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistentError::IndexOutOfBounds`] if either index is out of
    /// bounds; the batch is left untouched in that case.
    pub fn swap(&mut self, first: usize, second: usize) -> PersistentResult<()> {
        self.check_bounds(first)?;
        self.check_bounds(second)?;
        if first == second {
            return Ok(());
        }

        let (Some(first_element), Some(second_element)) =
            (self.get(first).cloned(), self.get(second).cloned())
        else {
            return Err(PersistentError::IndexOutOfBounds {
                index: first.max(second),
                length: self.count,
            });
        };

        self.set(first, second_element)?;
        self.set(second, first_element)
    }

    /// Pushes in place; a full tail is hung into the trie first.
    pub fn push_back(&mut self, element: T) {
        if self.tail.len() == WIDTH {
            let full_tail = std::mem::replace(&mut self.tail, Vec::with_capacity(WIDTH));
            let leaf = ReferenceCounter::new(Node::Chunk(ReferenceCounter::from(full_tail)));
            let offset = tail_offset(self.count);

            if root_overflows(offset, self.shift) {
                self.root = grow_root(self.root.clone(), self.shift, leaf);
                self.shift += LEVEL_BITS;
            } else {
                Self::push_leaf_in_place(&mut self.root, self.shift, offset, leaf);
            }
        }

        self.tail.push(element);
        self.count += 1;
    }

    fn push_leaf_in_place(
        node: &mut ReferenceCounter<Node<T>>,
        level: usize,
        offset: usize,
        leaf: ReferenceCounter<Node<T>>,
    ) {
        let Node::Inner(children) = ReferenceCounter::make_mut(node) else {
            return;
        };
        let children = ReferenceCounter::make_mut(children);
        let subindex = (offset >> level) & SLOT_MASK;

        if level == LEVEL_BITS {
            children[subindex] = Some(leaf);
        } else if children[subindex].is_none() {
            children[subindex] = Some(new_path(level - LEVEL_BITS, leaf));
        } else if let Some(child) = children[subindex].as_mut() {
            Self::push_leaf_in_place(child, level - LEVEL_BITS, offset, leaf);
        }
    }

    /// Ends the batch. The tail buffer becomes the new vector's tail chunk.
    #[must_use]
    pub fn persistent(self) -> PersistentVector<T> {
        PersistentVector {
            count: self.count,
            shift: self.shift,
            root: self.root,
            tail: ReferenceCounter::from(self.tail),
        }
    }
}

/// Borrowing front-to-back iterator; caches the current 32-element chunk.
pub struct PersistentVectorIterator<'a, T> {
    vector: &'a PersistentVector<T>,
    chunk: &'a [T],
    chunk_start: usize,
    index: usize,
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.vector.count {
            return None;
        }

        if self.index - self.chunk_start >= self.chunk.len() {
            self.chunk = self.vector.chunk_for(self.index)?;
            self.chunk_start = self.index;
        }

        let element = self.chunk.get(self.index - self.chunk_start)?;
        self.index += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.count.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {}

/// Owning iterator. Chunks may be shared, so elements are cloned out.
pub struct PersistentVectorIntoIterator<T> {
    vector: PersistentVector<T>,
    index: usize,
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.vector.get(self.index)?.clone();
        self.index += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.count.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {}

impl<T> Clone for PersistentVector<T> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            shift: self.shift,
            root: self.root.clone(),
            tail: self.tail.clone(),
        }
    }
}

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = Self::new().transient();
        for element in iter {
            transient.push_back(element);
        }
        transient.persistent()
    }
}

impl<T: Clone> From<Vec<T>> for PersistentVector<T> {
    fn from(elements: Vec<T>) -> Self {
        elements.into_iter().collect()
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentVectorIntoIterator {
            vector: self,
            index: 0,
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.count.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        formatter.write_str("[")?;
        for element in self {
            write!(formatter, "{separator}{element}")?;
            separator = ", ";
        }
        formatter.write_str("]")
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for PersistentVector<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct PersistentVectorVisitor<T> {
    marker: PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for PersistentVectorVisitor<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    type Value = PersistentVector<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut transient = PersistentVector::new().transient();
        while let Some(element) = seq.next_element()? {
            transient.push_back(element);
        }
        Ok(transient.persistent())
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for PersistentVector<T>
where
    T: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PersistentVectorVisitor {
            marker: PhantomData,
        })
    }
}
