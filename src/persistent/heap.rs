//! Persistent (immutable) binary heap.
//!
//! This module provides [`PersistentHeap`], a min- or max-heap stored as an
//! implicit complete binary tree inside a [`PersistentVector`]: the children
//! of index `i` live at `2i + 1` and `2i + 2`.
//!
//! Every operation opens a [`TransientVector`](super::TransientVector) over
//! the current storage, sifts inside it and freezes the result, so a push or
//! pop copies only the trie paths of the positions it actually moved.
//!
//! # Examples
//!
//! ```rust
//! use persistent_structures::persistent::{HeapOrder, NaturalOrder, PersistentHeap};
//!
//! let heap = PersistentHeap::from_values([5, 3, 8, 1, 9, 2], HeapOrder::Min, NaturalOrder);
//! assert_eq!(heap.peek(), Some(&1));
//!
//! let popped = heap.pop();
//! assert_eq!(popped.peek(), Some(&2));
//! assert_eq!(heap.peek(), Some(&1)); // Original unchanged
//!
//! let sorted: Vec<i32> = heap.heap_sort().into_iter().collect();
//! assert_eq!(sorted, vec![1, 2, 3, 5, 8, 9]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

use tracing::trace;

use super::vector::{PersistentVector, PersistentVectorIterator, TransientVector};
use super::{Comparator, NaturalOrder};
use crate::error::{PersistentError, PersistentResult};

// =============================================================================
// Heap Order
// =============================================================================

/// Which end of the order a heap keeps at its root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HeapOrder {
    /// The least element is at the root.
    #[default]
    Min,
    /// The greatest element is at the root.
    Max,
}

impl HeapOrder {
    /// Returns `true` for [`HeapOrder::Max`].
    #[inline]
    #[must_use]
    pub const fn is_max(self) -> bool {
        matches!(self, Self::Max)
    }

    /// Returns `true` if a parent comparing to its child as `ordering` may
    /// stay above it. Equal elements always may.
    #[inline]
    const fn admits(self, ordering: Ordering) -> bool {
        match self {
            Self::Min => !matches!(ordering, Ordering::Greater),
            Self::Max => !matches!(ordering, Ordering::Less),
        }
    }
}

// =============================================================================
// Index Arithmetic
// =============================================================================

/// Returns the index of the parent of `child`, or `None` for the root.
///
/// # Examples
///
/// ```rust
/// use persistent_structures::persistent::parent_index;
///
/// assert_eq!(parent_index(0), None);
/// assert_eq!(parent_index(1), Some(0));
/// assert_eq!(parent_index(2), Some(0));
/// assert_eq!(parent_index(5), Some(2));
/// ```
#[inline]
#[must_use]
pub const fn parent_index(child: usize) -> Option<usize> {
    if child == 0 {
        None
    } else if child % 2 == 0 {
        Some(child / 2 - 1)
    } else {
        Some(child / 2)
    }
}

/// Returns the indices of the left and right children of `parent` in a heap
/// of `length` elements; a child outside the heap is `None`.
#[inline]
#[must_use]
pub const fn child_indices(parent: usize, length: usize) -> (Option<usize>, Option<usize>) {
    let left = 2 * parent + 1;
    let right = 2 * parent + 2;
    (
        if left < length { Some(left) } else { None },
        if right < length { Some(right) } else { None },
    )
}

/// Returns `true` if `parent` may sit above `child`; an absent child always passes.
fn integrity_check<T, C: Comparator<T>>(
    order: HeapOrder,
    comparator: &C,
    parent: Option<&T>,
    child: Option<&T>,
) -> bool {
    match (parent, child) {
        (Some(parent), Some(child)) => order.admits(comparator.compare(parent, child)),
        _ => true,
    }
}

fn sift_up<T: Clone, C: Comparator<T>>(
    storage: &mut TransientVector<T>,
    mut child: usize,
    order: HeapOrder,
    comparator: &C,
) {
    while let Some(parent) = parent_index(child) {
        if integrity_check(order, comparator, storage.get(parent), storage.get(child)) {
            break;
        }
        let swapped = storage.swap(parent, child);
        debug_assert!(swapped.is_ok(), "parent of an in-bounds slot is in bounds");
        child = parent;
    }
}

/// Moves the element at `index` down until both children admit it.
///
/// When both children outrank it, the one the comparator prefers is
/// promoted; on a tie the left child wins.
fn sift_down<T: Clone, C: Comparator<T>>(
    storage: &mut TransientVector<T>,
    mut index: usize,
    order: HeapOrder,
    comparator: &C,
) {
    let admits = |storage: &TransientVector<T>, parent: usize, child: Option<usize>| {
        integrity_check(
            order,
            comparator,
            storage.get(parent),
            child.and_then(|child| storage.get(child)),
        )
    };

    loop {
        let view: &TransientVector<T> = storage;
        let (left, right) = child_indices(index, view.len());
        if admits(view, index, left) && admits(view, index, right) {
            return;
        }

        let target = match (left, right) {
            (Some(left), Some(right)) => {
                if admits(view, left, Some(right)) {
                    left
                } else {
                    right
                }
            }
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => return,
        };

        let swapped = storage.swap(index, target);
        debug_assert!(swapped.is_ok(), "child_indices only yields in-bounds slots");
        index = target;
    }
}

// =============================================================================
// PersistentHeap Definition
// =============================================================================

/// A persistent (immutable) binary heap.
///
/// The heap order and comparator are fixed at construction and carried by
/// every heap derived through `push`, `pop` and `replace`.
///
/// # Time Complexity
///
/// | Operation         | Complexity   |
/// |-------------------|--------------|
/// | `peek`            | O(1)         |
/// | `push`            | O(log N)     |
/// | `pop` / `replace` | O(log N)     |
/// | `merge`           | O(N + M)     |
/// | `heap_sort`       | O(N log N)   |
/// | construction      | O(N)         |
///
/// # Examples
///
/// ```rust
/// use persistent_structures::persistent::{HeapOrder, PersistentHeap};
///
/// let heap = PersistentHeap::with_order(HeapOrder::Max).push(3).push(7).push(5);
/// assert_eq!(heap.peek(), Some(&7));
/// assert!(heap.is_max_heap());
/// ```
pub struct PersistentHeap<T, C = NaturalOrder> {
    storage: PersistentVector<T>,
    order: HeapOrder,
    comparator: C,
}

impl<T> PersistentHeap<T, NaturalOrder> {
    /// Creates a new empty min-heap ordered by [`Ord`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(HeapOrder::Min)
    }

    /// Creates a new empty heap with the given order, ordered by [`Ord`].
    #[inline]
    #[must_use]
    pub fn with_order(order: HeapOrder) -> Self {
        Self::with_comparator(order, NaturalOrder)
    }

    /// Creates a min-heap holding a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self {
            storage: PersistentVector::singleton(element),
            order: HeapOrder::Min,
            comparator: NaturalOrder,
        }
    }
}

impl<T, C> PersistentHeap<T, C> {
    /// Creates a new empty heap with the given order and comparator.
    #[inline]
    #[must_use]
    pub fn with_comparator(order: HeapOrder, comparator: C) -> Self {
        Self {
            storage: PersistentVector::new(),
            order,
            comparator,
        }
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of elements; same as [`len`](Self::len).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.storage.len()
    }

    /// Returns `true` if the heap holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Returns the root element: the least for a min-heap, the greatest for a
    /// max-heap.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.storage.first()
    }

    /// Returns the heap order.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> HeapOrder {
        self.order
    }

    /// Returns `true` if this is a max-heap.
    #[inline]
    #[must_use]
    pub const fn is_max_heap(&self) -> bool {
        self.order.is_max()
    }

    /// Returns the comparator.
    #[inline]
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the backing sequence in heap (level) order.
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> &PersistentVector<T> {
        &self.storage
    }

    /// Returns an iterator over the elements in storage order.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        self.storage.iter()
    }
}

impl<T, C: Comparator<T>> PersistentHeap<T, C> {
    /// Verifies the heap property for every parent/child pair.
    ///
    /// # Errors
    ///
    /// Returns [`PersistentError::HeapPropertyViolation`] for the first child
    /// (in storage order) that outranks its parent.
    pub fn check_integrity(&self) -> PersistentResult<()> {
        for child in 1..self.storage.len() {
            let Some(parent) = parent_index(child) else {
                continue;
            };
            if !integrity_check(
                self.order,
                &self.comparator,
                self.storage.get(parent),
                self.storage.get(child),
            ) {
                return Err(PersistentError::HeapPropertyViolation { parent, child });
            }
        }
        Ok(())
    }

    /// Adopts a sequence that is already in heap order, without sifting.
    ///
    /// # Errors
    ///
    /// Returns [`PersistentError::HeapPropertyViolation`] if `storage` is not
    /// a valid heap for `order` and `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::{HeapOrder, NaturalOrder, PersistentHeap, PersistentVector};
    /// use persistent_structures::PersistentError;
    ///
    /// let valid = PersistentVector::from(vec![1, 4, 2]);
    /// assert!(PersistentHeap::try_from_heap_storage(valid, HeapOrder::Min, NaturalOrder).is_ok());
    ///
    /// let invalid = PersistentVector::from(vec![1, 4, 0]);
    /// assert_eq!(
    ///     PersistentHeap::try_from_heap_storage(invalid, HeapOrder::Min, NaturalOrder).err(),
    ///     Some(PersistentError::HeapPropertyViolation { parent: 0, child: 2 })
    /// );
    /// ```
    pub fn try_from_heap_storage(
        storage: PersistentVector<T>,
        order: HeapOrder,
        comparator: C,
    ) -> PersistentResult<Self> {
        let heap = Self {
            storage,
            order,
            comparator,
        };
        heap.check_integrity()?;
        Ok(heap)
    }
}

impl<T: Clone, C: Comparator<T>> PersistentHeap<T, C> {
    /// Builds a heap from an arbitrary sequence by sifting down every
    /// non-leaf position, deepest first.
    ///
    /// # Complexity
    ///
    /// O(N)
    #[must_use]
    pub fn from_vector(storage: PersistentVector<T>, order: HeapOrder, comparator: C) -> Self {
        let length = storage.len();
        trace!(length, max_heap = order.is_max(), "heapifying storage");

        let mut scratch = storage.transient();
        for index in (0..length / 2).rev() {
            sift_down(&mut scratch, index, order, &comparator);
        }

        Self {
            storage: scratch.persistent(),
            order,
            comparator,
        }
    }

    /// Builds a heap from any collection of elements.
    #[must_use]
    pub fn from_values<I>(values: I, order: HeapOrder, comparator: C) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_vector(values.into_iter().collect(), order, comparator)
    }

    fn with_storage(&self, storage: PersistentVector<T>) -> Self
    where
        C: Clone,
    {
        Self {
            storage,
            order: self.order,
            comparator: self.comparator.clone(),
        }
    }
}

impl<T: Clone, C: Comparator<T> + Clone> PersistentHeap<T, C> {
    /// Creates a heap over the elements of `other` with the given order.
    ///
    /// When `order` matches `other`'s order the storage is shared as is;
    /// otherwise it is heapified again for the new order.
    #[must_use]
    pub fn from_heap(other: &Self, order: HeapOrder) -> Self {
        if order == other.order {
            other.clone()
        } else {
            Self::from_vector(other.storage.clone(), order, other.comparator.clone())
        }
    }

    /// Returns a heap with `element` added.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentHeap;
    ///
    /// let heap = PersistentHeap::new().push(5).push(1).push(3);
    /// assert_eq!(heap.peek(), Some(&1));
    /// assert_eq!(heap.len(), 3);
    /// ```
    #[must_use]
    pub fn push(&self, element: T) -> Self {
        let appended = self.storage.len();
        let mut scratch = self.storage.push_back(element).transient();
        sift_up(&mut scratch, appended, self.order, &self.comparator);
        self.with_storage(scratch.persistent())
    }

    /// Returns a heap without its root element.
    ///
    /// The last element takes the root slot and is sifted down. Popping an
    /// empty heap returns an empty heap.
    #[must_use]
    pub fn pop(&self) -> Self {
        let Some((rest, last)) = self.storage.pop_back() else {
            return self.clone();
        };
        if rest.is_empty() {
            return self.with_storage(rest);
        }

        let mut scratch = rest.transient();
        let written = scratch.set(0, last);
        debug_assert!(written.is_ok(), "a non-empty heap has a root slot");
        sift_down(&mut scratch, 0, self.order, &self.comparator);
        self.with_storage(scratch.persistent())
    }

    /// Pops the root, or replaces it when a replacement is given.
    ///
    /// `pop_with(None)` is [`pop`](Self::pop); `pop_with(Some(element))` is
    /// [`replace`](Self::replace).
    #[must_use]
    pub fn pop_with(&self, replacement: Option<T>) -> Self {
        match replacement {
            Some(element) => self.replace(element),
            None => self.pop(),
        }
    }

    /// Returns a heap whose root is replaced by `element`.
    ///
    /// Equivalent to a pop followed by a push, in a single sift. Replacing the
    /// root of an empty heap returns an empty heap.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::PersistentHeap;
    ///
    /// let heap: PersistentHeap<i32> = [1, 4, 6].into_iter().collect();
    /// let replaced = heap.replace(5);
    ///
    /// assert_eq!(replaced.peek(), Some(&4));
    /// assert_eq!(replaced.len(), 3);
    /// ```
    #[must_use]
    pub fn replace(&self, element: T) -> Self {
        if self.is_empty() {
            return self.clone();
        }

        let mut scratch = self.storage.clone().transient();
        let written = scratch.set(0, element);
        debug_assert!(written.is_ok(), "a non-empty heap has a root slot");
        sift_down(&mut scratch, 0, self.order, &self.comparator);
        self.with_storage(scratch.persistent())
    }

    /// Returns a heap holding the elements of both heaps.
    ///
    /// The result takes its order and comparator from `other`, not from the
    /// receiver. Both heaps should agree on their comparator.
    ///
    /// # Complexity
    ///
    /// O(N + M)
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        trace!(
            left = self.len(),
            right = other.len(),
            max_heap = other.order.is_max(),
            "merging heaps"
        );
        Self::from_vector(
            other.storage.append(&self.storage),
            other.order,
            other.comparator.clone(),
        )
    }

    /// Returns every element in pop order: ascending for a min-heap,
    /// descending for a max-heap.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_structures::persistent::{HeapOrder, NaturalOrder, PersistentHeap};
    ///
    /// let heap = PersistentHeap::from_values([5, 3, 8, 1, 9, 2], HeapOrder::Max, NaturalOrder);
    /// let sorted: Vec<i32> = heap.heap_sort().into_iter().collect();
    /// assert_eq!(sorted, vec![9, 8, 5, 3, 2, 1]);
    /// ```
    #[must_use]
    pub fn heap_sort(&self) -> PersistentVector<T> {
        let mut sorted = PersistentVector::new().transient();
        let mut remaining = self.clone();
        while let Some(top) = remaining.peek().cloned() {
            sorted.push_back(top);
            remaining = remaining.pop();
        }
        sorted.persistent()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, C: Clone> Clone for PersistentHeap<T, C> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            order: self.order,
            comparator: self.comparator.clone(),
        }
    }
}

impl<T, C: Default> Default for PersistentHeap<T, C> {
    #[inline]
    fn default() -> Self {
        Self::with_comparator(HeapOrder::Min, C::default())
    }
}

impl<T: Clone + Ord> FromIterator<T> for PersistentHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter, HeapOrder::Min, NaturalOrder)
    }
}

impl<'a, T, C> IntoIterator for &'a PersistentHeap<T, C> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for PersistentHeap<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PersistentHeap")
            .field("order", &self.order)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
#[derive(serde::Serialize)]
struct StoredHeapRef<'a, T> {
    max_heap: bool,
    elements: &'a PersistentVector<T>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct StoredHeap<T> {
    max_heap: bool,
    elements: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize, C> serde::Serialize for PersistentHeap<T, C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let stored = StoredHeapRef {
            max_heap: self.is_max_heap(),
            elements: &self.storage,
        };
        serde::Serialize::serialize(&stored, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C> serde::Deserialize<'de> for PersistentHeap<T, C>
where
    T: serde::Deserialize<'de> + Clone,
    C: Comparator<T> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let stored = <StoredHeap<T> as serde::Deserialize>::deserialize(deserializer)?;
        let order = if stored.max_heap {
            HeapOrder::Max
        } else {
            HeapOrder::Min
        };
        Ok(Self::from_values(stored.elements, order, C::default()))
    }
}

// =============================================================================
// Tests
// =============================================================================
