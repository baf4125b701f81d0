//! Persistent (immutable) data structures.
//!
//! This module provides immutable data structures that use structural
//! sharing to minimize copying:
//!
//! - [`PersistentTree`]: Persistent binary search tree (path copying)
//! - [`PersistentHeap`]: Persistent min/max binary heap (array backed)
//! - [`PersistentVector`]: Persistent vector (Radix Balanced Tree), the
//!   heap's storage
//!
//! # Structural Sharing
//!
//! Every update returns a new version and leaves the old one valid. Only the
//! nodes on the path from the root to the modified position are copied; all
//! other nodes are shared between versions through [`ReferenceCounter`].
//!
//! # Examples
//!
//! ## `PersistentTree`
//!
//! ```rust
//! use persistent_structures::persistent::PersistentTree;
//!
//! let tree = PersistentTree::new()
//!     .insert(3, "three")
//!     .insert(1, "one")
//!     .insert(2, "two");
//!
//! // Entries are always in key order
//! let keys: Vec<&i32> = tree.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! // Structural sharing: the original tree is preserved
//! let updated = tree.insert(1, "ONE");
//! assert_eq!(tree.get(&1), Some(&"one"));     // Original unchanged
//! assert_eq!(updated.get(&1), Some(&"ONE"));  // New version
//! ```
//!
//! ## `PersistentHeap`
//!
//! ```rust
//! use persistent_structures::persistent::PersistentHeap;
//!
//! let heap: PersistentHeap<i32> = [4, 1, 3].into_iter().collect();
//! assert_eq!(heap.peek(), Some(&1));
//!
//! let pushed = heap.push(0);
//! assert_eq!(heap.peek(), Some(&1));   // Original unchanged
//! assert_eq!(pushed.peek(), Some(&0)); // New version
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub type ReferenceCounter<T> = std::sync::Arc<T>;

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(not(feature = "arc"))]
pub type ReferenceCounter<T> = std::rc::Rc<T>;

mod comparator;
mod heap;
mod tree;
mod tree_node;
mod vector;

pub use comparator::Comparator;
pub use comparator::NaturalOrder;
pub use comparator::Reversed;
pub use heap::HeapOrder;
pub use heap::PersistentHeap;
pub use heap::child_indices;
pub use heap::parent_index;
pub use tree::PersistentTree;
pub use tree::PersistentTreeIterator;
pub use tree_node::ChildCount;
pub use tree_node::Link;
pub use tree_node::Side;
pub use tree_node::TreeNode;
pub use vector::PersistentVector;
pub use vector::PersistentVectorIntoIterator;
pub use vector::PersistentVectorIterator;
pub use vector::TransientVector;

// =============================================================================
// Tests
// =============================================================================
