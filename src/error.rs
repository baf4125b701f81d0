//! Error types for persistent structure construction.
//!
//! Lookups on absent keys, pops on empty heaps and removals of missing keys
//! are ordinary outcomes and are reported through `Option` or by returning an
//! unchanged snapshot. [`PersistentError`] is reserved for precondition
//! violations: caller-supplied structure that does not satisfy the invariants
//! the persistent types rely on.

use thiserror::Error;

use crate::persistent::Side;

/// Result type for fallible persistent structure operations.
pub type PersistentResult<T> = Result<T, PersistentError>;

/// Precondition violations surfaced by persistent structures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistentError {
    /// A caller-supplied tree root breaks the binary-search-tree ordering.
    #[error("ordering violated: node #{child_id} hangs on the {side} side of node #{parent_id}")]
    OrderingViolation {
        /// Id of the ancestor whose ordering constraint is broken.
        parent_id: usize,
        /// Id of the node placed on the wrong side.
        child_id: usize,
        /// The side of the ancestor the node hangs from.
        side: Side,
    },

    /// A caller-supplied heap storage breaks the heap property.
    #[error("heap property violated between index {parent} and index {child}")]
    HeapPropertyViolation {
        /// Index of the parent slot.
        parent: usize,
        /// Index of the child slot.
        child: usize,
    },

    /// An index outside the bounds of a sequence.
    #[error("index {index} out of bounds for sequence of length {length}")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The length of the sequence.
        length: usize,
    },
}
