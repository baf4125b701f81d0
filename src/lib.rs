//! # persistent-structures
//!
//! Persistent (immutable, structurally shared) data structures for Rust.
//!
//! ## Overview
//!
//! Every update on these structures returns a new version while every
//! earlier version stays valid and unchanged. Versions share all the parts
//! an update did not touch:
//!
//! - **`PersistentTree`**: an unbalanced binary search tree updated by path
//!   copying along an ancestor stack
//! - **`PersistentHeap`**: a min- or max-heap laid out as an implicit binary
//!   tree over a persistent vector
//! - **`PersistentVector`**: a 32-way radix balanced trie with transient
//!   (batched, copy-on-write) updates
//!
//! ## Feature Flags
//!
//! - `arc`: share nodes through `Arc` instead of `Rc`, making structures
//!   `Send + Sync`
//! - `serde`: `Serialize`/`Deserialize` implementations
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use persistent_structures::prelude::*;
//!
//! let tree = PersistentTree::new().insert_all([(5, "a"), (3, "b"), (8, "c")]);
//! let smaller = tree.remove(&5);
//! assert_eq!(smaller.len(), 2);
//! assert_eq!(tree.len(), 3);
//!
//! let heap = PersistentHeap::from_values([5, 3, 8], HeapOrder::Max, NaturalOrder);
//! assert_eq!(heap.peek(), Some(&8));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use persistent_structures::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{PersistentError, PersistentResult};
    pub use crate::persistent::*;
}

pub mod error;
pub mod persistent;

pub use error::{PersistentError, PersistentResult};
