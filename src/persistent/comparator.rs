//! Total orders used by the persistent tree and heap.
//!
//! A [`Comparator`] is fixed when a structure is created and is inherited by
//! every snapshot derived from it. [`NaturalOrder`] is the default and defers
//! to [`Ord`]; any `Fn(&T, &T) -> Ordering` closure can be used as well.
//!
//! # Examples
//!
//! ```rust
//! use persistent_structures::persistent::{Comparator, NaturalOrder, Reversed};
//! use std::cmp::Ordering;
//!
//! assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
//! assert_eq!(Reversed(NaturalOrder).compare(&1, &2), Ordering::Greater);
//!
//! let by_length = |left: &&str, right: &&str| left.len().cmp(&right.len());
//! assert_eq!(by_length.compare(&"abc", &"de"), Ordering::Greater);
//! ```

use std::cmp::Ordering;

/// A total order over `T`.
///
/// Implementations must be consistent: `compare(a, b)` must be the reverse of
/// `compare(b, a)` and transitive. Structures do not defend against
/// inconsistent comparators; their shape is simply unspecified then.
pub trait Comparator<T: ?Sized> {
    /// Compares two values.
    fn compare(&self, left: &T, right: &T) -> Ordering;
}

/// Compares values by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }
}

/// Reverses the order of the wrapped comparator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reversed<C> {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self.0.compare(right, left)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self(left, right)
    }
}
