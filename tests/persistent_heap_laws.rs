//! Property-based tests for PersistentHeap.
//!
//! These tests verify that PersistentHeap keeps the heap property and its
//! persistence guarantees under arbitrary operation sequences.

use persistent_structures::persistent::{HeapOrder, NaturalOrder, PersistentHeap};
use proptest::prelude::*;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

fn arbitrary_order() -> impl Strategy<Value = HeapOrder> {
    prop_oneof![Just(HeapOrder::Min), Just(HeapOrder::Max)]
}

fn arbitrary_heap(max_size: usize) -> impl Strategy<Value = PersistentHeap<i32>> {
    (prop::collection::vec(-50..50i32, 0..max_size), arbitrary_order())
        .prop_map(|(values, order)| PersistentHeap::from_values(values, order, NaturalOrder))
}

#[derive(Clone, Debug)]
enum Operation {
    Push(i32),
    Pop,
    Replace(i32),
}

fn arbitrary_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (-50..50i32).prop_map(Operation::Push),
        Just(Operation::Pop),
        (-50..50i32).prop_map(Operation::Replace),
    ]
}

fn expected_sort(mut values: Vec<i32>, order: HeapOrder) -> Vec<i32> {
    values.sort_unstable();
    if order.is_max() {
        values.reverse();
    }
    values
}

// =============================================================================
// Heap Property Laws
// =============================================================================

proptest! {
    /// Law: heapify establishes the heap property.
    #[test]
    fn prop_heapify_establishes_property(heap in arbitrary_heap(80)) {
        prop_assert!(heap.check_integrity().is_ok());
    }

    /// Law: every push, pop and replace keeps the heap property.
    #[test]
    fn prop_operations_keep_property(
        heap in arbitrary_heap(40),
        operations in prop::collection::vec(arbitrary_operation(), 0..40)
    ) {
        let mut current = heap;
        for operation in operations {
            current = match operation {
                Operation::Push(value) => current.push(value),
                Operation::Pop => current.pop(),
                Operation::Replace(value) => current.replace(value),
            };
            prop_assert!(current.check_integrity().is_ok());
        }
    }

    /// Law: merge keeps the heap property and every element.
    #[test]
    fn prop_merge_keeps_property(left in arbitrary_heap(40), right in arbitrary_heap(40)) {
        let merged = left.merge(&right);
        prop_assert!(merged.check_integrity().is_ok());
        prop_assert_eq!(merged.len(), left.len() + right.len());
        prop_assert_eq!(merged.order(), right.order());
    }
}

// =============================================================================
// Sorting Laws
// =============================================================================

proptest! {
    /// Law: heap_sort returns the elements in pop order.
    #[test]
    fn prop_heap_sort_sorts(values in prop::collection::vec(-50..50i32, 0..80), order in arbitrary_order()) {
        let heap = PersistentHeap::from_values(values.clone(), order, NaturalOrder);
        let sorted: Vec<i32> = heap.heap_sort().into_iter().collect();
        prop_assert_eq!(sorted, expected_sort(values, order));
    }

    /// Law: peek is the first element of heap_sort.
    #[test]
    fn prop_peek_is_extreme(heap in arbitrary_heap(60)) {
        prop_assert_eq!(heap.peek().copied(), heap.heap_sort().first().copied());
    }

    /// Law: push adds exactly one occurrence of the value.
    #[test]
    fn prop_push_adds_value(heap in arbitrary_heap(40), value in -50..50i32) {
        let mut expected: Vec<i32> = heap.iter().copied().collect();
        expected.push(value);
        let pushed = heap.push(value);
        let sorted: Vec<i32> = pushed.heap_sort().into_iter().collect();
        prop_assert_eq!(sorted, expected_sort(expected, heap.order()));
    }
}

// =============================================================================
// Persistence Laws
// =============================================================================

proptest! {
    /// Law: no operation changes the heap it was called on.
    #[test]
    fn prop_operations_preserve_receiver(heap in arbitrary_heap(40), value in -50..50i32) {
        let snapshot: Vec<i32> = heap.iter().copied().collect();

        let _pushed = heap.push(value);
        let _popped = heap.pop();
        let _replaced = heap.replace(value);
        let _merged = heap.merge(&heap);
        let _sorted = heap.heap_sort();

        let after: Vec<i32> = heap.iter().copied().collect();
        prop_assert_eq!(snapshot, after);
    }

    /// Law: pop shrinks by one unless empty.
    #[test]
    fn prop_pop_size(heap in arbitrary_heap(40)) {
        let popped = heap.pop();
        prop_assert_eq!(popped.len(), heap.len().saturating_sub(1));
    }
}
