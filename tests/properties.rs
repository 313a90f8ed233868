//! Property-based tests using proptest.
//!
//! These check the ownership invariants of `OwnedBuffer` for randomly sized buffers, counting
//! every allocation and release with `Counting`.

use std::panic::{self, AssertUnwindSafe};

use owned_buffer::OwnedBuffer;
use owned_buffer::alloc::Counting;
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Buffer lengths, including zero.
fn len_strategy() -> impl Strategy<Value = usize> {
    0_usize..512
}

/// Buffer contents.
fn values_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(any::<i64>(), 1..128)
}

fn panics<R>(f: impl FnOnce() -> R) -> bool {
    panic::catch_unwind(AssertUnwindSafe(f)).is_err()
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    /// Constructing and dropping a buffer allocates once and releases once.
    #[test]
    fn prop_one_allocation_one_release(len in len_strategy()) {
        let counter = Counting::new();
        let buf = OwnedBuffer::<u32, _>::try_new_in(len, &counter).unwrap();
        prop_assert_eq!(counter.allocations(), 1);
        prop_assert_eq!(counter.releases(), 0);
        prop_assert_eq!(counter.live_bytes(), len * 4);

        drop(buf);
        prop_assert_eq!(counter.allocations(), 1);
        prop_assert_eq!(counter.releases(), 1);
        prop_assert_eq!(counter.live_bytes(), 0);
    }

    /// Every in-bounds element starts out as the default value and the first index past the end
    /// is rejected.
    #[test]
    fn prop_default_elements_and_bounds(len in 1_usize..512, index in any::<prop::sample::Index>()) {
        let buf = OwnedBuffer::<u64>::new(len);
        prop_assert_eq!(buf[index.index(len)], 0);
        prop_assert!(buf.iter().all(|v| *v == 0));
        prop_assert!(panics(|| buf[len]));
    }

    /// Taking moves the storage without allocating and leaves the source empty.
    #[test]
    fn prop_take_transfers_ownership(values in values_strategy()) {
        let counter = Counting::new();
        let mut source =
            OwnedBuffer::try_from_fn_in(values.len(), &counter, |i| values[i]).unwrap();

        let taken = source.take();
        prop_assert_eq!(source.len(), 0);
        prop_assert!(source.is_released());
        prop_assert!(panics(|| source[0]));
        prop_assert_eq!(&*taken, values.as_slice());
        prop_assert_eq!(counter.allocations(), 1);
        prop_assert_eq!(counter.live(), 1);

        drop(source);
        drop(taken);
        prop_assert_eq!(counter.releases(), 1);
    }

    /// Assigning a buffer's own storage back to it changes nothing.
    #[test]
    fn prop_self_assignment(values in values_strategy()) {
        let counter = Counting::new();
        let mut buf = OwnedBuffer::try_from_fn_in(values.len(), &counter, |i| values[i]).unwrap();

        buf = buf.take();
        prop_assert_eq!(&*buf, values.as_slice());
        prop_assert_eq!(counter.releases(), 0);

        drop(buf);
        prop_assert_eq!((counter.allocations(), counter.releases()), (1, 1));
    }

    /// Clones are equal but independent.
    #[test]
    fn prop_clone_is_independent(
        values in values_strategy(),
        index in any::<prop::sample::Index>(),
        replacement in any::<i64>(),
    ) {
        let counter = Counting::new();
        let original =
            OwnedBuffer::try_from_fn_in(values.len(), &counter, |i| values[i]).unwrap();
        let mut copy = original.clone();
        prop_assert_eq!(&original, &copy);
        prop_assert_eq!(counter.allocations(), 2);

        let i = index.index(values.len());
        copy[i] = replacement;
        prop_assert_eq!(original[i], values[i]);
        prop_assert_eq!(copy[i], replacement);

        drop((original, copy));
        prop_assert_eq!(counter.live(), 0);
    }

    /// Failed allocations never leave anything behind.
    #[test]
    fn prop_failed_allocation_leaks_nothing(len in len_strategy(), successes in 0_usize..3) {
        let counter = Counting::new().fail_after(successes);
        let mut held = Vec::new();

        for _ in 0..3 {
            match OwnedBuffer::<u8, _>::try_new_in(len, &counter) {
                Ok(buf) => held.push(buf),
                Err(error) => prop_assert!(error.is_out_of_memory()),
            }
        }

        prop_assert_eq!(held.len(), successes);
        prop_assert_eq!(counter.failures(), 3 - successes);

        drop(held);
        prop_assert_eq!(counter.live(), 0);
    }
}
