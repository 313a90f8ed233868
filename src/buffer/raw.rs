use std::alloc::Layout;
use std::mem;
use std::ops::Range;
use std::ptr::{self, NonNull};

use crate::alloc::RawAlloc;

/// Recreates the layout of a block holding `len` elements of `T`.
///
/// # Safety
/// `Layout::array::<T>(len)` must have succeeded when the block was allocated.
pub(crate) const unsafe fn array_layout<T>(len: usize) -> Layout {
    // SAFETY: The caller guarantees that this layout was already validated, so the size can't
    // overflow and the alignment is that of T.
    unsafe { Layout::from_size_align_unchecked(mem::size_of::<T>() * len, mem::align_of::<T>()) }
}

/// A block that is returned to its allocator when dropped. Used so that the storage is released
/// even if dropping one of the elements panics.
struct Block<'a, A: RawAlloc> {
    ptr: NonNull<u8>,
    layout: Layout,
    alloc: &'a A,
}

impl<A: RawAlloc> Drop for Block<'_, A> {
    fn drop(&mut self) {
        // SAFETY: A Block is only created by destroy, whose caller guarantees that the block
        // belongs to alloc and is released exactly once.
        unsafe { self.alloc.release(self.ptr, self.layout) }
    }
}

/// Drops the elements in `live` and then releases the block of `len` elements starting at `ptr`.
///
/// # Safety
/// - `ptr` must have been allocated by `alloc` with `Layout::array::<T>(len)`.
/// - Every index in `live` must refer to an initialized element, and `live` must be within `len`.
/// - The block must not be used or released again afterwards.
pub(crate) unsafe fn destroy<T, A: RawAlloc>(
    ptr: NonNull<T>,
    live: Range<usize>,
    len: usize,
    alloc: &A,
) {
    let _block = Block {
        ptr: ptr.cast(),
        // SAFETY: The caller guarantees the layout was validated on allocation.
        layout: unsafe { array_layout::<T>(len) },
        alloc,
    };

    // SAFETY: The caller guarantees that the range is initialized and in bounds. Dropping a slice
    // in place keeps dropping the remaining elements if one of them panics.
    unsafe {
        ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
            ptr.add(live.start).as_ptr(),
            live.len(),
        ));
    }
}

/// Tracks a block while its elements are being constructed. If construction is abandoned by a
/// panic, the elements built so far are dropped and the block is released.
pub(crate) struct PartialInit<'a, T, A: RawAlloc> {
    pub(crate) ptr: NonNull<T>,
    pub(crate) init: usize,
    pub(crate) len: usize,
    pub(crate) alloc: &'a A,
}

impl<T, A: RawAlloc> PartialInit<'_, T, A> {
    /// Writes the next element. Must be called at most `len` times.
    pub(crate) fn push(&mut self, item: T) {
        debug_assert!(self.init < self.len);
        // SAFETY: init < len, so the write is in bounds of the allocated block.
        unsafe { self.ptr.add(self.init).write(item) };
        self.init += 1;
    }

    /// Hands the fully initialized block back to the caller.
    pub(crate) fn finish(self) -> NonNull<T> {
        debug_assert_eq!(self.init, self.len);
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }
}

impl<T, A: RawAlloc> Drop for PartialInit<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: The first init elements were written by push and the block came from alloc.
        // PartialInit is forgotten once finished, so this only runs for abandoned blocks.
        unsafe { destroy(self.ptr, 0..self.init, self.len, self.alloc) }
    }
}
