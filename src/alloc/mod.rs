//! The raw allocation seam used by [`OwnedBuffer`](crate::buffer::OwnedBuffer).
//!
//! A buffer only ever needs two things from its environment: somewhere to get a block of bytes and
//! somewhere to give it back. [`RawAlloc`] is that pair. The crate provides:
//! - [`Global`], which forwards to Rust's global allocator.
//! - [`Malloc`], which uses C's `malloc`, `calloc` and `free` (requires the `malloc` feature).
//! - [`Counting`], a wrapper that counts allocations and releases and can be told to fail, which
//!   is mostly useful for tests.
#![warn(missing_docs)]

mod counting;
mod error;
mod global;
#[cfg(all(feature = "malloc", unix))]
mod malloc;

use std::alloc::Layout;
use std::ptr::{self, NonNull};

pub use counting::*;
pub use error::*;
pub use global::*;
#[cfg(all(feature = "malloc", unix))]
pub use malloc::*;

/// A low-level allocate / release pair.
///
/// # Safety
/// Implementors must uphold the following:
/// - A pointer returned by [`allocate`](RawAlloc::allocate) or
///   [`allocate_zeroed`](RawAlloc::allocate_zeroed) is aligned to `layout.align()` and valid for
///   reads and writes of `layout.size()` bytes until it is passed to
///   [`release`](RawAlloc::release).
/// - Zero-sized layouts are accepted and produce an aligned, dangling pointer which is never
///   dereferenced. Releasing such a pointer does nothing.
/// - Blocks are independent, no two live blocks overlap.
pub unsafe trait RawAlloc {
    /// Allocates a block for `layout`. The contents of the block are uninitialized.
    ///
    /// # Errors
    /// Returns [`AllocError::OutOfMemory`] if the block couldn't be provided.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Allocates a block for `layout` with every byte set to zero, like C's `calloc`.
    ///
    /// # Errors
    /// Returns [`AllocError::OutOfMemory`] if the block couldn't be provided.
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.allocate(layout)?;
        // SAFETY: The block is valid for writes of layout.size() bytes, including zero.
        unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
        Ok(ptr)
    }

    /// Returns a block to the allocator. This never fails.
    ///
    /// # Safety
    /// `ptr` must have been returned by this allocator for the same `layout` and must not have
    /// been released already.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: All calls are forwarded to A, which upholds the contract.
unsafe impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate_zeroed(layout)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: The caller upholds the contract for A.
        unsafe { (**self).release(ptr, layout) }
    }
}

/// Produces the dangling pointer handed out for zero-sized layouts. It is aligned for `layout` but
/// carries no provenance.
pub(crate) const fn dangling(layout: Layout) -> NonNull<u8> {
    // SAFETY: Alignment is always a non-zero power of two.
    unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(layout.align())) }
}
