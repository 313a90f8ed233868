use std::alloc::{self, Layout};
use std::ptr::NonNull;

use super::{AllocError, OutOfMemory, RawAlloc, dangling};

/// The default allocator, which forwards to Rust's global allocator via [`std::alloc`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

// SAFETY: Zero-sized layouts never reach the global allocator, everything else is forwarded with
// the same layout for allocation and deallocation.
unsafe impl RawAlloc for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        // SAFETY: Zero-sized layouts have been guarded against.
        NonNull::new(unsafe { alloc::alloc(layout) })
            .ok_or_else(|| OutOfMemory::from(layout).into())
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        // SAFETY: Zero-sized layouts have been guarded against.
        NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
            .ok_or_else(|| OutOfMemory::from(layout).into())
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: The caller guarantees ptr came from this allocator with this layout, and
            // zero-sized layouts were never allocated.
            unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }
}
