use std::alloc::Layout;
use std::mem;
use std::ptr::{self, NonNull};

use super::{AllocError, OutOfMemory, RawAlloc, dangling};

/// The weakest alignment guaranteed by every `malloc` implementation we care about.
const MIN_ALIGN: usize = mem::size_of::<usize>();

/// An allocator backed by the C library's `malloc`, `calloc`, `posix_memalign` and `free`.
///
/// Layouts with an alignment above that of a pointer are served by `posix_memalign`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Malloc;

impl Malloc {
    fn aligned(layout: Layout) -> *mut u8 {
        let mut out: *mut libc::c_void = ptr::null_mut();
        // SAFETY: The alignment is a power of two larger than MIN_ALIGN and therefore a multiple
        // of size_of::<*mut c_void>(). The size is non-zero.
        match unsafe { libc::posix_memalign(&mut out, layout.align(), layout.size()) } {
            0 => out.cast(),
            _ => ptr::null_mut(),
        }
    }
}

// SAFETY: Zero-sized layouts never reach libc. malloc and calloc return memory aligned for any
// fundamental type, which covers everything up to MIN_ALIGN, and posix_memalign handles the rest.
// All three are released with free.
unsafe impl RawAlloc for Malloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        let raw = if layout.align() <= MIN_ALIGN {
            // SAFETY: The size is non-zero.
            unsafe { libc::malloc(layout.size()).cast::<u8>() }
        } else {
            Malloc::aligned(layout)
        };

        NonNull::new(raw).ok_or_else(|| OutOfMemory::from(layout).into())
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        if layout.align() <= MIN_ALIGN {
            // SAFETY: The size is non-zero.
            let raw = unsafe { libc::calloc(1, layout.size()).cast::<u8>() };
            return NonNull::new(raw).ok_or_else(|| OutOfMemory::from(layout).into());
        }

        let ptr = NonNull::new(Malloc::aligned(layout))
            .ok_or_else(|| AllocError::from(OutOfMemory::from(layout)))?;
        // SAFETY: The block was just allocated with layout.size() bytes.
        unsafe { ptr.as_ptr().write_bytes(0, layout.size()) };
        Ok(ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: The caller guarantees ptr was returned by this allocator and hasn't been
            // released yet.
            unsafe { libc::free(ptr.as_ptr().cast()) }
        }
    }
}
