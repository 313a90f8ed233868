use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{AllocError, Global, OutOfMemory, RawAlloc};

const UNLIMITED: usize = usize::MAX;

/// An instrumented allocator that wraps another [`RawAlloc`] and keeps count of every block handed
/// out and returned. Counters are atomic, so a single `Counting` can be shared by reference between
/// many buffers (`&Counting` is itself a [`RawAlloc`]).
///
/// Allocation failure can be injected with [`Counting::fail_after`], which makes it possible to
/// test error paths without actually exhausting memory.
///
/// # Examples
/// ```
/// # use owned_buffer::alloc::Counting;
/// # use owned_buffer::OwnedBuffer;
/// let counter = Counting::new();
/// let buf = OwnedBuffer::<u32, _>::new_in(8, &counter);
/// assert_eq!(counter.live(), 1);
/// drop(buf);
/// assert_eq!((counter.allocations(), counter.releases()), (1, 1));
/// ```
#[derive(Debug)]
pub struct Counting<A = Global> {
    inner: A,
    allocations: AtomicUsize,
    releases: AtomicUsize,
    failures: AtomicUsize,
    live: AtomicUsize,
    live_bytes: AtomicUsize,
    remaining: AtomicUsize,
}

impl Counting<Global> {
    /// Creates a new counter around the [`Global`] allocator.
    pub const fn new() -> Counting<Global> {
        Counting::wrap(Global)
    }
}

impl<A> Counting<A> {
    /// Creates a new counter around `inner`.
    pub const fn wrap(inner: A) -> Counting<A> {
        Counting {
            inner,
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            live: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            remaining: AtomicUsize::new(UNLIMITED),
        }
    }

    /// Allows `count` more successful allocations, after which every request fails with
    /// [`AllocError::OutOfMemory`].
    pub fn fail_after(self, count: usize) -> Counting<A> {
        self.remaining.store(count, Ordering::SeqCst);
        self
    }

    /// The number of blocks successfully allocated.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    /// The number of blocks released.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// The number of allocation requests that were refused.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    /// The number of blocks currently allocated and not yet released.
    ///
    /// This is kept as its own counter, so it stays consistent while other threads allocate and
    /// release.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// The total size of all live blocks.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::SeqCst)
    }

    /// The wrapped allocator.
    pub const fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: RawAlloc> Counting<A> {
    fn track(
        &self,
        layout: Layout,
        alloc: impl FnOnce(&A) -> Result<NonNull<u8>, AllocError>,
    ) -> Result<NonNull<u8>, AllocError> {
        let permitted = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                UNLIMITED => Some(UNLIMITED),
                0 => None,
                left => Some(left - 1),
            })
            .is_ok();

        if !permitted {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(OutOfMemory::from(layout).into());
        }

        let ptr = alloc(&self.inner).inspect_err(|_| {
            self.failures.fetch_add(1, Ordering::SeqCst);
        })?;

        self.allocations.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        self.live_bytes.fetch_add(layout.size(), Ordering::SeqCst);
        Ok(ptr)
    }
}

impl Default for Counting<Global> {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: Every block comes from and goes back to the inner allocator unchanged.
unsafe impl<A: RawAlloc> RawAlloc for Counting<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.track(layout, |inner| inner.allocate(layout))
    }

    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.track(layout, |inner| inner.allocate_zeroed(layout))
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: The caller upholds the contract, and ptr was allocated by inner.
        unsafe { self.inner.release(ptr, layout) };
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.live_bytes.fetch_sub(layout.size(), Ordering::SeqCst);
    }
}
