use std::alloc::Layout;
use std::borrow::{Borrow, BorrowMut};
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr::NonNull;
use std::slice;

use super::raw::{self, PartialInit};
use super::zero::ZeroValid;
use crate::alloc::{AllocError, Global, RawAlloc};
use crate::util::error::{IndexOutOfBounds, ReleasedAccess};
use crate::util::panic::Panic;
use crate::util::result::AllocResultExtension;

/// A fixed-length array on the heap with exactly one owner. Similar to a [`Box<[T]>`](Box<T>), but
/// with an explicit released state, so that ownership can be moved out from behind a mutable
/// reference.
///
/// # States
/// A buffer is either *owning*, holding a block of `len` initialized elements, or *released*, with
/// no storage and a length of zero. Buffers become released when moved out of with
/// [`take`](OwnedBuffer::take) or [`move_from`](OwnedBuffer::move_from), or when
/// [`reset`](OwnedBuffer::reset). Dropping a buffer releases it.
///
/// A zero-length buffer created by one of the constructors is still owning. It holds a zero-sized
/// block, which most allocators don't actually allocate.
///
/// # Contract Violations
/// Indexing out of bounds, or indexing a released buffer at all, panics. Buffers deref to `[T]`, so
/// [`slice::get`] is available when an index isn't known to be valid. A released buffer derefs to
/// an empty slice.
///
/// Methods reached through that deref follow the slice's contract, not the buffer's: on a
/// released buffer `buf.get(0)` is `None` while `buf[0]` panics.
///
/// # Copying
/// Cloning is always a deep copy: a new block is allocated and every element is cloned into it.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of items in the buffer.
///
/// | Method | Complexity |
/// |-|-|
/// | `new` | `O(n)` |
/// | `index` | `O(1)` |
/// | `len` | `O(1)` |
/// | `take` | `O(1)` |
/// | `move_from` | `O(n)`*, `O(1)` |
/// | `reset` | `O(n)` |
/// | `clone` | `O(n)` |
///
/// \* Dropping the elements previously held by the destination.
pub struct OwnedBuffer<T, A: RawAlloc = Global> {
    pub(crate) ptr: Option<NonNull<T>>,
    pub(crate) len: usize,
    pub(crate) alloc: A,
    pub(crate) _phantom: PhantomData<T>,
}

impl<T> OwnedBuffer<T> {
    /// Creates a released buffer, which holds nothing and doesn't allocate.
    ///
    /// # Examples
    /// ```
    /// # use owned_buffer::OwnedBuffer;
    /// let buf: OwnedBuffer<u8> = OwnedBuffer::released();
    /// assert!(buf.is_released());
    /// assert_eq!(buf.len(), 0);
    /// ```
    pub const fn released() -> OwnedBuffer<T> {
        OwnedBuffer::released_in(Global)
    }

    /// Creates a new buffer of `len` elements, with element `i` produced by `f(i)`.
    ///
    /// # Panics
    /// Panics if the memory layout size exceeds [`isize::MAX`].
    /// Out of memory is reported through [`handle_alloc_error`](std::alloc::handle_alloc_error),
    /// which aborts the process by default.
    ///
    /// # Examples
    /// ```
    /// # use owned_buffer::OwnedBuffer;
    /// let buf = OwnedBuffer::from_fn(4, |i| i * i);
    /// assert_eq!(&*buf, &[0, 1, 4, 9]);
    /// ```
    pub fn from_fn<F: FnMut(usize) -> T>(len: usize, f: F) -> OwnedBuffer<T> {
        OwnedBuffer::try_from_fn_in(len, Global, f).throw()
    }
}

impl<T: Default> OwnedBuffer<T> {
    /// Creates a new buffer of `len` default values.
    ///
    /// # Panics
    /// Panics if the memory layout size exceeds [`isize::MAX`].
    /// Out of memory is reported through [`handle_alloc_error`](std::alloc::handle_alloc_error),
    /// which aborts the process by default.
    ///
    /// # Examples
    /// ```
    /// # use owned_buffer::OwnedBuffer;
    /// let mut buf = OwnedBuffer::<u32>::new(3);
    /// buf[1] = 7;
    /// assert_eq!(&*buf, &[0, 7, 0]);
    /// ```
    pub fn new(len: usize) -> OwnedBuffer<T> {
        OwnedBuffer::new_in(len, Global)
    }

    /// Creates a new buffer of `len` default values, returning an error if allocation fails.
    ///
    /// # Errors
    /// Returns [`AllocError::CapacityOverflow`] if the memory layout size would exceed
    /// [`isize::MAX`], or [`AllocError::OutOfMemory`] if the allocator can't provide the block.
    pub fn try_new(len: usize) -> Result<OwnedBuffer<T>, AllocError> {
        OwnedBuffer::try_new_in(len, Global)
    }
}

impl<T: Clone> OwnedBuffer<T> {
    /// Creates a new buffer holding `len` clones of `item`.
    ///
    /// # Panics
    /// Panics if the memory layout size exceeds [`isize::MAX`].
    /// Out of memory is reported through [`handle_alloc_error`](std::alloc::handle_alloc_error),
    /// which aborts the process by default.
    pub fn repeat(item: T, len: usize) -> OwnedBuffer<T> {
        OwnedBuffer::try_repeat_in(item, len, Global).throw()
    }
}

impl<T: ZeroValid> OwnedBuffer<T> {
    /// Creates a new buffer of `len` zeroed elements, in a single zeroed allocation.
    ///
    /// # Panics
    /// Panics if the memory layout size exceeds [`isize::MAX`].
    /// Out of memory is reported through [`handle_alloc_error`](std::alloc::handle_alloc_error),
    /// which aborts the process by default.
    ///
    /// # Examples
    /// ```
    /// # use owned_buffer::OwnedBuffer;
    /// let buf = OwnedBuffer::<f64>::zeroed(2);
    /// assert_eq!(&*buf, &[0.0, 0.0]);
    /// ```
    pub fn zeroed(len: usize) -> OwnedBuffer<T> {
        OwnedBuffer::try_zeroed_in(len, Global).throw()
    }
}

impl<T, A: RawAlloc> OwnedBuffer<T, A> {
    /// Creates a released buffer which will use `alloc` if it is ever assigned storage.
    pub const fn released_in(alloc: A) -> OwnedBuffer<T, A> {
        OwnedBuffer {
            ptr: None,
            len: 0,
            alloc,
            _phantom: PhantomData,
        }
    }

    /// Creates a new buffer of `len` elements in `alloc`, with element `i` produced by `f(i)`.
    ///
    /// This is all-or-nothing: exactly one block is requested from `alloc` and if `f` panics, the
    /// elements produced so far are dropped and the block is released before unwinding continues.
    ///
    /// # Errors
    /// Returns [`AllocError::CapacityOverflow`] if the memory layout size would exceed
    /// [`isize::MAX`], or [`AllocError::OutOfMemory`] if the allocator can't provide the block.
    pub fn try_from_fn_in<F: FnMut(usize) -> T>(
        len: usize,
        alloc: A,
        mut f: F,
    ) -> Result<OwnedBuffer<T, A>, AllocError> {
        let layout = Layout::array::<T>(len)?;
        let block = alloc.allocate(layout)?;

        let mut wip = PartialInit {
            ptr: block.cast::<T>(),
            init: 0,
            len,
            alloc: &alloc,
        };

        for i in 0..len {
            wip.push(f(i));
        }

        let ptr = wip.finish();

        Ok(OwnedBuffer {
            ptr: Some(ptr),
            len,
            alloc,
            _phantom: PhantomData,
        })
    }

    /// Returns the number of elements in the buffer. Released buffers have a length of zero.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements, whether it is released or not.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the buffer has been moved out of or reset and no longer owns any storage.
    pub const fn is_released(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns a reference to the allocator used by this buffer.
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the buffer's contents as a slice. Equivalent to `&*buf`.
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Returns the buffer's contents as a mutable slice. Equivalent to `&mut *buf`.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Drops all elements, returns the storage to the allocator and leaves the buffer released.
    /// Calling this on a released buffer does nothing.
    ///
    /// The storage is detached before anything is dropped, so even if an element's destructor
    /// panics, the block is still released and the buffer is still left released.
    ///
    /// # Examples
    /// ```
    /// # use owned_buffer::OwnedBuffer;
    /// let mut buf = OwnedBuffer::<u8>::new(4);
    /// buf.reset();
    /// buf.reset();
    /// assert!(buf.is_released());
    /// ```
    pub fn reset(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            let len = mem::replace(&mut self.len, 0);
            // SAFETY: The buffer owned ptr, which holds len initialized elements allocated by
            // alloc. It has been detached from self, so it can't be released again.
            unsafe { raw::destroy(ptr, 0..len, len, &self.alloc) }
        }
    }

    /// Releases whatever this buffer holds, then takes ownership of `source`'s storage, leaving
    /// `source` released. No elements are copied and nothing is allocated.
    ///
    /// Assigning a buffer to itself can't be expressed, because `self` and `source` can't alias.
    ///
    /// # Examples
    /// ```
    /// # use owned_buffer::OwnedBuffer;
    /// let mut a = OwnedBuffer::from_fn(2, |i| i);
    /// let mut b = OwnedBuffer::from_fn(3, |i| i + 10);
    /// a.move_from(&mut b);
    /// assert_eq!(&*a, &[10, 11, 12]);
    /// assert!(b.is_released());
    /// ```
    pub fn move_from(&mut self, source: &mut OwnedBuffer<T, A>) {
        self.reset();
        // After the reset, self is released and the swap leaves source released in its place.
        mem::swap(self, source);
    }

    /// Moves the storage out into a new buffer, leaving this one released with a length of zero.
    /// No elements are copied and nothing is allocated.
    ///
    /// # Examples
    /// ```
    /// # use owned_buffer::OwnedBuffer;
    /// let mut a = OwnedBuffer::from_fn(3, |i| i);
    /// let b = a.take();
    /// assert_eq!(a.len(), 0);
    /// assert_eq!(&*b, &[0, 1, 2]);
    /// ```
    pub fn take(&mut self) -> OwnedBuffer<T, A>
    where
        A: Clone,
    {
        let mut out = OwnedBuffer::released_in(self.alloc.clone());
        out.move_from(self);
        out
    }

    fn element_ptr(&self, index: usize) -> NonNull<T> {
        match self.ptr {
            None => ReleasedAccess { index }.panic(),
            Some(_) if index >= self.len => IndexOutOfBounds {
                index,
                len: self.len,
            }
            .panic(),
            // SAFETY: index < len, so the offset is within the allocated block.
            Some(ptr) => unsafe { ptr.add(index) },
        }
    }
}

impl<T: Default, A: RawAlloc> OwnedBuffer<T, A> {
    /// Creates a new buffer of `len` default values in `alloc`.
    ///
    /// # Panics
    /// Panics if the memory layout size exceeds [`isize::MAX`].
    /// Out of memory is reported through [`handle_alloc_error`](std::alloc::handle_alloc_error),
    /// which aborts the process by default.
    pub fn new_in(len: usize, alloc: A) -> OwnedBuffer<T, A> {
        OwnedBuffer::try_new_in(len, alloc).throw()
    }

    /// Creates a new buffer of `len` default values in `alloc`, returning an error if allocation
    /// fails. See [`OwnedBuffer::try_from_fn_in`].
    ///
    /// # Errors
    /// Returns [`AllocError::CapacityOverflow`] if the memory layout size would exceed
    /// [`isize::MAX`], or [`AllocError::OutOfMemory`] if the allocator can't provide the block.
    pub fn try_new_in(len: usize, alloc: A) -> Result<OwnedBuffer<T, A>, AllocError> {
        OwnedBuffer::try_from_fn_in(len, alloc, |_| T::default())
    }
}

impl<T: Clone, A: RawAlloc> OwnedBuffer<T, A> {
    /// Creates a new buffer holding `len` clones of `item` in `alloc`.
    ///
    /// # Errors
    /// Returns [`AllocError::CapacityOverflow`] if the memory layout size would exceed
    /// [`isize::MAX`], or [`AllocError::OutOfMemory`] if the allocator can't provide the block.
    pub fn try_repeat_in(item: T, len: usize, alloc: A) -> Result<OwnedBuffer<T, A>, AllocError> {
        OwnedBuffer::try_from_fn_in(len, alloc, |_| item.clone())
    }
}

impl<T: ZeroValid, A: RawAlloc> OwnedBuffer<T, A> {
    /// Creates a new buffer of `len` zeroed elements in `alloc`, using
    /// [`RawAlloc::allocate_zeroed`] instead of writing each element.
    ///
    /// # Errors
    /// Returns [`AllocError::CapacityOverflow`] if the memory layout size would exceed
    /// [`isize::MAX`], or [`AllocError::OutOfMemory`] if the allocator can't provide the block.
    pub fn try_zeroed_in(len: usize, alloc: A) -> Result<OwnedBuffer<T, A>, AllocError> {
        let layout = Layout::array::<T>(len)?;
        let block = alloc.allocate_zeroed(layout)?;

        // All zero bytes is a valid T, so every element is initialized.
        Ok(OwnedBuffer {
            ptr: Some(block.cast()),
            len,
            alloc,
            _phantom: PhantomData,
        })
    }
}

impl<T: Clone> From<&[T]> for OwnedBuffer<T> {
    /// Creates a buffer holding clones of each element in `items`.
    ///
    /// # Panics
    /// Panics if the memory layout size exceeds [`isize::MAX`].
    /// Out of memory is reported through [`handle_alloc_error`](std::alloc::handle_alloc_error),
    /// which aborts the process by default.
    fn from(items: &[T]) -> Self {
        OwnedBuffer::from_fn(items.len(), |i| items[i].clone())
    }
}

impl<T, const N: usize> From<[T; N]> for OwnedBuffer<T> {
    fn from(items: [T; N]) -> Self {
        let mut items = items.into_iter();
        OwnedBuffer::from_fn(N, |_| items.next().unwrap_or_else(|| unreachable!()))
    }
}

impl<T, A: RawAlloc + Default> Default for OwnedBuffer<T, A> {
    /// Creates a released buffer.
    fn default() -> Self {
        OwnedBuffer::released_in(A::default())
    }
}

impl<T, A: RawAlloc> Drop for OwnedBuffer<T, A> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T, A: RawAlloc> Index<usize> for OwnedBuffer<T, A> {
    type Output = T;

    /// # Panics
    /// Panics if `index` is out of bounds or the buffer has been released.
    fn index(&self, index: usize) -> &Self::Output {
        // SAFETY: element_ptr only returns in-bounds pointers to initialized elements. The
        // returned reference borrows self, so the storage can't be released while it lives.
        unsafe { self.element_ptr(index).as_ref() }
    }
}

impl<T, A: RawAlloc> IndexMut<usize> for OwnedBuffer<T, A> {
    /// # Panics
    /// Panics if `index` is out of bounds or the buffer has been released.
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        // SAFETY: As for index, with the mutable borrow of self guaranteeing exclusive access.
        unsafe { self.element_ptr(index).as_mut() }
    }
}

impl<T, A: RawAlloc> Deref for OwnedBuffer<T, A> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        match self.ptr {
            // SAFETY: The block was allocated with Layout::array(len) and is therefore valid and
            // properly aligned for len elements, all of which are initialized. The borrow checker
            // prevents mutation or release throughout the borrow.
            Some(ptr) => unsafe { slice::from_raw_parts(ptr.as_ptr(), self.len) },
            None => &[],
        }
    }
}

impl<T, A: RawAlloc> DerefMut for OwnedBuffer<T, A> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.ptr {
            // SAFETY: As for deref, with the mutable borrow guaranteeing exclusive access.
            Some(ptr) => unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), self.len) },
            None => &mut [],
        }
    }
}

impl<T, A: RawAlloc> AsRef<[T]> for OwnedBuffer<T, A> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: RawAlloc> AsMut<[T]> for OwnedBuffer<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, A: RawAlloc> Borrow<[T]> for OwnedBuffer<T, A> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, A: RawAlloc> BorrowMut<[T]> for OwnedBuffer<T, A> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

// SAFETY: The buffer uniquely owns its storage, so sending it sends the elements and the
// allocator with it.
unsafe impl<T: Send, A: RawAlloc + Send> Send for OwnedBuffer<T, A> {}
// SAFETY: The safe API follows the borrow checker's rules and there is no interior mutability, so
// shared references only allow shared access to T and A.
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for OwnedBuffer<T, A> {}

impl<T: Clone, A: RawAlloc + Clone> Clone for OwnedBuffer<T, A> {
    /// Deep copies the buffer into a new block from a clone of the same allocator. Cloning a
    /// released buffer produces another released buffer without allocating.
    ///
    /// # Panics
    /// Panics if the memory layout size exceeds [`isize::MAX`]. Out of memory is reported through
    /// [`handle_alloc_error`](std::alloc::handle_alloc_error), which aborts the process by default.
    fn clone(&self) -> Self {
        match self.ptr {
            None => OwnedBuffer::released_in(self.alloc.clone()),
            Some(_) => {
                let items = self.as_slice();
                OwnedBuffer::try_from_fn_in(self.len, self.alloc.clone(), |i| items[i].clone())
                    .throw()
            }
        }
    }
}

impl<T: PartialEq, A: RawAlloc> PartialEq for OwnedBuffer<T, A> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Eq, A: RawAlloc> Eq for OwnedBuffer<T, A> {}

impl<T: Hash, A: RawAlloc> Hash for OwnedBuffer<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

impl<T: Debug, A: RawAlloc> Debug for OwnedBuffer<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("contents", &self.as_slice())
            .field("len", &self.len)
            .field("released", &self.is_released())
            .finish()
    }
}

impl<T: Debug, A: RawAlloc> Display for OwnedBuffer<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
