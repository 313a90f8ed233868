use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ptr::{self, NonNull};
use std::slice;

use super::OwnedBuffer;
use super::raw;
use crate::alloc::{Global, RawAlloc};

impl<T, A: RawAlloc> IntoIterator for OwnedBuffer<T, A> {
    type Item = T;

    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        let mut this = ManuallyDrop::new(self);
        let ptr = this.ptr.take();
        let len = this.len;

        IntoIter {
            ptr,
            head: 0,
            tail: len,
            len,
            // SAFETY: The buffer is never dropped or used again, so the allocator is moved rather
            // than duplicated.
            alloc: unsafe { ptr::read(&this.alloc) },
            _phantom: PhantomData,
        }
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a OwnedBuffer<T, A> {
    type Item = &'a T;

    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: RawAlloc> IntoIterator for &'a mut OwnedBuffer<T, A> {
    type Item = &'a mut T;

    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An owned iterator over the elements of an [`OwnedBuffer`]. See [`OwnedBuffer::into_iter`].
///
/// The iterator takes over the buffer's storage. Dropping it drops any elements that haven't been
/// yielded and releases the storage.
pub struct IntoIter<T, A: RawAlloc = Global> {
    ptr: Option<NonNull<T>>,
    /// Elements in `head..tail` haven't been yielded yet.
    head: usize,
    tail: usize,
    len: usize,
    alloc: A,
    _phantom: PhantomData<T>,
}

impl<T, A: RawAlloc> IntoIter<T, A> {
    /// Returns the remaining elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self.ptr {
            // SAFETY: Elements in head..tail are initialized and within the block.
            Some(ptr) => unsafe {
                slice::from_raw_parts(ptr.add(self.head).as_ptr(), self.tail - self.head)
            },
            None => &[],
        }
    }
}

impl<T, A: RawAlloc> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: The iterator owns the block, which was allocated by alloc for len elements,
            // and only head..tail are still initialized.
            unsafe { raw::destroy(ptr, self.head..self.tail, self.len, &self.alloc) }
        }
    }
}

impl<T, A: RawAlloc> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.head == self.tail {
            return None;
        }

        let ptr = self.ptr?;
        // SAFETY: head < tail, so the element is initialized. Incrementing head afterwards moves
        // it out of the block so it won't be read or dropped again.
        let value = unsafe { ptr.add(self.head).read() };
        self.head += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.tail - self.head;
        (len, Some(len))
    }
}

impl<T, A: RawAlloc> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.head == self.tail {
            return None;
        }

        let ptr = self.ptr?;
        self.tail -= 1;
        // SAFETY: The newly decremented tail is still >= head, so the element is initialized and
        // now excluded from the remaining range.
        let value = unsafe { ptr.add(self.tail).read() };
        Some(value)
    }
}

impl<T, A: RawAlloc> FusedIterator for IntoIter<T, A> {}

impl<T, A: RawAlloc> ExactSizeIterator for IntoIter<T, A> {
    fn len(&self) -> usize {
        self.tail - self.head
    }
}

// SAFETY: IntoIter uniquely owns the remaining elements and the storage, like OwnedBuffer.
unsafe impl<T: Send, A: RawAlloc + Send> Send for IntoIter<T, A> {}
// SAFETY: Shared references only allow shared access through as_slice.
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for IntoIter<T, A> {}
