//! This crate provides [`OwnedBuffer`], a fixed-length array on the heap that has exactly one
//! owner at a time and is released exactly once.
//!
//! # Purpose
//! Rust already gives us [`Box<[T]>`](Box) and [`Vec`], so this is mostly a learning exercise in
//! writing the ownership rules down explicitly: what happens to a buffer when its storage is moved
//! out from behind a `&mut`, when an element's constructor panics halfway through, or when it is
//! dropped after already being released. Each of those cases is spelled out and tested here.
//!
//! # Ownership
//! Moving a buffer by value is just a Rust move and the compiler stops you from touching the old
//! binding. When ownership has to be transferred out of a place that stays alive, use
//! [`OwnedBuffer::take`] or [`OwnedBuffer::move_from`], which leave the source *released*: no
//! storage and a length of zero. Releasing is idempotent, so dropping a released buffer does
//! nothing.
//!
//! # Error Handling
//! There are two kinds of failure and they are handled differently:
//! - Allocation failure is an environmental condition, so the `try_*` constructors return an
//!   [`AllocError`](alloc::AllocError). The plain constructors panic on capacity overflow and call
//!   [`handle_alloc_error`](std::alloc::handle_alloc_error) when out of memory, like the standard
//!   collections do.
//! - Indexing out of bounds or indexing a released buffer is a programming error, so it always
//!   panics. There is no checked variant that returns an error, although [`slice::get`] is still
//!   available through [`Deref`](std::ops::Deref).
//!
//! Releasing storage never fails. The allocator's release operation has no error to report.
//!
//! # Allocators
//! Storage comes from a [`RawAlloc`](alloc::RawAlloc), which is [`Global`](alloc::Global) unless
//! specified. The `malloc` feature (enabled by default) adds [`Malloc`](alloc::Malloc), which uses
//! the C library directly through `libc`. [`Counting`](alloc::Counting) wraps another allocator
//! and keeps track of allocations and releases, which is what the tests use to check that nothing
//! leaks or gets freed twice.
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod alloc;
pub mod buffer;

pub(crate) mod util;

#[doc(inline)]
pub use buffer::OwnedBuffer;
