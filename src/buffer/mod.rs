//! A module containing [`OwnedBuffer`] and associated types.
//!
//! [`IntoIter`] provides owned iteration over a buffer. [`IterMut`](std::slice::IterMut) and
//! [`Iter`](std::slice::Iter) from [`std::slice`] are used for borrowed iteration.
//!
//! [`OwnedBuffer`] is also re-exported from the crate root.

mod buffer;
mod iter;
mod raw;
mod zero;

pub use buffer::*;
pub use iter::*;
pub use zero::*;
