use std::alloc::{Layout, LayoutError};

use derive_more::{Display, Error, From, IsVariant};

/// The requested number of elements would produce an allocation larger than [`isize::MAX`] bytes.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("capacity overflow")]
pub struct CapacityOverflow;

/// The allocator was unable to provide a block for the requested layout.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[display("failed to allocate {size} bytes with alignment {align}")]
pub struct OutOfMemory {
    /// The size of the requested block in bytes.
    pub size: usize,
    /// The alignment of the requested block.
    pub align: usize,
}

impl From<Layout> for OutOfMemory {
    fn from(layout: Layout) -> Self {
        OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        }
    }
}

/// The only recoverable error produced when constructing a buffer. In both cases, nothing has
/// been allocated (or everything that was has already been released) by the time the caller sees
/// it.
#[derive(Debug, Display, Error, From, IsVariant, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// See [`CapacityOverflow`].
    CapacityOverflow(CapacityOverflow),
    /// See [`OutOfMemory`].
    OutOfMemory(OutOfMemory),
}

impl From<LayoutError> for AllocError {
    fn from(_: LayoutError) -> Self {
        AllocError::CapacityOverflow(CapacityOverflow)
    }
}
