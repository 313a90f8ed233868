use std::cell::Cell;
use std::rc::Rc;

/// An element type with no size, for checking that buffers never touch the allocator's memory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZeroSizedType;

/// A shared tally of how many [`Tracked`] elements have been dropped.
#[derive(Debug, Default)]
pub struct DropTally(Rc<Cell<usize>>);

impl DropTally {
    pub fn new() -> DropTally {
        DropTally::default()
    }

    /// Hands out an element that adds one to this tally when dropped. Clones of it count
    /// separately.
    pub fn track(&self) -> Tracked {
        Tracked(Rc::clone(&self.0))
    }

    /// The number of elements dropped so far.
    pub fn dropped(&self) -> usize {
        self.0.get()
    }

    /// Returns the number of elements dropped so far and starts counting again from zero.
    pub fn take(&self) -> usize {
        self.0.take()
    }
}

/// An element whose drop is recorded by the [`DropTally`] that created it.
#[derive(Debug)]
pub struct Tracked(Rc<Cell<usize>>);

impl Clone for Tracked {
    fn clone(&self) -> Tracked {
        Tracked(Rc::clone(&self.0))
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}
