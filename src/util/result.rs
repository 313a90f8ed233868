use std::alloc::{self, Layout};

use crate::alloc::AllocError;

pub(crate) trait AllocResultExtension<T> {
    /// Unwraps the result of an allocation for the infallible constructors.
    ///
    /// Running out of memory is forwarded to [`alloc::handle_alloc_error`] as recommended, rather
    /// than panicking and risking further allocation while unwinding.
    ///
    /// # Panics
    /// Panics with the error's message on [`AllocError::CapacityOverflow`].
    fn throw(self) -> T;
}

impl<T> AllocResultExtension<T> for Result<T, AllocError> {
    fn throw(self) -> T {
        match self {
            Ok(val) => val,
            Err(AllocError::OutOfMemory(oom)) => match Layout::from_size_align(oom.size, oom.align) {
                Ok(layout) => alloc::handle_alloc_error(layout),
                Err(_) => panic!("{}", oom),
            },
            Err(error) => panic!("{}", error),
        }
    }
}
