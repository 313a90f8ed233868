/// Types for which a value with every byte set to zero is valid, allowing buffers of them to be
/// created from a single zeroed allocation. See [`OwnedBuffer::zeroed`](super::OwnedBuffer::zeroed).
///
/// # Safety
/// The all-zero bit pattern must be a valid, initialized value of the implementing type, and the
/// type must not need to be dropped.
pub unsafe trait ZeroValid {}

macro_rules! impl_zero_valid {
    ($($ty:ty),* $(,)?) => {
        $(
            // SAFETY: Zero is a valid value for every primitive numeric type, false for bool and
            // '\0' for char. None of them implement Drop.
            unsafe impl ZeroValid for $ty {}
        )*
    };
}

impl_zero_valid! {
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64, bool, char,
}
