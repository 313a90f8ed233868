use derive_more::{Display, Error};

use super::panic::Panic;

#[derive(Debug, Display, Error)]
#[display("index {index} out of bounds for buffer with {len} elements")]
pub struct IndexOutOfBounds {
    pub index: usize,
    pub len: usize,
}
impl Panic for IndexOutOfBounds {}

#[derive(Debug, Display, Error)]
#[display("index {index} accessed on a buffer that has been moved out of or released")]
pub struct ReleasedAccess {
    pub index: usize,
}
impl Panic for ReleasedAccess {}
