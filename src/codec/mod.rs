#[cfg(test)]
pub(crate) mod explode;
pub mod implode;

use crate::error::Result;

pub use implode::Implode;

/// Lossless byte compressor applied to level file bodies.
pub trait Compressor: Send + Sync {
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>>;
}
