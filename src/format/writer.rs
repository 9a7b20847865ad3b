use glam::Vec3;

use crate::error::{LevelCompilerError, Result};
use crate::types::level::Angle;

/// Little-endian byte sink for the level formats.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_vec3(&mut self, value: Vec3) {
        self.write_f32(value.x);
        self.write_f32(value.y);
        self.write_f32(value.z);
    }

    pub fn write_angle(&mut self, value: Angle) {
        self.write_f32(value.a);
        self.write_f32(value.b);
        self.write_f32(value.g);
    }

    /// Append `count` zero bytes (padding and reserved fields).
    pub fn write_zeros(&mut self, count: usize) {
        self.buf.resize(self.buf.len() + count, 0);
    }

    /// Write a count field, failing if it does not fit an `i32`.
    pub fn write_count(&mut self, what: &str, count: usize) -> Result<()> {
        let value = i32::try_from(count).map_err(|_| {
            LevelCompilerError::Encoding(format!("{what} count {count} does not fit in 32 bits"))
        })?;
        self.write_i32(value);
        Ok(())
    }

    /// Write `value` as a NUL-padded, `len`-byte Latin-1 string.
    ///
    /// At least one terminating NUL must fit; longer strings are rejected.
    pub fn write_fixed_str(&mut self, value: &str, len: usize) -> Result<()> {
        let encoded = value
            .chars()
            .map(|c| u8::try_from(u32::from(c)))
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|_| {
                LevelCompilerError::Encoding(format!("\"{value}\" is not representable in Latin-1"))
            })?;
        if encoded.len() >= len {
            return Err(LevelCompilerError::Encoding(format!(
                "\"{value}\" does not fit a {len}-byte string field"
            )));
        }
        self.write_fixed_bytes(&encoded, len)
    }

    /// Write raw bytes zero-padded to `len`.
    pub fn write_fixed_bytes(&mut self, value: &[u8], len: usize) -> Result<()> {
        if value.len() > len {
            return Err(LevelCompilerError::Encoding(format!(
                "{} bytes do not fit a {len}-byte field",
                value.len()
            )));
        }
        self.buf.extend_from_slice(value);
        self.write_zeros(len - value.len());
        Ok(())
    }

    /// Overwrite four bytes at `offset` with `value`.
    pub fn patch_i32(&mut self, offset: usize, value: i32) -> Result<()> {
        let slot = self.buf.get_mut(offset..offset + 4).ok_or_else(|| {
            LevelCompilerError::Encoding(format!("patch offset {offset} outside buffer"))
        })?;
        slot.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
