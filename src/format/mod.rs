pub mod dlf;
pub mod fts;
pub mod llf;
pub mod writer;

use std::fmt;

use crate::error::Result;
use crate::types::{DlfRecord, FtsRecord, LlfRecord};

/// The three files that make up a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelFormat {
    Fts,
    Dlf,
    Llf,
}

impl fmt::Display for LevelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFormat::Fts => write!(f, "FTS"),
            LevelFormat::Dlf => write!(f, "DLF"),
            LevelFormat::Llf => write!(f, "LLF"),
        }
    }
}

/// Length of the uncompressed header at the start of an encoded file.
pub fn header_size(raw: &[u8], format: LevelFormat) -> Result<usize> {
    match format {
        LevelFormat::Fts => fts::header_size(raw),
        LevelFormat::Dlf => Ok(dlf::HEADER_SIZE),
        LevelFormat::Llf => Ok(0),
    }
}

/// A level record that serializes to one of the level formats.
pub trait LevelEncoding {
    const FORMAT: LevelFormat;

    fn encode(&self) -> Result<Vec<u8>>;
}

impl LevelEncoding for FtsRecord {
    const FORMAT: LevelFormat = LevelFormat::Fts;

    fn encode(&self) -> Result<Vec<u8>> {
        fts::encode(self)
    }
}

impl LevelEncoding for DlfRecord {
    const FORMAT: LevelFormat = LevelFormat::Dlf;

    fn encode(&self) -> Result<Vec<u8>> {
        dlf::encode(self)
    }
}

impl LevelEncoding for LlfRecord {
    const FORMAT: LevelFormat = LevelFormat::Llf;

    fn encode(&self) -> Result<Vec<u8>> {
        llf::encode(self)
    }
}
