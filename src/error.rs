use std::io;

use crate::format::LevelFormat;

/// All error types for the level compiler.
#[derive(thiserror::Error, Debug)]
pub enum LevelCompilerError {
    #[error("Input error: {0}")]
    Input(String),
    #[error("Malformed mesh: {0}")]
    MalformedMesh(String),
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error(
        "Header mismatch: {format} header is {header_len} bytes but the encoded file is only {available} bytes"
    )]
    HeaderMismatch {
        format: LevelFormat,
        header_len: usize,
        available: usize,
    },
    #[error("Compression error: {0}")]
    Compression(String),
    #[error("Output error: {0}")]
    Output(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LevelCompilerError>;
