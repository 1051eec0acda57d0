//! Error types for chain primitives.

use thiserror::Error;

/// Errors from parsing or constructing chain primitives.
#[derive(Error, Debug)]
pub enum ChainTypesError {
    /// Input ended before the named field could be read.
    #[error("truncated input while reading {0}")]
    Truncated(&'static str),

    /// Bytes were left over after a complete value was read.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// A length-prefixed field exceeded its allocation cap.
    #[error("{field} too large: {len} exceeds {max}")]
    FieldTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A field was not in its canonical encoding.
    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    /// Hex string had an unexpected byte length.
    #[error("invalid hex length: expected {expected} bytes, got {got} bytes")]
    InvalidHexLength { expected: usize, got: usize },

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Result type for chain primitive operations.
pub type ChainTypesResult<T> = Result<T, ChainTypesError>;
