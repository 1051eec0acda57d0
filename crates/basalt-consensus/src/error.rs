//! Error types for consensus validation.

use thiserror::Error;

/// Errors surfaced by proof decoding, validation, and acceptance checks.
///
/// None of these are retried inside the core; the caller decides whether
/// to drop the enclosing message and penalize the peer.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// Proof bytes could not be decoded.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// The suffix does not carry exactly `k` headers.
    #[error("invalid suffix length: expected {expected}, got {got}")]
    InvalidSuffixLength { expected: i32, got: usize },

    /// Some represented level's prefix group size differs from `m`.
    #[error("invalid prefix length at level {level}: expected {expected}, got {got}")]
    InvalidPrefixLength {
        level: u32,
        expected: i32,
        got: usize,
    },

    /// A prefix-tail header does not point back at the proof's genesis.
    #[error("chain not anchored: header {header} does not link to genesis")]
    ChainNotAnchored { header: String },

    /// Super-chain quality check failed at the given level.
    #[error("weak superchain at level {level}")]
    WeakSuperChain { level: u32 },

    /// Multi-level quality check failed between two levels.
    #[error("weak multi-level quality at level {level}, sub-level {sub_level}")]
    WeakMultiLevel { level: u32, sub_level: u32 },
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
