//! # basalt-consensus
//!
//! Consensus rules for the Basalt blockchain.
//!
//! This crate provides:
//! - The compact difficulty encoding ("nBits") and required-target derivation
//! - NiPoPoW proof validation, comparison, and wire (de)serialization
//!
//! ## NiPoPoW
//!
//! Non-Interactive Proofs of Proof-of-Work let a light verifier accept a
//! chain by examining a compact certificate instead of every header. The
//! [`popow`] module holds the whole proof core: header levels, interlink
//! maintenance, chain algebra, the proof object, and the verifier shell
//! that tracks the best proof seen so far.

mod difficulty;
mod error;
pub mod popow;

pub use difficulty::{base_q, decode_compact, encode_compact, pow_target};
pub use error::{ConsensusError, ConsensusResult};
