//! NiPoPoW (Non-Interactive Proofs of Proof-of-Work) support.
//!
//! This module implements the proof side of NiPoPoW as described in the
//! KMZ17 paper (FC20 version). It provides:
//! - Header level computation and interlink maintenance
//! - Chain algebra (superchain filtering, LCA, proof scores)
//! - Proof validation, comparison, and the canonical wire codec
//! - A verifier shell for light-client bootstrap
//!
//! # Key Concepts
//!
//! - **Level (μ)**: how far a header's PoW distance undershot its target,
//!   in powers of two
//! - **Superchain `C↑μ`**: the subsequence of a chain at level ≥ μ
//! - **Interlinks**: a per-header vector of ancestor ids forming a
//!   skip-list over levels; entry 0 is always the genesis id
//! - **Proof**: a superchain prefix plus the last `k` headers, scored by
//!   `best_arg` and compared at the fork point

mod algos;
mod interlinks;
mod proof;
#[cfg(test)]
pub(crate) mod test_helpers;
mod verifier;

pub use algos::{
    best_arg, filter_by_level, lowest_common_ancestor, max_level_of, GENESIS_LEVEL,
};
pub use interlinks::update_interlinks;
pub use proof::{good_superchain, NipopowProof, PopowParams};
pub use verifier::{NipopowVerificationResult, NipopowVerifier};

/// Modifier type byte carried by proofs in the network envelope.
pub const POPOW_PROOF_MODIFIER_TYPE: u8 = 0x6E;

/// Default security parameter (superchain density).
pub const DEFAULT_M: i32 = 30;

/// Default suffix length.
pub const DEFAULT_K: i32 = 30;

/// Default multi-level quality threshold.
pub const DEFAULT_K1: i32 = 6;

/// Default goodness slack.
pub const DEFAULT_DELTA: f64 = 0.25;
