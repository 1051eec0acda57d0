//! NiPoPoW proof verifier.
//!
//! Manages the best known proof and validates new proofs against it.

use super::algos::{max_level_of, GENESIS_LEVEL, MAX_SCAN_LEVEL};
use super::proof::{good_superchain, NipopowProof, PopowParams};
use crate::ConsensusResult;
use basalt_chain_types::{BlockId, Header};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Result of verifying a NiPoPoW proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NipopowVerificationResult {
    /// The new proof represents a better chain.
    BetterChain {
        /// Number of proofs processed so far.
        proofs_processed: u32,
    },
    /// The existing proof is still the best.
    NoBetterChain {
        /// Number of proofs processed so far.
        proofs_processed: u32,
    },
    /// The proof failed validation.
    ValidationError {
        /// Error message.
        message: String,
    },
    /// The proof has a different genesis block.
    WrongGenesis,
}

/// NiPoPoW proof verifier.
///
/// Maintains the best known proof and validates new proofs against it.
/// Used for light-client bootstrap and quick chain synchronization. The
/// caller serializes access; see the node's chain-view holder.
#[derive(Debug)]
pub struct NipopowVerifier {
    /// Expected genesis block id (if known).
    genesis_id: Option<BlockId>,
    /// Best proof seen so far.
    best_proof: Option<NipopowProof>,
    /// Number of proofs processed.
    proofs_processed: u32,
    /// Minimum number of proofs required before accepting.
    min_proofs: u32,
    /// Whether to apply the good-superchain predicate on top of the
    /// structural checks.
    check_goodness: bool,
    /// Protocol parameters.
    params: PopowParams,
}

impl NipopowVerifier {
    /// Create a new verifier with default parameters.
    pub fn new() -> Self {
        Self {
            genesis_id: None,
            best_proof: None,
            proofs_processed: 0,
            min_proofs: 1,
            check_goodness: false,
            params: PopowParams::default(),
        }
    }

    /// Create a verifier pinned to a known genesis block.
    pub fn with_genesis(genesis_id: BlockId) -> Self {
        Self {
            genesis_id: Some(genesis_id),
            ..Self::new()
        }
    }

    /// Create a verifier with custom parameters.
    pub fn with_params(params: PopowParams, min_proofs: u32, check_goodness: bool) -> Self {
        Self {
            min_proofs,
            check_goodness,
            params,
            ..Self::new()
        }
    }

    /// Get the current best proof.
    pub fn best_proof(&self) -> Option<&NipopowProof> {
        self.best_proof.as_ref()
    }

    /// Get the best chain tip height.
    pub fn best_height(&self) -> Option<u32> {
        self.best_proof.as_ref().map(|p| p.tip_height())
    }

    /// Get the number of proofs processed.
    pub fn proofs_processed(&self) -> u32 {
        self.proofs_processed
    }

    /// Check if enough proofs were seen to proceed.
    pub fn has_quorum(&self) -> bool {
        self.proofs_processed >= self.min_proofs && self.best_proof.is_some()
    }

    /// Get the expected genesis id.
    pub fn genesis_id(&self) -> Option<&BlockId> {
        self.genesis_id.as_ref()
    }

    /// Set the expected genesis id.
    pub fn set_genesis_id(&mut self, id: BlockId) {
        self.genesis_id = Some(id);
    }

    /// Process a new proof.
    ///
    /// Returns whether this proof represents a better chain than the
    /// current best.
    pub fn process(&mut self, proof: NipopowProof) -> NipopowVerificationResult {
        self.proofs_processed += 1;

        if let Err(e) = proof.validate() {
            warn!(error = %e, "Invalid NiPoPoW proof");
            return NipopowVerificationResult::ValidationError {
                message: e.to_string(),
            };
        }

        if let Some(expected_genesis) = &self.genesis_id {
            if let Some(proof_genesis) = proof.genesis_id() {
                if &proof_genesis != expected_genesis {
                    warn!(
                        expected = %expected_genesis,
                        got = %proof_genesis,
                        "NiPoPoW proof has wrong genesis"
                    );
                    return NipopowVerificationResult::WrongGenesis;
                }
            }
        }

        if self.check_goodness {
            if let Err(e) = self.check_prefix_goodness(&proof) {
                warn!(error = %e, "NiPoPoW proof prefix is not good");
                return NipopowVerificationResult::ValidationError {
                    message: e.to_string(),
                };
            }
        }

        // Learn the genesis from the first valid proof.
        if self.genesis_id.is_none() {
            if let Some(genesis) = proof.genesis_id() {
                info!(genesis = %genesis, "Learned genesis from proof");
                self.genesis_id = Some(genesis);
            }
        }

        let is_better = match &self.best_proof {
            None => {
                info!(height = proof.tip_height(), "First NiPoPoW proof received");
                true
            }
            Some(current_best) => {
                if proof.is_better_than(current_best) {
                    info!(
                        old_height = current_best.tip_height(),
                        new_height = proof.tip_height(),
                        "Found better NiPoPoW proof"
                    );
                    true
                } else {
                    debug!(
                        current_height = current_best.tip_height(),
                        proof_height = proof.tip_height(),
                        "NiPoPoW proof not better than current"
                    );
                    false
                }
            }
        };

        if is_better {
            self.best_proof = Some(proof);
            NipopowVerificationResult::BetterChain {
                proofs_processed: self.proofs_processed,
            }
        } else {
            NipopowVerificationResult::NoBetterChain {
                proofs_processed: self.proofs_processed,
            }
        }
    }

    /// Apply the good-superchain predicate at every level represented in
    /// the proof's prefix tail.
    fn check_prefix_goodness(&self, proof: &NipopowProof) -> ConsensusResult<()> {
        let chain: Vec<&Header> = proof.prefix.iter().collect();
        let levels: BTreeSet<u32> = proof
            .prefix
            .iter()
            .skip(1)
            .map(max_level_of)
            .filter(|&l| l >= 1 && l != GENESIS_LEVEL)
            .map(|l| l.min(MAX_SCAN_LEVEL))
            .collect();

        for level in levels {
            let super_chain = proof.headers_of_level(level);
            good_superchain(&chain, &super_chain, level, &self.params)?;
        }
        Ok(())
    }

    /// Reset the verifier state. The pinned genesis is kept.
    pub fn reset(&mut self) {
        self.best_proof = None;
        self.proofs_processed = 0;
    }

    /// Headers from the best proof, for applying to history.
    ///
    /// Returns `None` until quorum is reached.
    pub fn headers_to_apply(&self) -> Option<Vec<&Header>> {
        if !self.has_quorum() {
            return None;
        }
        self.best_proof.as_ref().map(|p| p.headers_chain())
    }
}

impl Default for NipopowVerifier {
    fn default() -> Self {
        Self::new()
    }
}
