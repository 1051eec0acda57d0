//! # basalt-chain-types
//!
//! Canonical chain primitives for the Basalt node.
//!
//! This crate provides:
//! - Fixed-width block identifiers
//! - Blake2b-256 hashing (the chain's canonical hash function)
//! - The block header view consumed by the proof subsystem, with its
//!   consensus-critical byte codec
//!
//! Everything here is consensus-visible. The header byte layout and the
//! id derivation rule (`id = blake2b256(canonical_bytes)`) must stay
//! bit-exact across implementations.

mod block_id;
mod error;
mod hash;
mod header;

pub use block_id::{BlockId, BLOCK_ID_LEN};
pub use error::{ChainTypesError, ChainTypesResult};
pub use hash::{blake2b256, Blake2b256};
pub use header::{Header, PowSolution, MAX_DISTANCE_BYTES, MAX_INTERLINKS};

/// Height of the genesis block.
pub const GENESIS_HEIGHT: u32 = 1;
