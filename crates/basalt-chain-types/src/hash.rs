//! Blake2b-256, the chain's canonical hash function.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

/// Blake2b with 256-bit output.
pub type Blake2b256 = Blake2b<U32>;

/// Hash bytes with Blake2b-256.
pub fn blake2b256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    Digest::update(&mut hasher, bytes);
    hasher.finalize().into()
}
