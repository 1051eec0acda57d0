//! Shared test helpers for NiPoPoW tests.
//!
//! Builds really-hashed chains whose header levels are crafted exactly:
//! with difficulty 2^16 the required target is 2^240, so a distance of
//! `2^(240 - level)` lands a header at precisely `level`.

use super::interlinks::update_interlinks;
use basalt_chain_types::{BlockId, Header, PowSolution, GENESIS_HEIGHT};
use num_bigint::BigUint;

/// nBits decoding to difficulty 2^16.
pub(crate) const TEST_NBITS: u32 = 0x0301_0000;

/// Distance that puts a header at exactly `level` under [`TEST_NBITS`].
pub(crate) fn distance_for_level(level: u32) -> BigUint {
    assert!(level <= 240);
    BigUint::from(1u8) << (240 - level as usize)
}

/// The genesis header: height 1, zero parent, empty interlinks.
pub(crate) fn make_genesis() -> Header {
    Header::new(
        BlockId::zero(),
        GENESIS_HEIGHT,
        TEST_NBITS,
        PowSolution::new(distance_for_level(0)),
        vec![],
    )
}

/// A child of `parent` at exactly `level`, with correct interlinks.
pub(crate) fn make_child(parent: &Header, level: u32) -> Header {
    make_child_variant(parent, level, 0)
}

/// Like [`make_child`], with the distance nudged by `salt` so siblings
/// of the same level get distinct ids. The nudge never changes the level.
pub(crate) fn make_child_variant(parent: &Header, level: u32, salt: u8) -> Header {
    Header::new(
        parent.id(),
        parent.height() + 1,
        TEST_NBITS,
        PowSolution::new(distance_for_level(level) - BigUint::from(salt)),
        update_interlinks(parent),
    )
}

/// A linked chain: genesis followed by one header per entry of `levels`.
pub(crate) fn make_chain(levels: &[u32]) -> Vec<Header> {
    let mut chain = vec![make_genesis()];
    for &level in levels {
        let child = make_child(chain.last().expect("chain is non-empty"), level);
        chain.push(child);
    }
    chain
}

/// Borrowed view of a chain, as the goodness predicate consumes it.
pub(crate) fn refs(chain: &[Header]) -> Vec<&Header> {
    chain.iter().collect()
}
