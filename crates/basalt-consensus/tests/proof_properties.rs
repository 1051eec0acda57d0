//! Property-based tests for the NiPoPoW proof core.
//!
//! Chains are generated bottom-up with crafted levels (difficulty 2^16,
//! so a distance of 2^(240 - level) sits at exactly `level`), then the
//! invariants of the codec, the id rule, and the comparator are checked
//! with shrinking support.

use basalt_chain_types::{blake2b256, BlockId, Header, PowSolution, GENESIS_HEIGHT};
use basalt_consensus::popow::{
    best_arg, lowest_common_ancestor, max_level_of, update_interlinks, NipopowProof,
};
use num_bigint::BigUint;
use proptest::prelude::*;

/// nBits decoding to difficulty 2^16.
const TEST_NBITS: u32 = 0x0301_0000;

fn distance_for_level(level: u32) -> BigUint {
    BigUint::from(1u8) << (240 - level as usize)
}

fn make_genesis() -> Header {
    Header::new(
        BlockId::zero(),
        GENESIS_HEIGHT,
        TEST_NBITS,
        PowSolution::new(distance_for_level(0)),
        vec![],
    )
}

fn make_chain(levels: &[u32]) -> Vec<Header> {
    let mut chain = vec![make_genesis()];
    for &level in levels {
        let parent = chain.last().expect("chain is non-empty");
        chain.push(Header::new(
            parent.id(),
            parent.height() + 1,
            TEST_NBITS,
            PowSolution::new(distance_for_level(level)),
            update_interlinks(parent),
        ));
    }
    chain
}

/// Generate header levels for a chain tail.
fn arb_levels() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..6, 1..40)
}

/// Generate a proof over a generated chain; the last `k` headers form
/// the suffix. Density is not enforced: codec properties hold for any
/// structurally complete proof.
fn arb_proof() -> impl Strategy<Value = NipopowProof> {
    (arb_levels(), 1usize..5, 1i32..50).prop_map(|(levels, k, m)| {
        let chain = make_chain(&levels);
        let k = k.min(chain.len() - 1);
        let split = chain.len() - k;
        NipopowProof::new(
            m,
            k as i32,
            chain[..split].to_vec(),
            chain[split..].to_vec(),
        )
    })
}

proptest! {
    #[test]
    fn prop_codec_roundtrip(proof in arb_proof()) {
        let bytes = proof.serialize();
        let parsed = NipopowProof::parse(&bytes).unwrap();
        prop_assert_eq!(&parsed, &proof);
        prop_assert_eq!(parsed.size, Some(bytes.len()));
    }

    #[test]
    fn prop_proof_id_is_hash_of_encoding(proof in arb_proof()) {
        prop_assert_eq!(proof.id(), blake2b256(&proof.serialize()));
    }

    #[test]
    fn prop_header_codec_roundtrip(levels in arb_levels()) {
        for header in make_chain(&levels) {
            let parsed = Header::parse(&header.canonical_bytes()).unwrap();
            prop_assert_eq!(parsed, header);
        }
    }

    #[test]
    fn prop_levels_are_non_negative_and_genesis_is_sentinel(levels in arb_levels()) {
        let chain = make_chain(&levels);
        prop_assert_eq!(max_level_of(&chain[0]), u32::MAX);
        for (header, &expected) in chain[1..].iter().zip(levels.iter()) {
            prop_assert_eq!(max_level_of(header), expected);
        }
    }

    #[test]
    fn prop_best_arg_at_least_length(levels in arb_levels(), m in 1i32..50) {
        let chain = make_chain(&levels);
        let tail = &chain[1..];
        prop_assert!(best_arg(tail, m) >= tail.len() as u64);
    }

    #[test]
    fn prop_lca_of_chain_with_itself_is_tip(levels in arb_levels()) {
        let chain = make_chain(&levels);
        let lca = lowest_common_ancestor(&chain, &chain).unwrap();
        prop_assert_eq!(lca.id(), chain.last().unwrap().id());
    }

    #[test]
    fn prop_comparator_antisymmetric(
        shared in arb_levels(),
        fork_a in arb_levels(),
        fork_b in arb_levels(),
        m in 1i32..10,
    ) {
        let base = make_chain(&shared);

        let mut a_prefix = base.clone();
        for &level in &fork_a {
            let parent = a_prefix.last().unwrap();
            a_prefix.push(Header::new(
                parent.id(),
                parent.height() + 1,
                TEST_NBITS,
                PowSolution::new(distance_for_level(level) - BigUint::from(1u8)),
                update_interlinks(parent),
            ));
        }
        let mut b_prefix = base.clone();
        for &level in &fork_b {
            let parent = b_prefix.last().unwrap();
            b_prefix.push(Header::new(
                parent.id(),
                parent.height() + 1,
                TEST_NBITS,
                PowSolution::new(distance_for_level(level) - BigUint::from(2u8)),
                update_interlinks(parent),
            ));
        }

        let a = NipopowProof::new(m, 0, a_prefix, vec![]);
        let b = NipopowProof::new(m, 0, b_prefix, vec![]);

        // Strictly-better is antisymmetric, and a proof never beats itself.
        prop_assert!(!(a.is_better_than(&b) && b.is_better_than(&a)));
        prop_assert!(!a.is_better_than(&a));
        prop_assert!(!b.is_better_than(&b));
    }
}
