//! Core NiPoPoW algorithms: header levels and chain algebra.

use crate::difficulty::pow_target;
use basalt_chain_types::Header;
use num_bigint::BigUint;
use num_traits::Zero;

/// Sentinel level for the genesis header, which participates in every
/// superchain.
pub const GENESIS_LEVEL: u32 = u32::MAX;

/// Highest level the scoring scan and the goodness checks will visit.
/// Real chains top out far below this; the cap bounds work on
/// adversarial input.
pub(crate) const MAX_SCAN_LEVEL: u32 = 256;

/// Compute the maximum superchain level (μ) of a header.
///
/// The level is the largest μ such that `d * 2^μ <= T_required`, i.e.
/// `floor(log2(T_required / d))`. Genesis returns [`GENESIS_LEVEL`].
///
/// A distance of zero or one exceeding the target clamps to 0; a valid
/// PoW header can never sit below level 0.
pub fn max_level_of(header: &Header) -> u32 {
    if header.is_genesis() {
        return GENESIS_LEVEL;
    }

    let target = pow_target(header.n_bits());
    let distance = header.solution().d();
    if distance.is_zero() || *distance > target {
        return 0;
    }

    let ratio: BigUint = target / distance;
    // floor(log2(ratio)) for ratio >= 1
    (ratio.bits() - 1) as u32
}

/// Subsequence of `chain` whose headers reach `level`, order preserved.
pub fn filter_by_level(chain: &[Header], level: u32) -> Vec<&Header> {
    chain.iter().filter(|h| max_level_of(h) >= level).collect()
}

/// Lowest common ancestor of two ordered chains.
///
/// The chains must agree on their first element (the shared genesis
/// anchor); otherwise there is no common ancestor. Comparison is by id.
pub fn lowest_common_ancestor<'a>(a: &'a [Header], b: &[Header]) -> Option<&'a Header> {
    let (head_a, head_b) = (a.first()?, b.first()?);
    if head_a.id() != head_b.id() {
        return None;
    }

    let mut i = 1;
    while i < a.len() && i < b.len() && a[i].id() == b[i].id() {
        i += 1;
    }
    Some(&a[i - 1])
}

/// Proof-strength score of a chain segment.
///
/// The level-0 candidate `|chain|` is always available; for each level μ
/// with at least `m` superchain members the candidate is `2^μ * |C↑μ|`.
/// The scan stops at the first level with fewer than `m` members (and
/// never visits levels above [`MAX_SCAN_LEVEL`]); the score saturates at
/// `u64::MAX`.
pub fn best_arg(chain: &[Header], m: i32) -> u64 {
    let levels: Vec<u32> = chain.iter().map(max_level_of).collect();
    best_arg_of_levels(&levels, m)
}

pub(crate) fn best_arg_of_levels(levels: &[u32], m: i32) -> u64 {
    if levels.is_empty() {
        return 0;
    }
    let m = usize::try_from(m).unwrap_or(0).max(1);

    let mut best = levels.len() as u64;
    for level in 1..=MAX_SCAN_LEVEL {
        let count = levels.iter().filter(|&&l| l >= level).count();
        if count < m {
            break;
        }
        best = best.max(score(level, count));
    }
    best
}

fn score(level: u32, count: usize) -> u64 {
    if level >= 64 {
        return u64::MAX;
    }
    (count as u64)
        .checked_mul(1u64 << level)
        .unwrap_or(u64::MAX)
}
