//! Interlink vector maintenance.
//!
//! Every non-genesis header carries a vector of ancestor ids: entry 0 is
//! the genesis id, entry `i >= 1` the most recent ancestor of level `>= i`.

use super::algos::max_level_of;
use basalt_chain_types::{BlockId, Header};

/// Compute the interlink vector a child of `parent` must carry.
///
/// A parent of level `L` supersedes the interlink slots for levels
/// `1..=L`: the last `L` entries of the tail are dropped and replaced by
/// `L` copies of the parent's id. A level-0 parent leaves the vector
/// unchanged.
pub fn update_interlinks(parent: &Header) -> Vec<BlockId> {
    if parent.is_genesis() {
        return vec![parent.id()];
    }

    let prev = parent.interlinks();
    if prev.is_empty() {
        // Degenerate non-genesis header without interlinks; anchor the
        // child directly at it.
        return vec![parent.id()];
    }

    let level = max_level_of(parent) as usize;
    if level == 0 {
        return prev.to_vec();
    }

    let genesis = prev[0];
    let tail = &prev[1..];

    let mut next = Vec::with_capacity(tail.len().max(level) + 1);
    next.push(genesis);
    next.extend_from_slice(&tail[..tail.len().saturating_sub(level)]);
    next.extend(std::iter::repeat(parent.id()).take(level));
    next
}
