//! NiPoPoW proof structure, validation, comparison, and the wire codec.

use super::algos::{
    best_arg_of_levels, filter_by_level, lowest_common_ancestor, max_level_of, MAX_SCAN_LEVEL,
};
use crate::{ConsensusError, ConsensusResult};
use basalt_chain_types::{blake2b256, BlockId, Header};
use bytes::{Buf, BufMut};
use std::collections::BTreeMap;

/// Hard cap on headers per proof section, bounding decode allocation.
const MAX_PROOF_HEADERS: usize = 65_536;

/// NiPoPoW protocol parameters.
///
/// These are consensus constants fixed per chain version; they ship in
/// node configuration, never inside proofs.
#[derive(Debug, Clone, Copy)]
pub struct PopowParams {
    /// Superchain density: headers required per represented level.
    pub m: i32,
    /// Suffix length (stability parameter).
    pub k: i32,
    /// Multi-level quality threshold.
    pub k1: i32,
    /// Goodness slack, in (0, 1).
    pub delta: f64,
}

impl Default for PopowParams {
    fn default() -> Self {
        Self {
            m: super::DEFAULT_M,
            k: super::DEFAULT_K,
            k1: super::DEFAULT_K1,
            delta: super::DEFAULT_DELTA,
        }
    }
}

impl PopowParams {
    /// Create new parameters.
    pub fn new(m: i32, k: i32, k1: i32, delta: f64) -> Self {
        Self { m, k, k1, delta }
    }
}

/// A NiPoPoW proof: a compact certificate that a chain carries
/// sufficient proof-of-work.
///
/// The proof consists of:
/// - A prefix: the genesis header followed by selected superchain headers
/// - A suffix: the last `k` headers of the chain in full
#[derive(Debug, Clone)]
pub struct NipopowProof {
    /// Superchain density parameter used to generate this proof.
    pub m: i32,
    /// Suffix length.
    pub k: i32,
    /// Prefix headers, anchored at genesis.
    pub prefix: Vec<Header>,
    /// The last `k` headers of the chain.
    pub suffix: Vec<Header>,
    /// Byte length observed by the codec. Informational only; excluded
    /// from equality.
    pub size: Option<usize>,
}

impl PartialEq for NipopowProof {
    fn eq(&self, other: &Self) -> bool {
        self.m == other.m
            && self.k == other.k
            && self.prefix == other.prefix
            && self.suffix == other.suffix
    }
}

impl Eq for NipopowProof {}

impl NipopowProof {
    /// Create a new proof.
    pub fn new(m: i32, k: i32, prefix: Vec<Header>, suffix: Vec<Header>) -> Self {
        Self {
            m,
            k,
            prefix,
            suffix,
            size: None,
        }
    }

    /// The genesis block id this proof is anchored at.
    pub fn genesis_id(&self) -> Option<BlockId> {
        self.prefix.first().map(Header::id)
    }

    /// All headers in the proof, prefix then suffix.
    pub fn headers_chain(&self) -> Vec<&Header> {
        self.prefix.iter().chain(self.suffix.iter()).collect()
    }

    /// The proof's tip header (last of the suffix, or of the prefix for
    /// a suffixless proof).
    pub fn tip(&self) -> Option<&Header> {
        self.suffix.last().or_else(|| self.prefix.last())
    }

    /// Height of the proof tip; 0 for an empty proof.
    pub fn tip_height(&self) -> u32 {
        self.tip().map(Header::height).unwrap_or(0)
    }

    /// Id of the proof tip, if any.
    pub fn tip_id(&self) -> Option<BlockId> {
        self.tip().map(Header::id)
    }

    /// Prefix headers whose level reaches `level`, order preserved.
    pub fn headers_of_level(&self, level: u32) -> Vec<&Header> {
        filter_by_level(&self.prefix, level)
    }

    /// Validate the proof structure.
    ///
    /// Checks, in order: the suffix carries exactly `k` headers; every
    /// level represented in the prefix tail carries exactly `m` headers;
    /// every prefix-tail header is anchored at the prefix head.
    pub fn validate(&self) -> ConsensusResult<()> {
        if self.suffix.len() as i64 != i64::from(self.k) {
            return Err(ConsensusError::InvalidSuffixLength {
                expected: self.k,
                got: self.suffix.len(),
            });
        }

        let genesis_id = self
            .genesis_id()
            .ok_or_else(|| ConsensusError::MalformedProof("proof prefix is empty".to_string()))?;

        let mut groups: BTreeMap<u32, usize> = BTreeMap::new();
        for header in &self.prefix[1..] {
            *groups.entry(max_level_of(header)).or_insert(0) += 1;
        }
        for (&level, &count) in &groups {
            if count as i64 != i64::from(self.m) {
                return Err(ConsensusError::InvalidPrefixLength {
                    level,
                    expected: self.m,
                    got: count,
                });
            }
        }

        for header in &self.prefix[1..] {
            if header.genesis_anchor() != Some(&genesis_id) {
                return Err(ConsensusError::ChainNotAnchored {
                    header: header.id().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Whether this proof certifies strictly more work than `other`.
    ///
    /// The chains are compared past their lowest common ancestor (or in
    /// full when they share no ancestor). Ties favor the incumbent.
    pub fn is_better_than(&self, other: &NipopowProof) -> bool {
        let (this_levels, other_levels) =
            match lowest_common_ancestor(&self.prefix, &other.prefix) {
                Some(ancestor) => {
                    let fork_height = ancestor.height();
                    (
                        levels_above(&self.prefix, fork_height),
                        levels_above(&other.prefix, fork_height),
                    )
                }
                None => (
                    levels_above(&self.prefix, 0),
                    levels_above(&other.prefix, 0),
                ),
            };

        best_arg_of_levels(&this_levels, self.m) > best_arg_of_levels(&other_levels, self.m)
    }

    /// Serialize the proof to its canonical bytes.
    ///
    /// Layout (all integers big-endian 32-bit signed): `k`, `m`, then the
    /// prefix and suffix as counted sequences of length-prefixed header
    /// bytes. The field order `k` before `m` is consensus-observable.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.put_i32(self.k);
        buf.put_i32(self.m);
        put_headers(&mut buf, &self.prefix);
        put_headers(&mut buf, &self.suffix);
        buf
    }

    /// Parse a proof from bytes.
    ///
    /// The buffer must be consumed exactly; on success the proof's `size`
    /// records the total byte length.
    pub fn parse(bytes: &[u8]) -> ConsensusResult<Self> {
        let mut buf = bytes;

        let k = read_i32(&mut buf, "k")?;
        let m = read_i32(&mut buf, "m")?;
        if k <= 0 || m <= 0 {
            return Err(ConsensusError::MalformedProof(format!(
                "non-positive parameters: k={k}, m={m}"
            )));
        }

        let prefix = read_headers(&mut buf, "prefix")?;
        let suffix = read_headers(&mut buf, "suffix")?;

        if buf.has_remaining() {
            return Err(ConsensusError::MalformedProof(format!(
                "{} trailing bytes",
                buf.remaining()
            )));
        }

        Ok(Self {
            m,
            k,
            prefix,
            suffix,
            size: Some(bytes.len()),
        })
    }

    /// Stable proof identifier: the hash of the canonical encoding.
    pub fn id(&self) -> [u8; 32] {
        blake2b256(&self.serialize())
    }
}

fn levels_above(chain: &[Header], fork_height: u32) -> Vec<u32> {
    chain
        .iter()
        .filter(|h| h.height() > fork_height)
        .map(max_level_of)
        .collect()
}

fn put_headers(buf: &mut Vec<u8>, headers: &[Header]) {
    buf.put_i32(headers.len() as i32);
    for header in headers {
        let bytes = header.canonical_bytes();
        buf.put_i32(bytes.len() as i32);
        buf.put_slice(&bytes);
    }
}

fn read_i32(buf: &mut &[u8], field: &str) -> ConsensusResult<i32> {
    if buf.remaining() < 4 {
        return Err(ConsensusError::MalformedProof(format!(
            "truncated input while reading {field}"
        )));
    }
    Ok(buf.get_i32())
}

fn read_headers(buf: &mut &[u8], section: &str) -> ConsensusResult<Vec<Header>> {
    let count = read_i32(buf, section)?;
    let count = usize::try_from(count)
        .map_err(|_| ConsensusError::MalformedProof(format!("negative {section} count")))?;
    if count > MAX_PROOF_HEADERS {
        return Err(ConsensusError::MalformedProof(format!(
            "{section} count {count} exceeds {MAX_PROOF_HEADERS}"
        )));
    }

    let mut headers = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_i32(buf, "header length")?;
        let len = usize::try_from(len)
            .map_err(|_| ConsensusError::MalformedProof("negative header length".to_string()))?;
        if buf.remaining() < len {
            return Err(ConsensusError::MalformedProof(format!(
                "truncated header in {section}"
            )));
        }
        let (head, rest) = buf.split_at(len);
        let header = Header::parse(head).map_err(|e| {
            ConsensusError::MalformedProof(format!("bad header bytes in {section}: {e}"))
        })?;
        *buf = rest;
        headers.push(header);
    }
    Ok(headers)
}

/// Good-superchain test: the richer acceptance predicate over a chain and
/// one of its superchains.
///
/// Combines super-chain quality (the superchain is dense enough against
/// the underlying segment at every window size) and multi-level quality
/// (no intermediate level is disproportionately thin). Structural checks
/// live in [`NipopowProof::validate`]; this predicate is applied by
/// consumers deciding acceptance.
pub fn good_superchain(
    chain: &[&Header],
    super_chain: &[&Header],
    level: u32,
    params: &PopowParams,
) -> ConsensusResult<()> {
    if level > MAX_SCAN_LEVEL {
        return Err(ConsensusError::MalformedProof(format!(
            "superchain level {level} out of range"
        )));
    }

    let down = down_chain(chain, super_chain)?;
    check_superchain_quality(chain.len(), down, super_chain.len(), level, params)?;
    check_multilevel_quality(down, level, params)
}

/// The segment of `chain` between the first and last superchain header,
/// inclusive. Boundaries are located by id.
fn down_chain<'a, 'b>(
    chain: &'a [&'b Header],
    super_chain: &[&Header],
) -> ConsensusResult<&'a [&'b Header]> {
    let (first, last) = match (super_chain.first(), super_chain.last()) {
        (Some(f), Some(l)) => (f.id(), l.id()),
        _ => return Ok(&chain[..0]),
    };

    let start = chain
        .iter()
        .position(|h| h.id() == first)
        .ok_or_else(|| {
            ConsensusError::MalformedProof("superchain head not found in chain".to_string())
        })?;
    let end = chain.iter().rposition(|h| h.id() == last).ok_or_else(|| {
        ConsensusError::MalformedProof("superchain tip not found in chain".to_string())
    })?;
    if end < start {
        return Err(ConsensusError::MalformedProof(
            "superchain boundaries out of order".to_string(),
        ));
    }
    Ok(&chain[start..=end])
}

fn check_superchain_quality(
    chain_len: usize,
    down: &[&Header],
    super_len: usize,
    level: u32,
    params: &PopowParams,
) -> ConsensusResult<()> {
    let m = usize::try_from(params.m).unwrap_or(0).max(1);
    let slack = 1.0 - params.delta;
    let attenuation = 0.5f64.powi(level as i32);

    for m_prime in m..chain_len {
        let s = super_len.min(m_prime);
        let d = down.len().min(m_prime);
        if (s as f64) <= slack * attenuation * (d as f64) {
            return Err(ConsensusError::WeakSuperChain { level });
        }
    }
    Ok(())
}

fn check_multilevel_quality(
    down: &[&Header],
    level: u32,
    params: &PopowParams,
) -> ConsensusResult<()> {
    let slack = 1.0 - params.delta;

    for sub_level in 1..=level {
        let star: Vec<&Header> = down
            .iter()
            .filter(|h| max_level_of(h) >= sub_level.saturating_sub(1))
            .copied()
            .collect();
        let upper = star
            .iter()
            .filter(|h| max_level_of(h) >= sub_level)
            .count();
        if (upper as i64) >= i64::from(params.k1) {
            let at_level = star.iter().filter(|h| max_level_of(h) >= level).count();
            let required = slack * 2f64.powi((level - sub_level) as i32) * (upper as f64);
            if (at_level as f64) < required {
                return Err(ConsensusError::WeakMultiLevel { level, sub_level });
            }
        }
    }
    Ok(())
}
