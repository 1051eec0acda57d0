//! Block header view and its canonical byte codec.
//!
//! The header here is the read-only projection the proof subsystem works
//! with: identity, parent linkage, height, the compact difficulty bits,
//! the PoW distance, and the interlink vector. The byte layout is
//! consensus-critical (all integers big-endian):
//!
//! ```text
//! +-----------+--------+--------+-------+----------+-------+--------------+
//! | parent_id | height | n_bits | d_len | d bytes  | count | interlinks   |
//! | 32 bytes  | u32    | u32    | u32   | d_len    | u32   | count * 32   |
//! +-----------+--------+--------+-------+----------+-------+--------------+
//! ```
//!
//! The header id is `blake2b256` over exactly these bytes, so the distance
//! magnitude must be minimally encoded and parsing must consume the buffer
//! exactly.

use crate::block_id::{BlockId, BLOCK_ID_LEN};
use crate::error::{ChainTypesError, ChainTypesResult};
use crate::hash::blake2b256;
use crate::GENESIS_HEIGHT;
use bytes::{Buf, BufMut};
use num_bigint::BigUint;

/// Maximum byte length of an encoded PoW distance.
pub const MAX_DISTANCE_BYTES: usize = 64;

/// Maximum number of interlink entries a header may carry.
pub const MAX_INTERLINKS: usize = 1024;

/// PoW solution view: the distance `d` the miner's solution achieved.
///
/// Lower distances are stronger. The proof subsystem only reads the scalar;
/// the full solution (miner key, nonce) stays with the PoW verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowSolution {
    distance: BigUint,
}

impl PowSolution {
    /// Create a solution view from its distance.
    pub fn new(distance: BigUint) -> Self {
        Self { distance }
    }

    /// The PoW distance `d`.
    pub fn d(&self) -> &BigUint {
        &self.distance
    }
}

/// Read-only block header projection.
///
/// Immutable after construction; the id is cached and always equals the
/// Blake2b-256 image of [`Header::canonical_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    id: BlockId,
    parent_id: BlockId,
    height: u32,
    n_bits: u32,
    solution: PowSolution,
    interlinks: Vec<BlockId>,
}

impl Header {
    /// Build a header, computing its id from the canonical bytes.
    pub fn new(
        parent_id: BlockId,
        height: u32,
        n_bits: u32,
        solution: PowSolution,
        interlinks: Vec<BlockId>,
    ) -> Self {
        let mut header = Self {
            id: BlockId::zero(),
            parent_id,
            height,
            n_bits,
            solution,
            interlinks,
        };
        header.id = BlockId(blake2b256(&header.canonical_bytes()));
        header
    }

    /// The header id.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// The parent header id.
    pub fn parent_id(&self) -> BlockId {
        self.parent_id
    }

    /// Block height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Compact difficulty bits.
    pub fn n_bits(&self) -> u32 {
        self.n_bits
    }

    /// The PoW solution view.
    pub fn solution(&self) -> &PowSolution {
        &self.solution
    }

    /// The interlink vector. Entry 0 is the genesis id; entry `i >= 1`
    /// references the most recent ancestor of level `>= i`.
    pub fn interlinks(&self) -> &[BlockId] {
        &self.interlinks
    }

    /// Whether this is the genesis header.
    pub fn is_genesis(&self) -> bool {
        self.height == GENESIS_HEIGHT
    }

    /// The genesis id this header's interlinks are anchored at, if any.
    pub fn genesis_anchor(&self) -> Option<&BlockId> {
        self.interlinks.first()
    }

    /// Canonical byte image, used for id hashing and over-the-wire framing.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let distance = self.solution.distance.to_bytes_be();
        let mut buf = Vec::with_capacity(
            BLOCK_ID_LEN + 4 + 4 + 4 + distance.len() + 4 + self.interlinks.len() * BLOCK_ID_LEN,
        );
        buf.put_slice(self.parent_id.as_bytes());
        buf.put_u32(self.height);
        buf.put_u32(self.n_bits);
        buf.put_u32(distance.len() as u32);
        buf.put_slice(&distance);
        buf.put_u32(self.interlinks.len() as u32);
        for link in &self.interlinks {
            buf.put_slice(link.as_bytes());
        }
        buf
    }

    /// Parse a header from its canonical bytes.
    ///
    /// The buffer must be consumed exactly; the returned header's id is
    /// the hash of the input.
    pub fn parse(bytes: &[u8]) -> ChainTypesResult<Self> {
        let mut buf = bytes;

        let parent_id = read_id(&mut buf, "parent id")?;
        need(buf, 8, "height and nBits")?;
        let height = buf.get_u32();
        let n_bits = buf.get_u32();

        need(buf, 4, "distance length")?;
        let d_len = buf.get_u32() as usize;
        if d_len > MAX_DISTANCE_BYTES {
            return Err(ChainTypesError::FieldTooLarge {
                field: "distance",
                len: d_len,
                max: MAX_DISTANCE_BYTES,
            });
        }
        need(buf, d_len, "distance")?;
        let mut distance = vec![0u8; d_len];
        buf.copy_to_slice(&mut distance);
        if distance.is_empty() || (distance.len() > 1 && distance[0] == 0) {
            return Err(ChainTypesError::NonCanonical("distance magnitude"));
        }

        need(buf, 4, "interlink count")?;
        let count = buf.get_u32() as usize;
        if count > MAX_INTERLINKS {
            return Err(ChainTypesError::FieldTooLarge {
                field: "interlinks",
                len: count,
                max: MAX_INTERLINKS,
            });
        }
        let mut interlinks = Vec::with_capacity(count);
        for _ in 0..count {
            interlinks.push(read_id(&mut buf, "interlink entry")?);
        }

        if buf.has_remaining() {
            return Err(ChainTypesError::TrailingBytes(buf.remaining()));
        }

        Ok(Self {
            id: BlockId(blake2b256(bytes)),
            parent_id,
            height,
            n_bits,
            solution: PowSolution::new(BigUint::from_bytes_be(&distance)),
            interlinks,
        })
    }
}

fn need(buf: &[u8], n: usize, what: &'static str) -> ChainTypesResult<()> {
    if buf.remaining() < n {
        return Err(ChainTypesError::Truncated(what));
    }
    Ok(())
}

fn read_id(buf: &mut &[u8], what: &'static str) -> ChainTypesResult<BlockId> {
    need(*buf, BLOCK_ID_LEN, what)?;
    let mut id = [0u8; BLOCK_ID_LEN];
    buf.copy_to_slice(&mut id);
    Ok(BlockId(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header::new(
            BlockId([7u8; 32]),
            42,
            0x0301_0000,
            PowSolution::new(BigUint::from(123_456_789u64)),
            vec![BlockId([1u8; 32]), BlockId([2u8; 32])],
        )
    }

    #[test]
    fn test_codec_roundtrip() {
        let header = sample_header();
        let bytes = header.canonical_bytes();
        let parsed = Header::parse(&bytes).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.id(), header.id());
    }

    #[test]
    fn test_id_is_hash_of_canonical_bytes() {
        let header = sample_header();
        assert_eq!(header.id().0, blake2b256(&header.canonical_bytes()));
    }

    #[test]
    fn test_truncated_rejected() {
        let bytes = sample_header().canonical_bytes();
        for cut in [0, 10, 35, bytes.len() - 1] {
            assert!(matches!(
                Header::parse(&bytes[..cut]),
                Err(ChainTypesError::Truncated(_))
            ));
        }
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = sample_header().canonical_bytes();
        bytes.push(0);
        assert!(matches!(
            Header::parse(&bytes),
            Err(ChainTypesError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_non_minimal_distance_rejected() {
        let header = sample_header();
        let canonical = header.canonical_bytes();
        // Widen the distance field with a leading zero byte.
        let d_len_at = 32 + 4 + 4;
        let d_len = u32::from_be_bytes(canonical[d_len_at..d_len_at + 4].try_into().unwrap());
        let mut padded = canonical[..d_len_at].to_vec();
        padded.extend_from_slice(&(d_len + 1).to_be_bytes());
        padded.push(0);
        padded.extend_from_slice(&canonical[d_len_at + 4..]);
        assert!(matches!(
            Header::parse(&padded),
            Err(ChainTypesError::NonCanonical(_))
        ));
    }

    #[test]
    fn test_distance_cap() {
        let bytes = sample_header().canonical_bytes();
        let d_len_at = 32 + 4 + 4;
        let mut oversized = bytes[..d_len_at].to_vec();
        oversized.extend_from_slice(&(MAX_DISTANCE_BYTES as u32 + 1).to_be_bytes());
        oversized.extend_from_slice(&[1u8; MAX_DISTANCE_BYTES + 1]);
        assert!(matches!(
            Header::parse(&oversized),
            Err(ChainTypesError::FieldTooLarge { field: "distance", .. })
        ));
    }

    #[test]
    fn test_genesis_predicate() {
        let genesis = Header::new(
            BlockId::zero(),
            GENESIS_HEIGHT,
            0x0301_0000,
            PowSolution::new(BigUint::from(1u8)),
            vec![],
        );
        assert!(genesis.is_genesis());
        assert!(!sample_header().is_genesis());
        assert_eq!(genesis.genesis_anchor(), None);
    }

    #[test]
    fn test_distinct_content_distinct_ids() {
        let a = sample_header();
        let b = Header::new(
            a.parent_id(),
            a.height() + 1,
            a.n_bits(),
            a.solution().clone(),
            a.interlinks().to_vec(),
        );
        assert_ne!(a.id(), b.id());
    }
}
