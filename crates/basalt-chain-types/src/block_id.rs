//! Block identifiers.

use crate::error::ChainTypesError;
use std::fmt;
use std::str::FromStr;

/// Byte width of a block identifier.
pub const BLOCK_ID_LEN: usize = 32;

/// Fixed-width block identifier.
///
/// The id of a header is the Blake2b-256 image of its canonical bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub [u8; BLOCK_ID_LEN]);

impl BlockId {
    /// Returns the all-zero id, used as the genesis header's parent.
    pub const fn zero() -> Self {
        Self([0u8; BLOCK_ID_LEN])
    }

    /// Returns the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; BLOCK_ID_LEN] {
        &self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", hex::encode(self.0))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; BLOCK_ID_LEN]> for BlockId {
    fn from(value: [u8; BLOCK_ID_LEN]) -> Self {
        Self(value)
    }
}

impl From<BlockId> for [u8; BLOCK_ID_LEN] {
    fn from(value: BlockId) -> Self {
        value.0
    }
}

impl FromStr for BlockId {
    type Err = ChainTypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        if bytes.len() != BLOCK_ID_LEN {
            return Err(ChainTypesError::InvalidHexLength {
                expected: BLOCK_ID_LEN,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; BLOCK_ID_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let id = BlockId([0xab; 32]);
        let rendered = id.to_string();
        assert_eq!(rendered.len(), 64);
        assert_eq!(rendered.parse::<BlockId>().unwrap(), id);
    }

    #[test]
    fn test_hex_prefix_accepted() {
        let id = BlockId([0x01; 32]);
        let prefixed = format!("0x{id}");
        assert_eq!(prefixed.parse::<BlockId>().unwrap(), id);
    }

    #[test]
    fn test_bad_length_rejected() {
        let err = "abcd".parse::<BlockId>().unwrap_err();
        assert!(matches!(
            err,
            ChainTypesError::InvalidHexLength { expected: 32, got: 2 }
        ));
    }

    #[test]
    fn test_zero() {
        assert_eq!(BlockId::zero().as_bytes(), &[0u8; 32]);
    }
}
