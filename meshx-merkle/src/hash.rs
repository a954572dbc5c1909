//! Keccak-256 primitives and the sorted-pair combine rule.
//!
//! Internal nodes hash `keccak256(min(a, b) || max(a, b))` with a
//! lexicographic byte comparison, so a parent does not depend on which
//! child sits on the left. Leaves are never re-hashed and no domain tags
//! are applied, which keeps roots interchangeable with other sorted-pair
//! implementations (merkletreejs `sortPairs`, OpenZeppelin `MerkleProof`).

use tiny_keccak::{Hasher, Keccak};

use crate::{MerkleBatchError, Result};

/// A 32-byte keccak256 digest.
pub type Hash = [u8; 32];

/// Byte length of a [`Hash`].
pub const HASH_LEN: usize = 32;

/// Compute `keccak256(data)`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; HASH_LEN];
    hasher.finalize(&mut output);
    output
}

/// Combine two sibling hashes into their parent.
pub fn combine_sorted(a: &Hash, b: &Hash) -> Hash {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let mut input = [0u8; 2 * HASH_LEN];
    input[..HASH_LEN].copy_from_slice(low);
    input[HASH_LEN..].copy_from_slice(high);
    keccak256(&input)
}

/// Lowercase, `0x`-prefixed hex of a hash.
pub fn to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a 32-byte hash from hex, with or without a `0x` prefix.
pub fn parse_hash(input: &str) -> Result<Hash> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    let bytes = hex::decode(digits)
        .map_err(|e| MerkleBatchError::InvalidHash(format!("{}: {}", input, e)))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        MerkleBatchError::InvalidHash(format!(
            "expected {} bytes, got {}",
            HASH_LEN,
            bytes.len()
        ))
    })
}

/// Serde adapter writing a [`Hash`] as `0x`-prefixed hex.
pub(crate) mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::{Hash, parse_hash, to_hex};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hash(&s).map_err(D::Error::custom)
    }
}
