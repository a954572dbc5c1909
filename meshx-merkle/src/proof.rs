//! Inclusion proofs for a single leaf of a [`BatchMerkleTree`].
//!
//! A proof is the ordered list of sibling hashes from the leaf level up to
//! the root. Sorted-pair hashing makes left/right positions unnecessary, so
//! the sibling list alone is enough to recompute the root. Levels where the
//! leaf's ancestor was carried up unpaired contribute no sibling.

use bincode::{Decode, Encode};
use tracing::trace;

use crate::{
    BatchMerkleTree, Hash, MerkleBatchError, OddNodePolicy, Result,
    hash::{parse_hash, to_hex},
    verify::verify_proof,
};

/// Upper bound on sibling count accepted when decoding a proof.
///
/// A tree over `u64::MAX` leaves has depth 64.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Sibling path for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct BatchProof {
    /// Position of the proved leaf within its batch (0-based).
    pub leaf_index: u64,
    /// Sibling hashes, leaf level first.
    pub siblings: Vec<Hash>,
}

impl BatchMerkleTree {
    /// Generate the inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: u64) -> Result<BatchProof> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleBatchError::IndexOutOfRange { index, leaf_count });
        }

        // `index < leaf_count`, which came from a `usize` length.
        let mut position = index as usize;
        let mut siblings = Vec::with_capacity(self.depth());
        for level in &self.levels()[..self.depth()] {
            match level.get(position ^ 1) {
                Some(sibling) => siblings.push(*sibling),
                None => {
                    if self.scheme().odd_node == OddNodePolicy::Duplicate {
                        siblings.extend(level.get(position).copied());
                    }
                }
            }
            position /= 2;
        }

        trace!(index, siblings = siblings.len(), "generated batch proof");
        Ok(BatchProof {
            leaf_index: index,
            siblings,
        })
    }

    /// Proofs for every leaf, in leaf order.
    pub fn proofs(&self) -> Vec<BatchProof> {
        (0..self.leaf_count())
            .filter_map(|index| self.proof(index).ok())
            .collect()
    }
}

impl BatchProof {
    pub fn new(leaf_index: u64, siblings: Vec<Hash>) -> Self {
        Self {
            leaf_index,
            siblings,
        }
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Check that `leaf` folded with this proof yields `root`.
    pub fn verify(&self, leaf: &Hash, root: &Hash) -> bool {
        verify_proof(leaf, &self.siblings, root)
    }

    /// Siblings as `0x`-prefixed hex strings.
    pub fn to_hex(&self) -> Vec<String> {
        self.siblings.iter().map(to_hex).collect()
    }

    /// Parse a proof published as hex sibling strings.
    pub fn from_hex<S: AsRef<str>>(leaf_index: u64, siblings: &[S]) -> Result<Self> {
        if siblings.len() > MAX_PROOF_DEPTH {
            return Err(MerkleBatchError::InvalidProof(format!(
                "{} siblings exceeds maximum depth {}",
                siblings.len(),
                MAX_PROOF_DEPTH
            )));
        }
        let siblings = siblings
            .iter()
            .map(|s| parse_hash(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(leaf_index, siblings))
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| MerkleBatchError::InvalidProof(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects trailing bytes and proofs deeper than [`MAX_PROOF_DEPTH`].
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 64 * 1024 }>();
        let (proof, read): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| MerkleBatchError::InvalidProof(format!("decode error: {}", e)))?;
        if read != bytes.len() {
            return Err(MerkleBatchError::InvalidProof(format!(
                "{} trailing bytes after proof",
                bytes.len() - read
            )));
        }
        if proof.siblings.len() > MAX_PROOF_DEPTH {
            return Err(MerkleBatchError::InvalidProof(format!(
                "{} siblings exceeds maximum depth {}",
                proof.siblings.len(),
                MAX_PROOF_DEPTH
            )));
        }
        Ok(proof)
    }
}
