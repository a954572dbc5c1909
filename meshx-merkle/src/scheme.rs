//! Published commitment schemes.
//!
//! A scheme fixes everything a third party needs to recompute leaves and
//! roots: the leaf encoding, the pair rule (always sorted-pair keccak256)
//! and what happens to the last node of an odd-sized level. Batches record
//! the version and the odd-node policy they were built with.

use serde::{Deserialize, Serialize};

use crate::{Hash, MerkleBatchError, Result, SensorRecord};

/// How a [`SensorRecord`] is packed before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafEncoding {
    /// Solidity `abi.encodePacked(string, uint256, string, string, string)`.
    ///
    /// Strings are written without length, so field boundaries are
    /// ambiguous. Kept for roots produced by `solidityPackedKeccak256`.
    SolidityPacked,
    /// Tagged, length-prefixed packing with unambiguous field boundaries.
    LengthPrefixed,
    /// [`LeafEncoding::LengthPrefixed`] salted with the record's log index.
    IndexedLengthPrefixed,
}

/// Treatment of the unpaired last node on an odd-sized level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddNodePolicy {
    /// Promote the node to the next level unchanged.
    #[default]
    CarryUp,
    /// Pair the node with itself.
    Duplicate,
}

/// A versioned (leaf encoding, odd-node policy) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentScheme {
    pub version: u16,
    pub leaf_encoding: LeafEncoding,
    pub odd_node: OddNodePolicy,
}

/// Scheme of the first anchored batches: Solidity `abi.encodePacked` leaves.
pub const SCHEME_V0: CommitmentScheme = CommitmentScheme {
    version: 0,
    leaf_encoding: LeafEncoding::SolidityPacked,
    odd_node: OddNodePolicy::CarryUp,
};

/// Length-prefixed leaves, carried-up odd nodes.
pub const SCHEME_V1: CommitmentScheme = CommitmentScheme {
    version: 1,
    leaf_encoding: LeafEncoding::LengthPrefixed,
    odd_node: OddNodePolicy::CarryUp,
};

/// Position-salted length-prefixed leaves, carried-up odd nodes.
///
/// Unsalted sorted-pair trees give the same root when two paired records
/// swap places; salting with the log index makes the root order sensitive.
pub const SCHEME_V2: CommitmentScheme = CommitmentScheme {
    version: 2,
    leaf_encoding: LeafEncoding::IndexedLengthPrefixed,
    odd_node: OddNodePolicy::CarryUp,
};

/// Every published scheme, ordered by version.
pub const COMMITMENT_SCHEMES: &[CommitmentScheme] = &[SCHEME_V0, SCHEME_V1, SCHEME_V2];

impl CommitmentScheme {
    pub fn latest<'a>() -> &'a Self {
        COMMITMENT_SCHEMES
            .last()
            .expect("expected at least one published commitment scheme")
    }

    /// Look up a published scheme by version.
    pub fn from_version<'a>(version: u16) -> Result<&'a Self> {
        COMMITMENT_SCHEMES
            .iter()
            .find(|scheme| scheme.version == version)
            .ok_or(MerkleBatchError::UnknownSchemeVersion(version))
    }

    /// Same scheme with a different odd-node policy.
    ///
    /// Only tree construction and proof generation depend on the policy;
    /// verification folds siblings the same way either way. The version is
    /// kept, so batches anchor the policy next to it (see
    /// [`crate::Batch::odd_node`]).
    pub fn with_odd_node(self, odd_node: OddNodePolicy) -> Self {
        Self { odd_node, ..self }
    }

    /// Leaf hash of `record` stored at log `index` under this scheme.
    pub fn leaf_hash(&self, record: &SensorRecord, index: u64) -> Hash {
        record.leaf_hash(self.leaf_encoding, index)
    }
}

impl Default for CommitmentScheme {
    fn default() -> Self {
        *Self::latest()
    }
}
