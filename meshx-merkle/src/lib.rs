//! Merkle commitments over batches of IoT sensor records.
//!
//! Records are hashed into 32-byte keccak256 leaves, leaves are combined
//! with sorted-pair hashing into a binary tree, and each leaf gets a
//! sibling-path proof that any third party can check against the root
//! with nothing but keccak256 and the pair rule.
//!
//! # Core types
//!
//! - [`SensorRecord`]: one reading; [`SensorRecord::leaf_hash`] encodes and
//!   hashes it.
//! - [`BatchMerkleTree`]: immutable tree built from leaves or records.
//! - [`BatchProof`]: sibling path for one leaf.
//! - [`verify_proof`]: the stateless verifier.
//! - [`CommitmentScheme`]: the published encoding/odd-node rules, by
//!   version.
//! - [`BatchCommitment`], [`Batch`]: a committed record range and its
//!   anchored form.
//! - [`RecordLog`]: in-memory append-only log with a batch registry.

pub mod batch;
mod error;
pub mod hash;
mod leaf;
mod proof;
mod record_log;
mod scheme;
mod tree;
mod verify;

#[cfg(test)]
pub(crate) mod test_utils;

pub use batch::{Batch, BatchCommitment, BatchRange, DEFAULT_BATCH_SPAN, RecordProof};
pub use error::{MerkleBatchError, Result};
pub use hash::{Hash, combine_sorted, keccak256, parse_hash, to_hex};
pub use leaf::SensorRecord;
pub use record_log::RecordLog;
pub use proof::{BatchProof, MAX_PROOF_DEPTH};
pub use scheme::{
    COMMITMENT_SCHEMES, CommitmentScheme, LeafEncoding, OddNodePolicy, SCHEME_V0, SCHEME_V1,
    SCHEME_V2,
};
pub use tree::BatchMerkleTree;
pub use verify::{compute_root, verify_hex_proof, verify_proof};
