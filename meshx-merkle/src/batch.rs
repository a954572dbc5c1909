//! Batches: contiguous record ranges committed under one Merkle root.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    BatchMerkleTree, BatchProof, CommitmentScheme, Hash, MerkleBatchError, OddNodePolicy, Result,
    SensorRecord,
    hash::{serde_hex, to_hex},
};

/// Records per batch when no end index is given.
pub const DEFAULT_BATCH_SPAN: u64 = 10;

/// An inclusive range `[from_index, to_index]` of record-log indices.
///
/// Deserialization goes through [`BatchRange::new`], so an inverted range
/// is rejected on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "UncheckedBatchRange")]
pub struct BatchRange {
    pub from_index: u64,
    pub to_index: u64,
}

impl BatchRange {
    pub fn new(from_index: u64, to_index: u64) -> Result<Self> {
        if from_index > to_index {
            return Err(MerkleBatchError::InvalidRange {
                from_index,
                to_index,
                record_count: 0,
            });
        }
        Ok(Self {
            from_index,
            to_index,
        })
    }

    /// Resolve a requested range against a log holding `record_count`
    /// records.
    ///
    /// Without `to_index` the range covers up to [`DEFAULT_BATCH_SPAN`]
    /// records, clipped to the end of the log.
    pub fn resolve(record_count: u64, from_index: u64, to_index: Option<u64>) -> Result<Self> {
        let to_index = to_index.unwrap_or_else(|| {
            record_count
                .saturating_sub(1)
                .min(from_index.saturating_add(DEFAULT_BATCH_SPAN - 1))
        });
        if from_index >= record_count || to_index >= record_count || from_index > to_index {
            return Err(MerkleBatchError::InvalidRange {
                from_index,
                to_index,
                record_count,
            });
        }
        Ok(Self {
            from_index,
            to_index,
        })
    }

    /// Number of records in the range. Zero when `from_index > to_index`.
    pub fn len(&self) -> u64 {
        self.to_index
            .checked_sub(self.from_index)
            .map_or(0, |span| span.saturating_add(1))
    }

    pub fn is_empty(&self) -> bool {
        self.from_index > self.to_index
    }

    pub fn contains(&self, index: u64) -> bool {
        (self.from_index..=self.to_index).contains(&index)
    }

    /// Position of a log index within the range.
    fn offset_of(&self, index: u64) -> Result<u64> {
        if !self.contains(index) {
            return Err(MerkleBatchError::RecordOutsideBatch {
                index,
                from_index: self.from_index,
                to_index: self.to_index,
            });
        }
        Ok(index - self.from_index)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UncheckedBatchRange {
    from_index: u64,
    to_index: u64,
}

impl TryFrom<UncheckedBatchRange> for BatchRange {
    type Error = MerkleBatchError;

    fn try_from(range: UncheckedBatchRange) -> Result<Self> {
        Self::new(range.from_index, range.to_index)
    }
}

/// Root and proofs for the records of one range.
#[derive(Debug, Clone)]
pub struct BatchCommitment {
    range: BatchRange,
    tree: BatchMerkleTree,
}

impl BatchCommitment {
    /// Commit to `records`, which must be exactly the records of `range`
    /// in log order.
    pub fn build(
        records: &[SensorRecord],
        range: BatchRange,
        scheme: &CommitmentScheme,
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(MerkleBatchError::EmptyBatch);
        }
        if range.is_empty() || records.len() as u64 != range.len() {
            return Err(MerkleBatchError::InvalidRange {
                from_index: range.from_index,
                to_index: range.to_index,
                record_count: records.len() as u64,
            });
        }
        let tree = BatchMerkleTree::from_records(records, range.from_index, scheme)?;
        debug!(
            from_index = range.from_index,
            to_index = range.to_index,
            root = %tree.root_hex(),
            "committed batch range"
        );
        Ok(Self { range, tree })
    }

    /// Commit to `range` taken from a full record log.
    pub fn from_log(
        log: &[SensorRecord],
        range: BatchRange,
        scheme: &CommitmentScheme,
    ) -> Result<Self> {
        let records = slice_range(log, range)?;
        Self::build(records, range, scheme)
    }

    pub fn range(&self) -> BatchRange {
        self.range
    }

    pub fn tree(&self) -> &BatchMerkleTree {
        &self.tree
    }

    pub fn merkle_root(&self) -> Hash {
        self.tree.root()
    }

    pub fn root_hex(&self) -> String {
        self.tree.root_hex()
    }

    /// Proof for the record at log index `index`.
    ///
    /// The returned proof's `leaf_index` is the position within the batch.
    pub fn proof_for(&self, index: u64) -> Result<BatchProof> {
        self.tree.proof(self.range.offset_of(index)?)
    }

    /// Hex sibling lists keyed by log index.
    pub fn hex_proofs(&self) -> BTreeMap<u64, Vec<String>> {
        self.tree
            .proofs()
            .into_iter()
            .map(|proof| (self.range.from_index + proof.leaf_index, proof.to_hex()))
            .collect()
    }

    /// Prove and immediately check the record at log index `index`.
    pub fn record_proof(&self, index: u64, record: &SensorRecord) -> Result<RecordProof> {
        let proof = self.proof_for(index)?;
        let leaf = self.tree.scheme().leaf_hash(record, index);
        Ok(RecordProof {
            record_id: index,
            verified: proof.verify(&leaf, &self.merkle_root()),
            proof: proof.to_hex(),
        })
    }

    /// Freeze the commitment into a [`Batch`].
    pub fn into_batch(self, batch_id: u64, description: String, timestamp: u64) -> Batch {
        Batch {
            batch_id,
            from_index: self.range.from_index,
            to_index: self.range.to_index,
            merkle_root: self.tree.root(),
            description,
            timestamp,
            scheme_version: self.tree.scheme().version,
            odd_node: self.tree.scheme().odd_node,
        }
    }
}

/// An anchored commitment to a contiguous range of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub batch_id: u64,
    pub from_index: u64,
    pub to_index: u64,
    #[serde(with = "serde_hex")]
    pub merkle_root: Hash,
    pub description: String,
    /// Unix seconds at creation.
    pub timestamp: u64,
    pub scheme_version: u16,
    /// Odd-node policy the root was built with. Published schemes carry up,
    /// so anchors without the field read as [`OddNodePolicy::CarryUp`].
    #[serde(default)]
    pub odd_node: OddNodePolicy,
}

impl Batch {
    pub fn range(&self) -> BatchRange {
        BatchRange {
            from_index: self.from_index,
            to_index: self.to_index,
        }
    }

    pub fn contains(&self, index: u64) -> bool {
        self.range().contains(index)
    }

    pub fn root_hex(&self) -> String {
        to_hex(&self.merkle_root)
    }

    /// The scheme that rebuilds this batch's root from its records.
    pub fn scheme(&self) -> Result<CommitmentScheme> {
        CommitmentScheme::from_version(self.scheme_version)
            .map(|scheme| scheme.with_odd_node(self.odd_node))
    }

    /// Rebuild the root from `records` and compare it with the anchored one.
    ///
    /// `records` must be the batch's records in log order.
    pub fn matches_records(&self, records: &[SensorRecord]) -> Result<bool> {
        let commitment = BatchCommitment::build(records, self.range(), &self.scheme()?)?;
        Ok(commitment.merkle_root() == self.merkle_root)
    }

    /// Check that `record` sits at log index `index` of this batch.
    ///
    /// A proof generated for a different position in the batch is rejected
    /// with `Ok(false)`.
    pub fn verify_record(
        &self,
        index: u64,
        record: &SensorRecord,
        proof: &BatchProof,
    ) -> Result<bool> {
        let offset = self.range().offset_of(index)?;
        if proof.leaf_index != offset {
            return Ok(false);
        }
        let scheme = self.scheme()?;
        Ok(proof.verify(&scheme.leaf_hash(record, index), &self.merkle_root))
    }
}

/// Verification report for one record, as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordProof {
    pub record_id: u64,
    pub proof: Vec<String>,
    pub verified: bool,
}

pub(crate) fn slice_range(log: &[SensorRecord], range: BatchRange) -> Result<&[SensorRecord]> {
    let out_of_range = || MerkleBatchError::InvalidRange {
        from_index: range.from_index,
        to_index: range.to_index,
        record_count: log.len() as u64,
    };
    let from = usize::try_from(range.from_index).map_err(|_| out_of_range())?;
    let to = usize::try_from(range.to_index).map_err(|_| out_of_range())?;
    log.get(from..=to).ok_or_else(out_of_range)
}
