use tracing::debug;

use crate::{
    CommitmentScheme, Hash, MerkleBatchError, OddNodePolicy, Result, SensorRecord,
    hash::{combine_sorted, to_hex},
};

/// A binary Merkle tree over the leaf hashes of one batch.
///
/// `levels[0]` holds the leaves in batch order and the last level holds the
/// root alone. Each level above the leaves pairs adjacent nodes with
/// [`combine_sorted`]; an unpaired last node is handled by the scheme's
/// [`OddNodePolicy`].
///
/// The tree is immutable once built. Rebuilding is the only way to change
/// its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMerkleTree {
    scheme: CommitmentScheme,
    levels: Vec<Vec<Hash>>,
}

impl BatchMerkleTree {
    /// Build a tree from precomputed leaf hashes.
    ///
    /// Leaves are used as given and are not hashed again.
    pub fn from_leaves(leaves: Vec<Hash>, scheme: &CommitmentScheme) -> Result<Self> {
        if leaves.is_empty() {
            return Err(MerkleBatchError::EmptyBatch);
        }

        let leaf_count = leaves.len();
        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next = next_level(current, scheme.odd_node);
            levels.push(next);
        }

        let tree = Self {
            scheme: *scheme,
            levels,
        };
        debug!(
            leaf_count,
            depth = tree.depth(),
            scheme_version = scheme.version,
            root = %tree.root_hex(),
            "built batch merkle tree"
        );
        Ok(tree)
    }

    /// Hash every record with the scheme's leaf encoding and build the tree.
    ///
    /// `records[i]` is taken to sit at log index `first_index + i`; a batch
    /// running past `u64::MAX` is an [`MerkleBatchError::InvalidRange`].
    pub fn from_records(
        records: &[SensorRecord],
        first_index: u64,
        scheme: &CommitmentScheme,
    ) -> Result<Self> {
        let leaves = records
            .iter()
            .enumerate()
            .map(|(offset, record)| {
                u64::try_from(offset)
                    .ok()
                    .and_then(|offset| first_index.checked_add(offset))
                    .map(|index| scheme.leaf_hash(record, index))
                    .ok_or(MerkleBatchError::InvalidRange {
                        from_index: first_index,
                        to_index: u64::MAX,
                        record_count: records.len() as u64,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_leaves(leaves, scheme)
    }

    /// The scheme the tree was built with.
    pub fn scheme(&self) -> &CommitmentScheme {
        &self.scheme
    }

    pub fn root(&self) -> Hash {
        // `from_leaves` guarantees a non-empty top level.
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn root_hex(&self) -> String {
        to_hex(&self.root())
    }

    pub fn leaf_count(&self) -> u64 {
        self.leaves().len() as u64
    }

    pub fn leaves(&self) -> &[Hash] {
        self.levels.first().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn leaf(&self, index: u64) -> Option<&Hash> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.leaves().get(index))
    }

    /// Number of levels above the leaves. A single-leaf tree has depth 0.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// All levels, leaves first.
    pub fn levels(&self) -> &[Vec<Hash>] {
        &self.levels
    }
}

fn next_level(current: &[Hash], odd_node: OddNodePolicy) -> Vec<Hash> {
    current
        .chunks(2)
        .map(|pair| match (pair[0], pair.get(1)) {
            (left, Some(right)) => combine_sorted(&left, right),
            (last, None) => match odd_node {
                OddNodePolicy::CarryUp => last,
                OddNodePolicy::Duplicate => combine_sorted(&last, &last),
            },
        })
        .collect()
}
