use thiserror::Error;

/// Alias for `core::result::Result<T, MerkleBatchError>`.
pub type Result<T> = core::result::Result<T, MerkleBatchError>;

/// Errors from batch tree construction, proof handling and the record log.
///
/// A proof that fails to verify is not an error; verification returns
/// `false` for that case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleBatchError {
    #[error("cannot build a batch tree from zero records")]
    EmptyBatch,
    #[error("leaf index {index} is out of range (leaf count {leaf_count})")]
    IndexOutOfRange { index: u64, leaf_count: u64 },
    #[error("invalid batch range {from_index}-{to_index} for {record_count} records")]
    InvalidRange {
        from_index: u64,
        to_index: u64,
        record_count: u64,
    },
    #[error("record {index} is outside batch range {from_index}-{to_index}")]
    RecordOutsideBatch {
        index: u64,
        from_index: u64,
        to_index: u64,
    },
    #[error("record {0} does not exist")]
    RecordNotFound(u64),
    #[error("no records for device {0}")]
    NoDeviceRecords(String),
    #[error("batch {0} does not exist")]
    BatchNotFound(u64),
    #[error("invalid hash: {0}")]
    InvalidHash(String),
    #[error("invalid proof: {0}")]
    InvalidProof(String),
    #[error("unknown commitment scheme version {0}")]
    UnknownSchemeVersion(u16),
}
