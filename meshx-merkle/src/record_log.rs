//! In-memory append-only record log with a batch registry.
//!
//! Mirrors what the IoT data contract exposes to readers: records are
//! appended and never modified, indices are assigned sequentially from 0,
//! every device keeps the list of its record indices, and batches are
//! registered with sequential ids. No chain I/O happens here.

use std::collections::BTreeMap;

use tracing::{info, trace};

use crate::{
    Batch, BatchCommitment, BatchProof, BatchRange, CommitmentScheme, MerkleBatchError, Result,
    SensorRecord, batch::slice_range,
};

#[derive(Debug, Clone, Default)]
pub struct RecordLog {
    records: Vec<SensorRecord>,
    device_records: BTreeMap<String, Vec<u64>>,
    batches: Vec<Batch>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log by appending `records` in order.
    pub fn from_records(records: impl IntoIterator<Item = SensorRecord>) -> Self {
        let mut log = Self::new();
        for record in records {
            log.store(record);
        }
        log
    }

    /// Append a record and return its index.
    pub fn store(&mut self, record: SensorRecord) -> u64 {
        let index = self.records.len() as u64;
        self.device_records
            .entry(record.device_id.clone())
            .or_default()
            .push(index);
        trace!(index, device_id = %record.device_id, "stored record");
        self.records.push(record);
        index
    }

    pub fn record_count(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    pub fn get(&self, index: u64) -> Result<&SensorRecord> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.records.get(i))
            .ok_or(MerkleBatchError::RecordNotFound(index))
    }

    /// Indices of every record stored by `device_id`, oldest first.
    ///
    /// Unknown devices have no records.
    pub fn device_records(&self, device_id: &str) -> &[u64] {
        self.device_records
            .get(device_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The most recent record stored by `device_id`, with its index.
    pub fn latest_device_record(&self, device_id: &str) -> Result<(u64, &SensorRecord)> {
        let index = self
            .device_records(device_id)
            .last()
            .copied()
            .ok_or_else(|| MerkleBatchError::NoDeviceRecords(device_id.to_string()))?;
        Ok((index, self.get(index)?))
    }

    /// Records of an inclusive index range.
    pub fn range_records(&self, range: BatchRange) -> Result<&[SensorRecord]> {
        slice_range(&self.records, range)
    }

    /// Commit to a range without registering a batch.
    ///
    /// `to_index` defaults as in [`BatchRange::resolve`].
    pub fn commit(
        &self,
        from_index: u64,
        to_index: Option<u64>,
        scheme: &CommitmentScheme,
    ) -> Result<BatchCommitment> {
        let range = BatchRange::resolve(self.record_count(), from_index, to_index)?;
        BatchCommitment::from_log(&self.records, range, scheme)
    }

    /// Commit to `[from_index, to_index]` and register the batch.
    ///
    /// Returns the new batch id.
    pub fn create_batch(
        &mut self,
        from_index: u64,
        to_index: u64,
        description: impl Into<String>,
        timestamp: u64,
        scheme: &CommitmentScheme,
    ) -> Result<u64> {
        let commitment = self.commit(from_index, Some(to_index), scheme)?;
        let batch_id = self.batches.len() as u64;
        let batch = commitment.into_batch(batch_id, description.into(), timestamp);
        info!(
            batch_id,
            from_index,
            to_index,
            merkle_root = %batch.root_hex(),
            "created batch"
        );
        self.batches.push(batch);
        Ok(batch_id)
    }

    pub fn batch(&self, batch_id: u64) -> Result<&Batch> {
        usize::try_from(batch_id)
            .ok()
            .and_then(|i| self.batches.get(i))
            .ok_or(MerkleBatchError::BatchNotFound(batch_id))
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn batch_count(&self) -> u64 {
        self.batches.len() as u64
    }

    /// Check a stored record against a registered batch.
    pub fn verify_record(&self, batch_id: u64, index: u64, proof: &BatchProof) -> Result<bool> {
        let batch = self.batch(batch_id)?;
        let record = self.get(index)?;
        batch.verify_record(index, record, proof)
    }
}
