use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use meshx_merkle::{Batch, CommitmentScheme, RecordLog, SensorRecord, to_hex, verify_hex_proof};
use serde::Serialize;
use tracing::{debug, info};

/// Output of `commit`: the batch to anchor and the proofs to publish.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitOutput {
    pub batch: Batch,
    pub merkle_root: String,
    pub proofs: BTreeMap<u64, Vec<String>>,
}

pub fn load_records(path: &Path) -> Result<RecordLog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read records from {}", path.display()))?;
    let records: Vec<SensorRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse records in {}", path.display()))?;
    debug!(count = records.len(), path = %path.display(), "loaded records");
    Ok(RecordLog::from_records(records))
}

pub fn resolve_scheme(version: u16) -> Result<&'static CommitmentScheme> {
    Ok(CommitmentScheme::from_version(version)?)
}

pub fn default_description(from_index: u64, to_index: u64, created_at: DateTime<Utc>) -> String {
    format!(
        "Batch {}-{} created on {}",
        from_index,
        to_index,
        created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

pub fn commit(
    log: &RecordLog,
    from: u64,
    to: Option<u64>,
    batch_id: u64,
    description: Option<String>,
    scheme: &CommitmentScheme,
    created_at: DateTime<Utc>,
) -> Result<CommitOutput> {
    let commitment = log
        .commit(from, to, scheme)
        .with_context(|| format!("cannot commit records from index {}", from))?;
    let range = commitment.range();
    let proofs = commitment.hex_proofs();
    let merkle_root = commitment.root_hex();
    let description = description
        .unwrap_or_else(|| default_description(range.from_index, range.to_index, created_at));
    let timestamp = u64::try_from(created_at.timestamp())
        .context("batch creation time is before the unix epoch")?;

    info!(
        from_index = range.from_index,
        to_index = range.to_index,
        merkle_root = %merkle_root,
        "computed batch commitment"
    );
    Ok(CommitOutput {
        batch: commitment.into_batch(batch_id, description, timestamp),
        merkle_root,
        proofs,
    })
}

pub fn leaf(log: &RecordLog, index: u64, scheme: &CommitmentScheme) -> Result<String> {
    let record = log.get(index)?;
    Ok(to_hex(&scheme.leaf_hash(record, index)))
}

pub fn verify(
    log: &RecordLog,
    index: u64,
    proof: &[String],
    root: &str,
    scheme: &CommitmentScheme,
) -> Result<bool> {
    let leaf = leaf(log, index, scheme)?;
    let verified = verify_hex_proof(&leaf, proof, root).context("malformed proof or root")?;
    info!(index, verified, "checked inclusion proof");
    Ok(verified)
}
