use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, name = "meshx-batch", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Commitment scheme version used to hash records.
    #[arg(long, global = true, default_value_t = 2, env = "MESHX_SCHEME_VERSION")]
    pub scheme_version: u16,
}

#[derive(Subcommand)]
pub enum Command {
    /// Computes the Merkle root and per-record proofs for a range of records.
    Commit {
        /// JSON array of sensor records; array position is the log index.
        #[arg(short, long)]
        records: PathBuf,
        /// First log index of the batch.
        #[arg(long, default_value_t = 0)]
        from: u64,
        /// Last log index of the batch (inclusive). Defaults to at most ten
        /// records.
        #[arg(long)]
        to: Option<u64>,
        /// Batch id to report.
        #[arg(long, default_value_t = 0)]
        batch_id: u64,
        /// Batch description. Defaults to the range and creation time.
        #[arg(long)]
        description: Option<String>,
        /// Write the JSON result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Checks a record's inclusion proof against a Merkle root.
    Verify {
        /// JSON array of sensor records.
        #[arg(short, long)]
        records: PathBuf,
        /// Log index of the record to check.
        #[arg(long)]
        index: u64,
        /// Comma-separated hex sibling hashes, leaf level first.
        #[arg(long, value_delimiter = ',')]
        proof: Vec<String>,
        /// Expected Merkle root (hex).
        #[arg(long)]
        root: String,
    },
    /// Prints the leaf hash of one record.
    Leaf {
        /// JSON array of sensor records.
        #[arg(short, long)]
        records: PathBuf,
        /// Log index of the record.
        #[arg(long)]
        index: u64,
    },
}
