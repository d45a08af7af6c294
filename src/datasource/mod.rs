//! Loading transaction and log exports from CSV files.
//!
//! Inputs are directories of `.csv`, gzip `.csv.gz` or LZ4-framed `.csv.lz4`
//! files, read in filename order. Each field is parsed strictly; what happens to a row that
//! fails is decided by the [`RecordErrorPolicy`].

use std::path::PathBuf;
use thiserror::Error;

pub mod csv_files;

pub use csv_files::{load_logs, load_transactions, CsvExport, Loaded};

/// What to do with a row whose fields fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordErrorPolicy {
    /// Fail the whole load.
    #[default]
    Abort,
    /// Drop the row, log it, and keep going.
    Skip,
}

/// A single field that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}: column {column} ({field}) = {value:?}: {reason}")]
pub struct RecordError {
    pub file: String,
    pub line: u64,
    pub column: usize,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("lz4 decode error in {0}: {1}")]
    Lz4(PathBuf, String),
    #[error("gzip decode error in {0}: {1}")]
    Gzip(PathBuf, String),
    #[error("csv parse error in {0}: {1}")]
    Csv(PathBuf, String),
    #[error("malformed record: {0}")]
    Record(#[from] RecordError),
}
