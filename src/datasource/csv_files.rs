use super::{DataSourceError, RecordError, RecordErrorPolicy};
use crate::domain::{parse_address, parse_hash, LogRecord, TransactionRecord};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Records loaded from an export, plus how many rows were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Load every transaction file under `path` (a directory or a single file).
pub fn load_transactions(
    path: &Path,
    policy: RecordErrorPolicy,
) -> Result<Loaded<TransactionRecord>, DataSourceError> {
    load_all(path, policy, CsvExport::parse_transactions)
}

/// Load every log file under `path` (a directory or a single file).
pub fn load_logs(
    path: &Path,
    policy: RecordErrorPolicy,
) -> Result<Loaded<LogRecord>, DataSourceError> {
    load_all(path, policy, CsvExport::parse_logs)
}

fn load_all<T>(
    path: &Path,
    policy: RecordErrorPolicy,
    parse: fn(&[u8], &str, RecordErrorPolicy) -> Result<Loaded<T>, DataSourceError>,
) -> Result<Loaded<T>, DataSourceError> {
    let mut out = Loaded {
        records: Vec::new(),
        skipped: 0,
    };

    for file in CsvExport::list_files(path)? {
        let bytes = CsvExport::read_file(&file)?;
        let name = file.display().to_string();
        let loaded = parse(&bytes, &name, policy)?;
        debug!(file = %name, rows = loaded.records.len(), skipped = loaded.skipped, "Loaded export file");
        out.records.extend(loaded.records);
        out.skipped += loaded.skipped;
    }

    Ok(out)
}

/// Reader for the CSV exports of transactions and logs.
pub struct CsvExport;

impl CsvExport {
    /// Input files under `path` in filename order; `path` itself if it is a file.
    pub fn list_files(path: &Path) -> Result<Vec<PathBuf>, DataSourceError> {
        let io_err = |source| DataSourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let meta = std::fs::metadata(path).map_err(io_err)?;
        if meta.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && entry.file_type().map_err(io_err)?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Read a file, decompressing it if it ends in `.lz4` or `.gz`.
    pub fn read_file(path: &Path) -> Result<Vec<u8>, DataSourceError> {
        let bytes = std::fs::read(path).map_err(|source| DataSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "lz4" => Self::decompress_lz4_frame(&bytes)
                .map_err(|e| DataSourceError::Lz4(path.to_path_buf(), e.to_string())),
            "gz" => Self::decompress_gzip(&bytes)
                .map_err(|e| DataSourceError::Gzip(path.to_path_buf(), e.to_string())),
            _ => Ok(bytes),
        }
    }

    pub fn decompress_lz4_frame(lz4_bytes: &[u8]) -> Result<Vec<u8>, std::io::Error> {
        let mut decoder = lz4_flex::frame::FrameDecoder::new(lz4_bytes);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }

    pub fn decompress_gzip(gz_bytes: &[u8]) -> Result<Vec<u8>, std::io::Error> {
        let mut decoder = flate2::read::GzDecoder::new(gz_bytes);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }

    /// Parse transaction rows:
    /// `_, hash, from, to, cost, block_number, block_time, index, log_count`.
    pub fn parse_transactions(
        csv_bytes: &[u8],
        source: &str,
        policy: RecordErrorPolicy,
    ) -> Result<Loaded<TransactionRecord>, DataSourceError> {
        Self::parse_rows(csv_bytes, source, policy, |row| {
            Ok(TransactionRecord {
                hash: row.parse(1, "hash", |s| parse_hash(s).map_err(|e| e.to_string()))?,
                from: row.parse(2, "from", |s| parse_address(s).map_err(|e| e.to_string()))?,
                to: row.parse(3, "to", |s| parse_address(s).map_err(|e| e.to_string()))?,
                cost: row.parse(4, "cost", parse_cost)?,
                block_number: row.parse(5, "block_number", parse_num)?,
                block_time: row.parse(6, "block_time", parse_num)?,
                index: row.parse(7, "index", parse_num)?,
                log_count: row.parse(8, "log_count", parse_num)?,
            })
        })
    }

    /// Parse log rows: `_, address, topic0, data, tx_hash, log_index, topics`.
    pub fn parse_logs(
        csv_bytes: &[u8],
        source: &str,
        policy: RecordErrorPolicy,
    ) -> Result<Loaded<LogRecord>, DataSourceError> {
        Self::parse_rows(csv_bytes, source, policy, |row| {
            Ok(LogRecord {
                address: row.parse(1, "address", |s| {
                    parse_address(s).map_err(|e| e.to_string())
                })?,
                topic0: row.parse(2, "topic0", |s| parse_hash(s).map_err(|e| e.to_string()))?,
                data: row.field(3, "data")?.to_string(),
                tx_hash: row.parse(4, "tx_hash", |s| parse_hash(s).map_err(|e| e.to_string()))?,
                log_index: row.parse(5, "log_index", parse_num)?,
                topics: row.field(6, "topics")?.to_string(),
            })
        })
    }

    fn parse_rows<T>(
        csv_bytes: &[u8],
        source: &str,
        policy: RecordErrorPolicy,
        build: impl Fn(&Row<'_>) -> Result<T, RecordError>,
    ) -> Result<Loaded<T>, DataSourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_bytes);

        let mut records = Vec::new();
        let mut skipped = 0;
        for result in reader.records() {
            let record =
                result.map_err(|e| DataSourceError::Csv(PathBuf::from(source), e.to_string()))?;
            let row = Row {
                record: &record,
                source,
                line: record.position().map(|p| p.line()).unwrap_or(0),
            };

            match build(&row) {
                Ok(value) => records.push(value),
                Err(e) => match policy {
                    RecordErrorPolicy::Abort => return Err(e.into()),
                    RecordErrorPolicy::Skip => {
                        warn!(error = %e, "Skipping malformed row");
                        skipped += 1;
                    }
                },
            }
        }

        Ok(Loaded { records, skipped })
    }
}

struct Row<'a> {
    record: &'a csv::StringRecord,
    source: &'a str,
    line: u64,
}

impl Row<'_> {
    fn error(&self, column: usize, field: &'static str, value: &str, reason: String) -> RecordError {
        RecordError {
            file: self.source.to_string(),
            line: self.line,
            column,
            field,
            value: value.to_string(),
            reason,
        }
    }

    fn field(&self, column: usize, field: &'static str) -> Result<&str, RecordError> {
        self.record
            .get(column)
            .ok_or_else(|| self.error(column, field, "", "missing column".to_string()))
    }

    fn parse<T>(
        &self,
        column: usize,
        field: &'static str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<T, RecordError> {
        let raw = self.field(column, field)?;
        parse(raw).map_err(|reason| self.error(column, field, raw, reason))
    }
}

fn parse_num<T>(s: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.trim().parse::<T>().map_err(|e| e.to_string())
}

fn parse_cost(s: &str) -> Result<f64, String> {
    let cost = parse_num::<f64>(s)?;
    if !cost.is_finite() || cost < 0.0 {
        return Err("must be a finite non-negative number".to_string());
    }
    Ok(cost)
}
