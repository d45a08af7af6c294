//! Reward table rendering, run summary, and output files.

use crate::domain::{Address, BlockStamp};
use crate::engine::{RewardLedger, SpendAccumulator};
use crate::replay::{ReplayOutcome, ReplayStats};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REWARD_TABLE_HEADER: [&str; 6] =
    ["address", "reward", "spent", "count", "blockNumber", "blockTime"];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One output row: cumulative reward joined with lifetime spend.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardRow {
    pub address: Address,
    pub reward: f64,
    pub spent: f64,
    pub tx_count: u64,
}

/// The final reward table, sorted by address.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardTable {
    pub rows: Vec<RewardRow>,
    /// Stamp of the last distribution; zero if none fired.
    pub last_updated: BlockStamp,
}

#[derive(Serialize)]
struct CsvRow {
    address: String,
    reward: String,
    spent: String,
    count: u64,
    block_number: u64,
    block_time: i64,
}

impl RewardTable {
    pub fn build(
        rewards: &RewardLedger,
        spend: &SpendAccumulator,
        last_updated: Option<BlockStamp>,
    ) -> Self {
        // RewardLedger iterates in address order.
        let rows = rewards
            .iter()
            .map(|(addr, reward)| RewardRow {
                address: *addr,
                reward,
                spent: spend.spent_of(addr),
                tx_count: spend.tx_count_of(addr),
            })
            .collect();

        Self {
            rows,
            last_updated: last_updated.unwrap_or_default(),
        }
    }

    pub fn from_outcome(outcome: &ReplayOutcome) -> Self {
        Self::build(
            &outcome.state.rewards,
            &outcome.state.spend,
            outcome.state.cursor.last_updated,
        )
    }

    pub fn row(&self, addr: &Address) -> Option<&RewardRow> {
        self.rows.iter().find(|r| &r.address == addr)
    }

    /// Render as CSV: checksummed addresses, amounts with 8 decimal places.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, ReportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(REWARD_TABLE_HEADER)?;
        for row in &self.rows {
            writer.serialize(CsvRow {
                address: row.address.to_checksum(None),
                reward: format!("{:.8}", row.reward),
                spent: format!("{:.8}", row.spent),
                count: row.tx_count,
                block_number: self.last_updated.number,
                block_time: self.last_updated.timestamp,
            })?;
        }

        writer
            .into_inner()
            .map_err(|e| ReportError::Csv(e.into_error().into()))
    }

    pub fn write_csv(&self, path: &Path) -> Result<String, ReportError> {
        let bytes = self.to_csv_bytes()?;
        std::fs::write(path, &bytes).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(sha256_hex(&bytes))
    }
}

/// Hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Aggregate figures of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub stats: ReplayStats,
    pub eligible_spent: f64,
    pub eligible_tx_count: u64,
    pub ledger_addresses: usize,
    pub positive_holders: usize,
    pub delegators: usize,
    pub reward_rows: usize,
    pub total_rewards: f64,
    pub last_updated: BlockStamp,
    pub table_sha256: String,
    /// Claim tree root, when an airdrop file was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airdrop_root: Option<String>,
}

impl RunSummary {
    pub fn new(outcome: &ReplayOutcome, table: &RewardTable, table_sha256: String) -> Self {
        let state = &outcome.state;
        Self {
            stats: outcome.stats.clone(),
            eligible_spent: state.spend.lifetime_spent(),
            eligible_tx_count: state.spend.lifetime_tx_count(),
            ledger_addresses: state.ledger.len(),
            positive_holders: state.ledger.positive_holders(),
            delegators: state.delegation.len(),
            reward_rows: table.rows.len(),
            total_rewards: state.rewards.total(),
            last_updated: table.last_updated,
            table_sha256,
            airdrop_root: None,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
