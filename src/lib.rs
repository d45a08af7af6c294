pub mod airdrop;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod replay;
pub mod report;

pub use airdrop::Airdrop;
pub use config::Config;
pub use datasource::{DataSourceError, RecordErrorPolicy};
pub use domain::{Address, BlockStamp, LogRecord, TransactionRecord, B256, I256, U256};
pub use error::AppError;
pub use replay::{ReplayDriver, ReplayOutcome, ReplayParams};
pub use report::{RewardTable, RunSummary};

use tracing::info;

/// Load the exports named by `config`, replay them, and write the reward table.
pub fn run(config: &Config) -> Result<RunSummary, AppError> {
    let txs = datasource::load_transactions(&config.txs_path, config.record_error_policy)?;
    let logs = datasource::load_logs(&config.logs_path, config.record_error_policy)?;
    info!(
        txs = txs.records.len(),
        txs_skipped = txs.skipped,
        logs = logs.records.len(),
        logs_skipped = logs.skipped,
        "Loaded exports"
    );

    let outcome = ReplayDriver::new(config.params.clone()).run(txs.records, &logs.records)?;

    let table = RewardTable::from_outcome(&outcome);
    let digest = table.write_csv(&config.output_path)?;
    let mut summary = RunSummary::new(&outcome, &table, digest);

    info!(
        path = %config.output_path.display(),
        rows = summary.reward_rows,
        sha256 = %summary.table_sha256,
        "Wrote reward table"
    );
    info!(
        eligible_spent = summary.eligible_spent,
        eligible_txs = summary.eligible_tx_count,
        ledger_addresses = summary.ledger_addresses,
        positive_holders = summary.positive_holders,
        delegators = summary.delegators,
        last_updated = %summary.last_updated,
        "Run summary"
    );

    if let Some(path) = &config.airdrop_path {
        let airdrop = Airdrop::from_table(&table)?;
        airdrop.write_csv(path)?;
        info!(
            path = %path.display(),
            claims = airdrop.claims.len(),
            root = %airdrop.root,
            "Wrote airdrop claims"
        );
        summary.airdrop_root = Some(airdrop.root.to_string());
    }

    if let Some(path) = &config.summary_path {
        summary.write_json(path)?;
    }

    Ok(summary)
}
