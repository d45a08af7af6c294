use crate::airdrop::AirdropError;
use crate::config::ConfigError;
use crate::datasource::DataSourceError;
use crate::replay::ReplayError;
use crate::report::ReportError;
use thiserror::Error;

/// Top-level failure of a rebate run. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Input error: {0}")]
    Input(#[from] DataSourceError),
    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),
    #[error("Output error: {0}")]
    Output(#[from] ReportError),
    #[error("Airdrop error: {0}")]
    Airdrop(#[from] AirdropError),
}
