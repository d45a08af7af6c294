//! Replay pipeline: one ordered pass over transactions, producing rewards.
//!
//! This module provides:
//! - The protocol constants and tunable [`ReplayParams`]
//! - [`ReplayState`], the ledgers and cursors owned by a single pass
//! - [`ReplayDriver`], which wires the engine components together

use crate::datasource::RecordErrorPolicy;
use crate::domain::{Address, B256};
use crate::engine::{
    DecodeError, EpochDistributor, EPOCH_LENGTH_BLOCKS, ONE_WEEK_HALF_LIFE_ALPHA,
    REWARD_POOL_PER_EPOCH,
};
use alloy_primitives::address;
use thiserror::Error;

pub mod driver;
pub mod state;

pub use driver::{ReplayDriver, ReplayOutcome, ReplayStats};
pub use state::ReplayState;

/// Tracked token contract.
pub const GAS_TOKEN: Address = address!("6bba316c48b49bd1eac44573c5c871ff02958469");

/// First block whose transactions take part in the replay.
pub const ACTIVATION_BLOCK: u64 = 13_929_167;

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayParams {
    pub token_contract: Address,
    pub activation_block: u64,
    pub epoch_length: u64,
    pub reward_pool: f64,
    pub alpha: f64,
    /// Apply ledger events of pre-activation transactions (scores and spend stay gated).
    pub replay_pre_activation_logs: bool,
    /// Handling of logs that fail to decode.
    pub on_decode_error: RecordErrorPolicy,
}

impl ReplayParams {
    pub fn distributor(&self) -> EpochDistributor {
        EpochDistributor::new(self.epoch_length, self.reward_pool)
    }
}

impl Default for ReplayParams {
    fn default() -> Self {
        Self {
            token_contract: GAS_TOKEN,
            activation_block: ACTIVATION_BLOCK,
            epoch_length: EPOCH_LENGTH_BLOCKS,
            reward_pool: REWARD_POOL_PER_EPOCH,
            alpha: ONE_WEEK_HALF_LIFE_ALPHA,
            replay_pre_activation_logs: false,
            on_decode_error: RecordErrorPolicy::Abort,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("log {log_index} of transaction {tx_hash}: {source}")]
    Decode {
        tx_hash: B256,
        log_index: u64,
        #[source]
        source: DecodeError,
    },
}
