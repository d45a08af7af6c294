//! Pure computation engine(s) for the deterministic rebate replay.

pub mod balances;
pub mod delegation;
pub mod distributor;
pub mod events;
pub mod log_index;
pub mod score;
pub mod spend;

pub use balances::BalanceLedger;
pub use delegation::DelegationSet;
pub use distributor::{
    EpochDistribution, EpochDistributor, RewardLedger, EPOCH_LENGTH_BLOCKS,
    REWARD_POOL_PER_EPOCH,
};
pub use events::{DecodeError, TokenEvent, DELEGATE_CHANGED_TOPIC, TRANSFER_TOPIC};
pub use log_index::LogIndex;
pub use score::{ScoreEngine, ONE_WEEK_HALF_LIFE_ALPHA};
pub use spend::SpendAccumulator;

use crate::domain::BlockStamp;

/// Block cursors driving lazy score advancement and epoch checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCursor {
    /// Block of the previous transaction visited, if any.
    pub last_observed_block: Option<u64>,
    /// Block of the last distribution (the activation block before the first one).
    pub last_distribution_block: u64,
    /// Stamp of the last distribution, reported with the final table.
    pub last_updated: Option<BlockStamp>,
}

impl BlockCursor {
    pub fn new(activation_block: u64) -> Self {
        Self {
            last_observed_block: None,
            last_distribution_block: activation_block,
            last_updated: None,
        }
    }

    /// Record that a transaction in `block_number` is being visited.
    ///
    /// Returns true when this is the first transaction of a block strictly
    /// after the previously observed one. The very first block returns false.
    pub fn observe_block(&mut self, block_number: u64) -> bool {
        let entered_new_block = matches!(self.last_observed_block, Some(prev) if block_number > prev);
        self.last_observed_block = Some(block_number);
        entered_new_block
    }
}
