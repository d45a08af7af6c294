//! Epoch-boundary reward distribution.

use super::{BlockCursor, DelegationSet, SpendAccumulator};
use crate::domain::{Address, BlockStamp};
use std::collections::BTreeMap;

/// Blocks per epoch (about one day).
pub const EPOCH_LENGTH_BLOCKS: u64 = 5760;

/// Reward units distributed at every epoch boundary.
pub const REWARD_POOL_PER_EPOCH: f64 = 500_000_000.0;

/// Cumulative rewards per address.
///
/// Only addresses that were delegating at some epoch boundary have entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardLedger {
    rewards: BTreeMap<Address, f64>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reward_of(&self, addr: &Address) -> Option<f64> {
        self.rewards.get(addr).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, f64)> {
        self.rewards.iter().map(|(addr, reward)| (addr, *reward))
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.rewards.values().sum()
    }
}

/// Outcome of one epoch boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochDistribution {
    pub stamp: BlockStamp,
    pub total_weighted_spend: f64,
    /// Amount added across all recipients; zero for an epoch with no weighted spend.
    pub distributed: f64,
    pub recipients: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochDistributor {
    epoch_length: u64,
    reward_pool: f64,
}

impl EpochDistributor {
    pub fn new(epoch_length: u64, reward_pool: f64) -> Self {
        Self {
            epoch_length,
            reward_pool,
        }
    }

    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    pub fn reward_pool(&self) -> f64 {
        self.reward_pool
    }

    pub fn is_due(&self, block_number: u64, cursor: &BlockCursor) -> bool {
        block_number.saturating_sub(cursor.last_distribution_block) >= self.epoch_length
    }

    /// Distribute the pool if an epoch has elapsed since the last distribution.
    ///
    /// Each address's share is proportional to its weighted spend since the
    /// previous boundary. The weighted-spend accumulator is drained either way.
    pub fn maybe_distribute(
        &self,
        stamp: BlockStamp,
        cursor: &mut BlockCursor,
        delegation: &DelegationSet,
        spend: &mut SpendAccumulator,
        rewards: &mut RewardLedger,
    ) -> Option<EpochDistribution> {
        if !self.is_due(stamp.number, cursor) {
            return None;
        }

        for (addr, _) in delegation.iter() {
            rewards.rewards.entry(*addr).or_insert(0.0);
        }

        let total_weighted_spend = spend.total_weighted();
        let weighted = spend.drain_weighted();

        let mut distributed = 0.0;
        let mut recipients = 0;
        if total_weighted_spend != 0.0 {
            for (addr, value) in weighted.into_iter().filter(|(_, v)| *v != 0.0) {
                let share = self.reward_pool * value / total_weighted_spend;
                *rewards.rewards.entry(addr).or_insert(0.0) += share;
                distributed += share;
                recipients += 1;
            }
        }

        cursor.last_distribution_block = stamp.number;
        cursor.last_updated = Some(stamp);

        Some(EpochDistribution {
            stamp,
            total_weighted_spend,
            distributed,
            recipients,
        })
    }
}

impl Default for EpochDistributor {
    fn default() -> Self {
        Self::new(EPOCH_LENGTH_BLOCKS, REWARD_POOL_PER_EPOCH)
    }
}
