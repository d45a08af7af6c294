//! Transaction record as loaded from the transaction export.

use super::BlockStamp;
use alloy_primitives::{Address, B256};

/// A single transaction touching the tracked token.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Transaction hash.
    pub hash: B256,
    /// Sender address.
    pub from: Address,
    /// Receiver address.
    pub to: Address,
    /// Amount spent by the sender (gas cost). Treated as an opaque spend metric.
    pub cost: f64,
    /// Containing block number.
    pub block_number: u64,
    /// Block timestamp in Unix seconds.
    pub block_time: i64,
    /// Position of the transaction within its block.
    pub index: u64,
    /// Number of logs the transaction emitted (informational).
    pub log_count: u64,
}

impl TransactionRecord {
    /// Block number and timestamp of the containing block.
    pub fn stamp(&self) -> BlockStamp {
        BlockStamp::new(self.block_number, self.block_time)
    }
}
