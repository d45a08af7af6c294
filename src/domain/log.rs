//! Event log record and raw topic list handling.

use super::primitives::{address_from_topic_segment, HexFieldError};
use alloy_primitives::{Address, B256};

/// A single event log emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Emitting contract.
    pub address: Address,
    /// Event signature topic.
    pub topic0: B256,
    /// Raw hex data payload.
    pub data: String,
    /// Owning transaction hash.
    pub tx_hash: B256,
    /// Position of the log within the transaction.
    pub log_index: u64,
    /// Indexed topics after topic0, hex-concatenated with a `0x` before each.
    pub topics: String,
}

impl LogRecord {
    /// Indexed topic segments (without their `0x` prefixes), in order.
    pub fn topic_segments(&self) -> impl Iterator<Item = &str> {
        self.topics.split("0x").skip(1)
    }

    /// Address held in the `n`th indexed topic segment.
    pub fn topic_address(&self, n: usize) -> Result<Address, HexFieldError> {
        let segment = self
            .topic_segments()
            .nth(n)
            .ok_or_else(|| HexFieldError::ShortSegment(format!("missing topic {}", n + 1)))?;
        address_from_topic_segment(segment)
    }
}
