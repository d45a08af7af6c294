//! Domain primitives: BlockStamp, hex field parsing, topic address extraction.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A block number paired with its Unix timestamp (seconds).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockStamp {
    pub number: u64,
    pub timestamp: i64,
}

impl BlockStamp {
    pub fn new(number: u64, timestamp: i64) -> Self {
        Self { number, timestamp }
    }

    /// RFC 3339 rendering of the block timestamp, if it is representable.
    pub fn to_rfc3339(&self) -> Option<String> {
        chrono::DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.to_rfc3339())
    }
}

impl std::fmt::Display for BlockStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_rfc3339() {
            Some(ts) => write!(f, "#{} ({})", self.number, ts),
            None => write!(f, "#{} (t={})", self.number, self.timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexFieldError {
    #[error("invalid address: {0:?}")]
    Address(String),
    #[error("invalid 32-byte hash: {0:?}")]
    Hash(String),
    #[error("topic segment too short for an address: {0:?}")]
    ShortSegment(String),
}

/// Parse a `0x`-prefixed (or bare) 20-byte hex address.
pub fn parse_address(s: &str) -> Result<Address, HexFieldError> {
    Address::from_str(s.trim()).map_err(|_| HexFieldError::Address(s.to_string()))
}

/// Parse a `0x`-prefixed (or bare) 32-byte hex hash or topic.
pub fn parse_hash(s: &str) -> Result<B256, HexFieldError> {
    B256::from_str(s.trim()).map_err(|_| HexFieldError::Hash(s.to_string()))
}

/// Read the address held in the low 20 bytes of a 32-byte topic segment.
///
/// `segment` is the hex text of one topic without its `0x` prefix.
pub fn address_from_topic_segment(segment: &str) -> Result<Address, HexFieldError> {
    let segment = segment.trim();
    if !segment.is_ascii() {
        return Err(HexFieldError::Address(segment.to_string()));
    }
    if segment.len() < 40 {
        return Err(HexFieldError::ShortSegment(segment.to_string()));
    }
    let low = &segment[segment.len() - 40..];
    Address::from_str(low).map_err(|_| HexFieldError::Address(low.to_string()))
}
