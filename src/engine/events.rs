//! Decoding of the tracked token's Transfer and DelegateChanged logs.

use crate::domain::{Address, HexFieldError, LogRecord, B256, U256};
use alloy_primitives::b256;
use thiserror::Error;

/// `Transfer(address indexed from, address indexed to, uint256 value)`
pub const TRANSFER_TOPIC: B256 =
    b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");

/// `DelegateChanged(address indexed delegator, address indexed fromDelegate, address indexed toDelegate)`
pub const DELEGATE_CHANGED_TOPIC: B256 =
    b256!("3134e8a2e6d97e929a7e54011ea5485d7d196dd5f0ba4d4ef95803e8e3fc257f");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("bad topic list: {0}")]
    Topic(#[from] HexFieldError),
    #[error("bad data payload {0:?}: {1}")]
    Data(String, String),
    #[error("amount does not fit in 256 bits ({0} significant bytes)")]
    AmountTooWide(usize),
    #[error("balance overflow for {0}")]
    BalanceOverflow(Address),
}

/// A token event relevant to the replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEvent {
    Transfer {
        from: Address,
        to: Address,
        amount: U256,
    },
    DelegateChanged {
        delegator: Address,
    },
}

impl TokenEvent {
    /// Decode `log` if it was emitted by `token` with a tracked signature.
    ///
    /// Returns `Ok(None)` for logs of other contracts or other events.
    pub fn decode(log: &LogRecord, token: Address) -> Result<Option<Self>, DecodeError> {
        if log.address != token {
            return Ok(None);
        }

        if log.topic0 == TRANSFER_TOPIC {
            let from = log.topic_address(0)?;
            let to = log.topic_address(1)?;
            let amount = decode_amount(&log.data)?;
            Ok(Some(TokenEvent::Transfer { from, to, amount }))
        } else if log.topic0 == DELEGATE_CHANGED_TOPIC {
            let delegator = log.topic_address(0)?;
            Ok(Some(TokenEvent::DelegateChanged { delegator }))
        } else {
            Ok(None)
        }
    }
}

/// Decode a big-endian unsigned amount from a hex data payload.
///
/// An empty payload is zero. Odd-length payloads are left-padded with one nibble.
pub fn decode_amount(data: &str) -> Result<U256, DecodeError> {
    let trimmed = data.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes = if digits.len() % 2 == 1 {
        hex::decode(format!("0{}", digits))
    } else {
        hex::decode(digits)
    }
    .map_err(|e| DecodeError::Data(data.to_string(), e.to_string()))?;

    let significant = match bytes.iter().position(|b| *b != 0) {
        Some(first) => &bytes[first..],
        None => return Ok(U256::ZERO),
    };

    U256::try_from_be_slice(significant).ok_or(DecodeError::AmountTooWide(significant.len()))
}
