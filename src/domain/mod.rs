//! Domain types and determinism layer for the rebate replay.
//!
//! This module provides:
//! - Transaction and log records as loaded from the chain exports
//! - Block stamps and strict hex field parsing
//! - Fixed-point token amount conversion and parsing
//! - Stable transaction ordering key for deterministic replay

pub mod amount;
pub mod log;
pub mod ordering;
pub mod primitives;
pub mod transaction;

pub use alloy_primitives::{Address, B256, I256, U256};
pub use amount::{decimal_str_to_units, units_to_f64, whole_tokens, TOKEN_DECIMALS};
pub use log::LogRecord;
pub use ordering::{sort_transactions_deterministic, TxOrderingKey};
pub use primitives::{
    address_from_topic_segment, parse_address, parse_hash, BlockStamp, HexFieldError,
};
pub use transaction::TransactionRecord;
