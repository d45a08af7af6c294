//! Stable transaction ordering for deterministic replay.

use crate::domain::TransactionRecord;

/// Ordering key for transactions: block number, then position within block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TxOrderingKey {
    /// Containing block (primary sort).
    pub block_number: u64,
    /// Index within the block (secondary sort).
    pub index: u64,
}

impl TxOrderingKey {
    pub fn from_tx(tx: &TransactionRecord) -> Self {
        TxOrderingKey {
            block_number: tx.block_number,
            index: tx.index,
        }
    }
}

/// Sort transactions chronologically.
///
/// The sort is stable, so duplicate keys keep their load order.
pub fn sort_transactions_deterministic(txs: &mut [TransactionRecord]) {
    txs.sort_by_key(TxOrderingKey::from_tx);
}
