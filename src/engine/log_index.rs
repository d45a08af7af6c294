//! Grouping of event logs by owning transaction.

use crate::domain::{LogRecord, B256};
use std::collections::HashMap;

/// Logs grouped by transaction hash, in their original relative order.
#[derive(Debug, Default)]
pub struct LogIndex<'a> {
    by_tx: HashMap<B256, Vec<&'a LogRecord>>,
}

impl<'a> LogIndex<'a> {
    pub fn new(logs: &'a [LogRecord]) -> Self {
        let mut by_tx: HashMap<B256, Vec<&LogRecord>> = HashMap::new();
        for log in logs {
            by_tx.entry(log.tx_hash).or_default().push(log);
        }
        Self { by_tx }
    }

    /// Logs of `tx_hash`; empty if the transaction emitted none.
    pub fn logs_for(&self, tx_hash: &B256) -> &[&'a LogRecord] {
        self.by_tx.get(tx_hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct transactions with at least one log.
    pub fn tx_count(&self) -> usize {
        self.by_tx.len()
    }
}
