use crate::domain::Address;
use std::collections::BTreeMap;

/// Per-address spend metrics.
///
/// Weighted spend is drained at every epoch distribution; raw spend and
/// transaction counts are lifetime totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendAccumulator {
    weighted: BTreeMap<Address, f64>,
    spent: BTreeMap<Address, f64>,
    tx_count: BTreeMap<Address, u64>,
}

impl SpendAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accrue one transaction sent by `from` at the given decay score.
    pub fn record_spend(&mut self, from: Address, score: f64, cost: f64) {
        *self.weighted.entry(from).or_insert(0.0) += score * cost;
        *self.spent.entry(from).or_insert(0.0) += cost;
        *self.tx_count.entry(from).or_insert(0) += 1;
    }

    /// Sum of weighted spend accrued since the last drain, in address order.
    pub fn total_weighted(&self) -> f64 {
        self.weighted.values().sum()
    }

    pub fn weighted_of(&self, addr: &Address) -> f64 {
        self.weighted.get(addr).copied().unwrap_or(0.0)
    }

    /// Take the weighted-spend accumulator, leaving it empty.
    pub fn drain_weighted(&mut self) -> BTreeMap<Address, f64> {
        std::mem::take(&mut self.weighted)
    }

    pub fn spent_of(&self, addr: &Address) -> f64 {
        self.spent.get(addr).copied().unwrap_or(0.0)
    }

    pub fn tx_count_of(&self, addr: &Address) -> u64 {
        self.tx_count.get(addr).copied().unwrap_or(0)
    }

    /// Lifetime spend over all addresses.
    pub fn lifetime_spent(&self) -> f64 {
        self.spent.values().sum()
    }

    /// Lifetime transaction count over all addresses.
    pub fn lifetime_tx_count(&self) -> u64 {
        self.tx_count.values().sum()
    }
}
