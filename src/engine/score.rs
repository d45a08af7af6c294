//! Exponentially decayed weighted-delegation scores.

use super::{BalanceLedger, DelegationSet};
use crate::domain::Address;
use std::collections::BTreeMap;

/// Per-block decay factor for a one-week half-life at 5760 blocks per day:
/// `0.5 ^ (1 / 40320)`.
#[allow(clippy::excessive_precision)]
pub const ONE_WEEK_HALF_LIFE_ALPHA: f64 =
    0.9999828089974554711736567733551404044961683376730844584685269050;

/// Blends each delegated address's current balance into a decayed score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEngine {
    alpha: f64,
    scores: BTreeMap<Address, f64>,
}

impl ScoreEngine {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            scores: BTreeMap::new(),
        }
    }

    /// Decay factor whose weight halves every `half_life_blocks` blocks.
    pub fn alpha_for_half_life(half_life_blocks: u64) -> f64 {
        0.5f64.powf(1.0 / half_life_blocks as f64)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Fold one block into every score.
    ///
    /// Every address in the delegation set is updated; one that is not
    /// currently delegating contributes a zero target.
    pub fn advance_block(&mut self, delegation: &DelegationSet, ledger: &BalanceLedger) {
        let alpha = self.alpha;
        for (addr, delegating) in delegation.iter() {
            let target = if delegating {
                ledger.balance_as_f64(addr)
            } else {
                0.0
            };
            let score = self.scores.entry(*addr).or_insert(0.0);
            *score = *score * alpha + target * (1.0 - alpha);
        }
    }

    /// Current score, or `None` if the address has never been scored.
    pub fn score(&self, addr: &Address) -> Option<f64> {
        self.scores.get(addr).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl Default for ScoreEngine {
    fn default() -> Self {
        Self::new(ONE_WEEK_HALF_LIFE_ALPHA)
    }
}
