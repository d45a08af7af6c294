use super::ReplayParams;
use crate::engine::{
    BalanceLedger, BlockCursor, DelegationSet, RewardLedger, ScoreEngine, SpendAccumulator,
};

/// All mutable state of one replay pass.
///
/// Created empty, mutated in strict transaction order, read once at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayState {
    pub ledger: BalanceLedger,
    pub delegation: DelegationSet,
    pub scores: ScoreEngine,
    pub spend: SpendAccumulator,
    pub rewards: RewardLedger,
    pub cursor: BlockCursor,
}

impl ReplayState {
    pub fn new(params: &ReplayParams) -> Self {
        Self {
            ledger: BalanceLedger::new(),
            delegation: DelegationSet::new(),
            scores: ScoreEngine::new(params.alpha),
            spend: SpendAccumulator::new(),
            rewards: RewardLedger::new(),
            cursor: BlockCursor::new(params.activation_block),
        }
    }
}
