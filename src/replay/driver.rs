use super::{ReplayError, ReplayParams, ReplayState};
use crate::datasource::RecordErrorPolicy;
use crate::domain::{sort_transactions_deterministic, LogRecord, TransactionRecord};
use crate::engine::{DecodeError, EpochDistribution, EpochDistributor, LogIndex, TokenEvent};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters collected during a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub txs_seen: usize,
    pub txs_pre_activation: usize,
    pub txs_replayed: usize,
    pub blocks_advanced: usize,
    pub logs_applied: usize,
    pub logs_skipped: usize,
    pub epochs_distributed: usize,
}

/// Final state of a completed pass.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub state: ReplayState,
    pub stats: ReplayStats,
    pub distributions: Vec<EpochDistribution>,
}

/// Drives a single chronological pass over transactions and their logs.
pub struct ReplayDriver {
    params: ReplayParams,
    distributor: EpochDistributor,
    state: ReplayState,
    stats: ReplayStats,
    distributions: Vec<EpochDistribution>,
}

impl ReplayDriver {
    pub fn new(params: ReplayParams) -> Self {
        let distributor = params.distributor();
        let state = ReplayState::new(&params);
        Self {
            params,
            distributor,
            state,
            stats: ReplayStats::default(),
            distributions: Vec::new(),
        }
    }

    pub fn state(&self) -> &ReplayState {
        &self.state
    }

    /// Replay `txs` (in any order) against `logs` and return the final state.
    ///
    /// # Errors
    /// Returns an error if a log fails to decode and the policy is `Abort`.
    pub fn run(
        mut self,
        mut txs: Vec<TransactionRecord>,
        logs: &[LogRecord],
    ) -> Result<ReplayOutcome, ReplayError> {
        sort_transactions_deterministic(&mut txs);
        let index = LogIndex::new(logs);

        info!(
            txs = txs.len(),
            logs = logs.len(),
            txs_with_logs = index.tx_count(),
            activation_block = self.params.activation_block,
            "Starting replay"
        );

        for tx in &txs {
            self.process_transaction(tx, index.logs_for(&tx.hash))?;
        }

        info!(
            replayed = self.stats.txs_replayed,
            pre_activation = self.stats.txs_pre_activation,
            epochs = self.stats.epochs_distributed,
            "Replay complete"
        );

        Ok(ReplayOutcome {
            state: self.state,
            stats: self.stats,
            distributions: self.distributions,
        })
    }

    /// Process one transaction: ledger events, block advance, epoch check, spend.
    pub fn process_transaction(
        &mut self,
        tx: &TransactionRecord,
        logs: &[&LogRecord],
    ) -> Result<(), ReplayError> {
        self.stats.txs_seen += 1;
        let active = tx.block_number >= self.params.activation_block;

        if !active {
            self.stats.txs_pre_activation += 1;
            if !self.params.replay_pre_activation_logs {
                return Ok(());
            }
        }

        for log in logs {
            self.apply_log(log)?;
        }

        let entered_new_block = self.state.cursor.observe_block(tx.block_number);
        if !active {
            return Ok(());
        }
        self.stats.txs_replayed += 1;

        if entered_new_block {
            self.state
                .scores
                .advance_block(&self.state.delegation, &self.state.ledger);
            self.stats.blocks_advanced += 1;
            debug!(block = tx.block_number, scored = self.state.scores.len(), "Advanced block");
        }

        let state = &mut self.state;
        if let Some(distribution) = self.distributor.maybe_distribute(
            tx.stamp(),
            &mut state.cursor,
            &state.delegation,
            &mut state.spend,
            &mut state.rewards,
        ) {
            info!(
                block = %distribution.stamp,
                total_weighted_spend = distribution.total_weighted_spend,
                distributed = distribution.distributed,
                recipients = distribution.recipients,
                "Distributed epoch rewards"
            );
            self.stats.epochs_distributed += 1;
            self.distributions.push(distribution);
        }

        if let Some(score) = self.state.scores.score(&tx.from) {
            self.state.spend.record_spend(tx.from, score, tx.cost);
        }

        Ok(())
    }

    fn apply_log(&mut self, log: &LogRecord) -> Result<(), ReplayError> {
        match self.apply_token_event(log) {
            Ok(true) => self.stats.logs_applied += 1,
            Ok(false) => {}
            Err(source) => match self.params.on_decode_error {
                RecordErrorPolicy::Abort => {
                    return Err(ReplayError::Decode {
                        tx_hash: log.tx_hash,
                        log_index: log.log_index,
                        source,
                    })
                }
                RecordErrorPolicy::Skip => {
                    warn!(tx = %log.tx_hash, log_index = log.log_index, error = %source, "Skipping undecodable log");
                    self.stats.logs_skipped += 1;
                }
            },
        }
        Ok(())
    }

    /// Returns whether the log was a tracked token event.
    fn apply_token_event(&mut self, log: &LogRecord) -> Result<bool, DecodeError> {
        let state = &mut self.state;
        match TokenEvent::decode(log, self.params.token_contract)? {
            Some(TokenEvent::Transfer { from, to, amount }) => {
                state.ledger.apply_transfer(from, to, amount)?;
                Ok(true)
            }
            Some(TokenEvent::DelegateChanged { delegator }) => {
                state
                    .delegation
                    .apply_delegate_changed(delegator, &mut state.ledger);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
