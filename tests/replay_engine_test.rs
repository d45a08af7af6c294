use alloy_primitives::address;
use gasrebate::domain::whole_tokens;
use gasrebate::engine::{DELEGATE_CHANGED_TOPIC, TRANSFER_TOPIC};
use gasrebate::replay::{ReplayOutcome, ACTIVATION_BLOCK, GAS_TOKEN};
use gasrebate::{
    Address, LogRecord, ReplayDriver, ReplayParams, RewardTable, TransactionRecord, B256, U256,
};

const A: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
const B: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
const C: Address = address!("cccccccccccccccccccccccccccccccccccccccc");
const D: Address = address!("dddddddddddddddddddddddddddddddddddddddd");

/// Builds transactions and their logs with unique hashes.
#[derive(Default)]
struct Chain {
    txs: Vec<TransactionRecord>,
    logs: Vec<LogRecord>,
    next: u64,
}

impl Chain {
    fn tx(&mut self, from: Address, block: u64, index: u64, cost: f64) -> B256 {
        self.next += 1;
        let hash = B256::left_padding_from(&self.next.to_be_bytes());
        self.txs.push(TransactionRecord {
            hash,
            from,
            to: B,
            cost,
            block_number: block,
            block_time: 1_640_000_000 + (block as i64) * 13,
            index,
            log_count: 0,
        });
        hash
    }

    fn transfer(&mut self, tx: B256, from: Address, to: Address, amount: U256) {
        let log_index = self.logs.len() as u64;
        self.logs.push(LogRecord {
            address: GAS_TOKEN,
            topic0: TRANSFER_TOPIC,
            data: format!("0x{}", hex::encode(amount.to_be_bytes::<32>())),
            tx_hash: tx,
            log_index,
            topics: format!("{}{}", topic(from), topic(to)),
        });
    }

    fn delegate(&mut self, tx: B256, delegator: Address) {
        let log_index = self.logs.len() as u64;
        self.logs.push(LogRecord {
            address: GAS_TOKEN,
            topic0: DELEGATE_CHANGED_TOPIC,
            data: "0x".to_string(),
            tx_hash: tx,
            log_index,
            topics: format!("{}{}{}", topic(delegator), topic(Address::ZERO), topic(delegator)),
        });
    }

    fn replay(&self, params: ReplayParams) -> ReplayOutcome {
        ReplayDriver::new(params)
            .run(self.txs.clone(), &self.logs)
            .unwrap()
    }
}

fn topic(addr: Address) -> String {
    format!("0x000000000000000000000000{}", hex::encode(addr.as_slice()))
}

fn small_epochs() -> ReplayParams {
    ReplayParams {
        epoch_length: 10,
        reward_pool: 1_000.0,
        ..ReplayParams::default()
    }
}

fn rel_err(actual: f64, expected: f64) -> f64 {
    ((actual - expected) / expected).abs()
}

#[test]
fn sole_delegated_spender_receives_the_full_pool() {
    let mut chain = Chain::default();
    let genesis = chain.tx(A, ACTIVATION_BLOCK, 0, 0.0);
    chain.transfer(genesis, Address::ZERO, A, whole_tokens(1_000_000));
    chain.delegate(genesis, A);
    for k in 1..=5760 {
        chain.tx(A, ACTIVATION_BLOCK + k, 0, 1.0);
    }

    let outcome = chain.replay(ReplayParams::default());
    assert_eq!(outcome.distributions.len(), 1);
    assert_eq!(outcome.distributions[0].stamp.number, ACTIVATION_BLOCK + 5760);

    let table = RewardTable::from_outcome(&outcome);
    let a = table.row(&A).expect("A must be in the reward table");
    assert!(rel_err(a.reward, 500_000_000.0) < 1e-12);
    // The boundary transaction's own spend lands in the next epoch.
    assert_eq!(a.tx_count, 5760);
    assert_eq!(a.spent, 5760.0);
    assert!(table.row(&B).is_none());
    assert_eq!(table.last_updated.number, ACTIVATION_BLOCK + 5760);
}

#[test]
fn three_to_one_weighted_spend_splits_three_to_one() {
    let mut chain = Chain::default();
    let genesis = chain.tx(D, ACTIVATION_BLOCK, 0, 0.0);
    chain.transfer(genesis, Address::ZERO, A, whole_tokens(100));
    chain.transfer(genesis, Address::ZERO, C, whole_tokens(100));
    chain.delegate(genesis, A);
    chain.delegate(genesis, C);
    for k in 1..=10 {
        chain.tx(A, ACTIVATION_BLOCK + k, 0, 3.0);
        chain.tx(C, ACTIVATION_BLOCK + k, 1, 1.0);
    }

    let outcome = chain.replay(small_epochs());
    let a = outcome.state.rewards.reward_of(&A).unwrap();
    let c = outcome.state.rewards.reward_of(&C).unwrap();
    assert!(rel_err(a / c, 3.0) < 1e-6);
    assert!(rel_err(a + c, 1_000.0) < 1e-9);
}

#[test]
fn every_distribution_hands_out_exactly_the_pool() {
    let mut chain = Chain::default();
    let genesis = chain.tx(D, ACTIVATION_BLOCK, 0, 0.0);
    chain.transfer(genesis, Address::ZERO, A, whole_tokens(70));
    chain.transfer(genesis, Address::ZERO, C, whole_tokens(30));
    chain.delegate(genesis, A);
    chain.delegate(genesis, C);

    for k in 1..=45 {
        let block = ACTIVATION_BLOCK + k;
        chain.tx(A, block, 0, 0.01 * k as f64);
        if k % 3 == 0 {
            let moved = chain.tx(C, block, 1, 0.5);
            chain.transfer(moved, C, A, whole_tokens(1));
        }
    }

    let outcome = chain.replay(small_epochs());
    assert_eq!(outcome.distributions.len(), 4);
    for distribution in &outcome.distributions {
        assert!(distribution.total_weighted_spend > 0.0);
        assert!(rel_err(distribution.distributed, 1_000.0) < 1e-9);
    }
    assert!(rel_err(outcome.state.rewards.total(), 4_000.0) < 1e-9);
}

#[test]
fn epoch_without_delegated_spend_distributes_nothing() {
    let mut chain = Chain::default();
    let genesis = chain.tx(D, ACTIVATION_BLOCK, 0, 0.0);
    chain.transfer(genesis, Address::ZERO, A, whole_tokens(10));
    chain.delegate(genesis, A);
    for k in 1..=12 {
        chain.tx(B, ACTIVATION_BLOCK + k, 0, 1.0);
    }

    let outcome = chain.replay(small_epochs());
    assert_eq!(outcome.distributions.len(), 1);
    assert_eq!(outcome.distributions[0].distributed, 0.0);

    let table = RewardTable::from_outcome(&outcome);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].address, A);
    assert_eq!(table.rows[0].reward, 0.0);
    assert_eq!(table.last_updated.number, ACTIVATION_BLOCK + 10);
}

#[test]
fn replay_is_byte_identical_across_runs() {
    let mut chain = Chain::default();
    let genesis = chain.tx(D, ACTIVATION_BLOCK, 0, 0.0);
    for (i, holder) in [A, B, C].into_iter().enumerate() {
        chain.transfer(genesis, Address::ZERO, holder, whole_tokens(10 + i as u64));
        chain.delegate(genesis, holder);
    }
    for k in 1..=35 {
        for (i, holder) in [A, B, C].into_iter().enumerate() {
            chain.tx(holder, ACTIVATION_BLOCK + k, i as u64, 0.1 + 0.07 * (k + i as u64) as f64);
        }
    }

    let first = RewardTable::from_outcome(&chain.replay(small_epochs()))
        .to_csv_bytes()
        .unwrap();
    let second = RewardTable::from_outcome(&chain.replay(small_epochs()))
        .to_csv_bytes()
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn permuting_unrelated_logs_within_a_transaction_keeps_balances() {
    let build = |reversed: bool| {
        let mut chain = Chain::default();
        let seed = chain.tx(D, ACTIVATION_BLOCK, 0, 0.0);
        chain.transfer(seed, Address::ZERO, C, whole_tokens(5));
        let tx = chain.tx(D, ACTIVATION_BLOCK + 1, 0, 0.0);
        if reversed {
            chain.transfer(tx, C, D, whole_tokens(2));
            chain.transfer(tx, Address::ZERO, A, whole_tokens(9));
        } else {
            chain.transfer(tx, Address::ZERO, A, whole_tokens(9));
            chain.transfer(tx, C, D, whole_tokens(2));
        }
        chain.replay(small_epochs())
    };

    let forward = build(false);
    let reversed = build(true);
    assert_eq!(forward.state.ledger, reversed.state.ledger);
    assert_eq!(forward.state.ledger.balance_as_f64(&C), 3.0);
}

#[test]
fn moving_a_transfer_to_another_block_changes_rewards() {
    let build = |transfer_block: u64, plain_block: u64| {
        let mut chain = Chain::default();
        let genesis = chain.tx(D, ACTIVATION_BLOCK, 0, 0.0);
        chain.transfer(genesis, Address::ZERO, A, whole_tokens(100));
        chain.transfer(genesis, Address::ZERO, C, whole_tokens(100));
        chain.delegate(genesis, A);
        chain.delegate(genesis, C);

        let moved = chain.tx(D, ACTIVATION_BLOCK + transfer_block, 0, 0.0);
        chain.transfer(moved, A, D, whole_tokens(100));
        chain.tx(D, ACTIVATION_BLOCK + plain_block, 0, 0.0);

        for k in 1..=10 {
            chain.tx(A, ACTIVATION_BLOCK + k, 1, 1.0);
            chain.tx(C, ACTIVATION_BLOCK + k, 2, 1.0);
        }
        chain.replay(ReplayParams {
            alpha: 0.5,
            ..small_epochs()
        })
    };

    let early = build(2, 8);
    let late = build(8, 2);
    let a_early = early.state.rewards.reward_of(&A).unwrap();
    let a_late = late.state.rewards.reward_of(&A).unwrap();
    assert!(a_early < a_late);
}

#[test]
fn transactions_before_activation_change_nothing() {
    let mut chain = Chain::default();
    let early = chain.tx(A, ACTIVATION_BLOCK - 1, 0, 5.0);
    chain.transfer(early, Address::ZERO, A, whole_tokens(10));
    chain.delegate(early, A);
    for k in 0..=10 {
        chain.tx(A, ACTIVATION_BLOCK + k, 0, 1.0);
    }

    let outcome = chain.replay(small_epochs());
    assert!(outcome.state.ledger.is_empty());
    assert!(outcome.state.delegation.is_empty());
    assert!(outcome.state.scores.is_empty());
    assert_eq!(outcome.state.spend.lifetime_tx_count(), 0);
    assert!(outcome.state.rewards.is_empty());
    assert_eq!(outcome.stats.txs_pre_activation, 1);
}

#[test]
fn delegator_without_balance_still_gets_a_zero_score() {
    let mut chain = Chain::default();
    let genesis = chain.tx(D, ACTIVATION_BLOCK, 0, 0.0);
    chain.delegate(genesis, C);
    chain.tx(C, ACTIVATION_BLOCK + 1, 0, 1.0);

    let outcome = chain.replay(small_epochs());
    assert_eq!(outcome.state.scores.score(&C), Some(0.0));
    assert_eq!(outcome.state.spend.tx_count_of(&C), 1);
    assert_eq!(outcome.state.spend.weighted_of(&C), 0.0);
}
