use super::BalanceLedger;
use crate::domain::Address;
use std::collections::BTreeMap;

/// Addresses that have opted into delegation.
///
/// A DelegateChanged event only ever sets the flag; nothing clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelegationSet {
    delegated: BTreeMap<Address, bool>,
}

impl DelegationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `delegator` as delegating and make sure it has a ledger entry.
    pub fn apply_delegate_changed(&mut self, delegator: Address, ledger: &mut BalanceLedger) {
        self.delegated.insert(delegator, true);
        ledger.ensure_entry(delegator);
    }

    pub fn is_delegating(&self, addr: &Address) -> bool {
        self.delegated.get(addr).copied().unwrap_or(false)
    }

    /// Every address ever seen, with its current flag, in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, bool)> {
        self.delegated.iter().map(|(addr, flag)| (addr, *flag))
    }

    pub fn len(&self) -> usize {
        self.delegated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{I256, U256};
    use alloy_primitives::address;

    const A: Address = address!("1111111111111111111111111111111111111111");

    #[test]
    fn delegation_zero_initializes_balance() {
        let mut ledger = BalanceLedger::new();
        let mut set = DelegationSet::new();

        set.apply_delegate_changed(A, &mut ledger);
        assert!(set.is_delegating(&A));
        assert!(ledger.contains(&A));
        assert_eq!(ledger.balance_of(&A), I256::ZERO);
    }

    #[test]
    fn delegation_is_idempotent_and_keeps_balance() {
        let mut ledger = BalanceLedger::new();
        ledger.apply_transfer(Address::ZERO, A, U256::from(9u64)).unwrap();
        let mut set = DelegationSet::new();

        set.apply_delegate_changed(A, &mut ledger);
        let snapshot = (set.clone(), ledger.clone());
        set.apply_delegate_changed(A, &mut ledger);

        assert_eq!((set, ledger), snapshot);
    }

    #[test]
    fn unseen_address_is_not_delegating() {
        let set = DelegationSet::new();
        assert!(!set.is_delegating(&A));
        assert!(set.is_empty());
    }
}
