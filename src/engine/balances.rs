use super::DecodeError;
use crate::domain::{units_to_f64, Address, I256, TOKEN_DECIMALS, U256};
use std::collections::BTreeMap;

/// Token balances reconstructed from Transfer events.
///
/// Debits are applied as-is, so a holder may go negative if the input data is
/// inconsistent. The zero address is the mint source and is never debited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceLedger {
    balances: BTreeMap<Address, I256>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single transfer: credit `to`, debit `from` unless it is the mint source.
    pub fn apply_transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), DecodeError> {
        let amount = I256::try_from(amount).map_err(|_| DecodeError::BalanceOverflow(to))?;

        let credited = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(DecodeError::BalanceOverflow(to))?;

        if from == Address::ZERO {
            self.balances.insert(to, credited);
            return Ok(());
        }

        // Compute both sides before writing so a failed debit leaves the ledger untouched.
        let debited = if from == to {
            credited
                .checked_sub(amount)
                .ok_or(DecodeError::BalanceOverflow(from))?
        } else {
            self.balance_of(&from)
                .checked_sub(amount)
                .ok_or(DecodeError::BalanceOverflow(from))?
        };

        self.balances.insert(to, credited);
        self.balances.insert(from, debited);
        Ok(())
    }

    /// Create a zero entry for `addr` if it has never been seen.
    pub fn ensure_entry(&mut self, addr: Address) {
        self.balances.entry(addr).or_insert(I256::ZERO);
    }

    pub fn balance_of(&self, addr: &Address) -> I256 {
        self.balances.get(addr).copied().unwrap_or(I256::ZERO)
    }

    /// Balance in whole tokens as a float (18-decimal fixed point).
    pub fn balance_as_f64(&self, addr: &Address) -> f64 {
        units_to_f64(self.balance_of(addr), TOKEN_DECIMALS)
    }

    pub fn contains(&self, addr: &Address) -> bool {
        self.balances.contains_key(addr)
    }

    /// Number of addresses with a ledger entry.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Number of addresses holding a strictly positive balance.
    pub fn positive_holders(&self) -> usize {
        self.balances.values().filter(|b| b.is_positive()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &I256)> {
        self.balances.iter()
    }
}
