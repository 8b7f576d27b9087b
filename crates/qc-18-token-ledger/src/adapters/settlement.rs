//! # Settlement Adapter
//!
//! In-memory settlement gateway. Stands in for whatever moves released
//! escrow out of the ledger (a payment rail, a native-coin balance).

use crate::domain::{Address, Amount};
use crate::ports::outbound::{SettlementError, SettlementGateway};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// External balances kept in memory.
#[derive(Debug, Default)]
pub struct InMemorySettlement {
    balances: RwLock<HashMap<Address, Amount>>,
    offline: AtomicBool,
}

impl InMemorySettlement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every `credit` fails with `Unavailable` while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Sum of all external balances.
    #[must_use]
    pub fn total_settled(&self) -> Amount {
        self.balances
            .read()
            .values()
            .fold(0, |acc: Amount, v| acc.saturating_add(*v))
    }
}

impl SettlementGateway for InMemorySettlement {
    fn credit(&self, account: Address, amount: Amount) -> Result<(), SettlementError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SettlementError::Unavailable);
        }
        let mut balances = self.balances.write();
        let entry = balances.entry(account).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| SettlementError::Rejected {
                account,
                reason: "external balance overflow".to_string(),
            })?;
        Ok(())
    }

    fn balance_of(&self, account: Address) -> Amount {
        self.balances.read().get(&account).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::new([0xA1; 20]);

    #[test]
    fn test_credit_accumulates() {
        let gateway = InMemorySettlement::new();
        gateway.credit(ALICE, 40).unwrap();
        gateway.credit(ALICE, 60).unwrap();

        assert_eq!(gateway.balance_of(ALICE), 100);
        assert_eq!(gateway.total_settled(), 100);
    }

    #[test]
    fn test_offline_gateway_rejects() {
        let gateway = InMemorySettlement::new();
        gateway.set_offline(true);

        assert_eq!(gateway.credit(ALICE, 1), Err(SettlementError::Unavailable));
        assert_eq!(gateway.balance_of(ALICE), 0);

        gateway.set_offline(false);
        gateway.credit(ALICE, 1).unwrap();
        assert_eq!(gateway.balance_of(ALICE), 1);
    }
}
