//! # Account Store
//!
//! Mapping of address to `AccountState` with a zero-valued default. Reads
//! never fail. Writes are staged on copies by the caller and committed with
//! `apply`, so a failed operation never leaves a half-updated account behind.
//!
//! The store itself is not synchronized; `LedgerService` owns it behind its
//! single lock.

use std::collections::HashMap;

use super::entities::AccountState;
use super::value_objects::Address;

#[derive(Clone, Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<Address, AccountState>,
}

impl AccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `address`, zero-valued if never written.
    #[must_use]
    pub fn get(&self, address: Address) -> AccountState {
        self.accounts.get(&address).copied().unwrap_or_default()
    }

    /// Commit already-validated account states.
    pub fn apply<I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = (Address, AccountState)>,
    {
        for (address, state) in changes {
            self.accounts.insert(address, state);
        }
    }

    /// Number of accounts that have ever been written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &AccountState)> {
        self.accounts.iter()
    }
}

impl FromIterator<(Address, AccountState)> for AccountStore {
    fn from_iter<I: IntoIterator<Item = (Address, AccountState)>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().collect(),
        }
    }
}
