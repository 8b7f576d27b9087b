//! # Access Control
//!
//! Owner and admin are two independent identifiers, not a hierarchy. The
//! owner does not implicitly hold admin rights; when both roles should belong
//! to one account, both fields hold that address.

use serde::{Deserialize, Serialize};

use super::errors::{LedgerError, Role};
use super::value_objects::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    admin: Address,
}

impl AccessControl {
    /// Create with explicit owner and admin.
    pub fn new(owner: Address, admin: Address) -> Result<Self, LedgerError> {
        reject_zero(owner)?;
        reject_zero(admin)?;
        Ok(Self { owner, admin })
    }

    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    #[must_use]
    pub fn admin(&self) -> Address {
        self.admin
    }

    #[must_use]
    pub fn is_owner(&self, caller: Address) -> bool {
        self.owner == caller
    }

    #[must_use]
    pub fn is_admin(&self, caller: Address) -> bool {
        self.admin == caller
    }

    pub fn ensure_owner(&self, caller: Address) -> Result<(), LedgerError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(Role::Owner))
        }
    }

    pub fn ensure_admin(&self, caller: Address) -> Result<(), LedgerError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized(Role::Admin))
        }
    }

    /// Hand ownership to `new_owner`. Owner-only.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        reject_zero(new_owner)?;
        self.owner = new_owner;
        Ok(())
    }

    /// Replace the admin. Owner-only.
    pub fn set_admin(&mut self, caller: Address, new_admin: Address) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        reject_zero(new_admin)?;
        self.admin = new_admin;
        Ok(())
    }
}

fn reject_zero(address: Address) -> Result<(), LedgerError> {
    if address.is_zero() {
        Err(LedgerError::InvalidAddress(format!("{address:?}")))
    } else {
        Ok(())
    }
}
