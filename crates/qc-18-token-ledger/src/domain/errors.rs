//! # Ledger Errors
//!
//! The `Display` text of the contract-facing variants is a stable reason
//! string that callers match on; do not change it.

use super::value_objects::{Address, Amount};
use std::fmt;
use thiserror::Error;

/// Privileged role required by an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Ownership-level settings (minting, blocking, price, airdrops).
    Owner,
    /// Pricing pairs, freeze state and escrow settlement.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Only the {0} can call this function.")]
    Unauthorized(Role),

    #[error("Insufficient balance")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("Account is blocked")]
    AccountBlocked(Address),

    #[error("Account is frozen")]
    AccountFrozen(Address),

    #[error("Supply cap exceeded: minted {minted} + {requested} > total supply {total_supply}")]
    SupplyCapExceeded {
        minted: Amount,
        requested: Amount,
        total_supply: Amount,
    },

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Settlement error: {0}")]
    Settlement(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    /// True for failures caused by the caller's request rather than by an
    /// outbound port.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::Storage(_) | Self::Settlement(_) | Self::Serialization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings_are_stable() {
        assert_eq!(
            LedgerError::Unauthorized(Role::Admin).to_string(),
            "Only the admin can call this function."
        );
        assert_eq!(
            LedgerError::Unauthorized(Role::Owner).to_string(),
            "Only the owner can call this function."
        );
        assert_eq!(
            LedgerError::InsufficientBalance {
                required: 10,
                available: 1
            }
            .to_string(),
            "Insufficient balance"
        );
        assert_eq!(
            LedgerError::AccountBlocked(Address::ZERO).to_string(),
            "Account is blocked"
        );
        assert_eq!(
            LedgerError::AccountFrozen(Address::ZERO).to_string(),
            "Account is frozen"
        );
    }

    #[test]
    fn test_port_failures_are_not_rejections() {
        assert!(LedgerError::ArithmeticOverflow.is_rejection());
        assert!(!LedgerError::Storage("disk".into()).is_rejection());
        assert!(!LedgerError::Settlement("down".into()).is_rejection());
    }
}
