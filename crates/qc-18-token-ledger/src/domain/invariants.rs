//! # Ledger Invariants
//!
//! | ID | Invariant |
//! |----|-----------|
//! | INVARIANT-1 | `balance`, `staked`, `pending_withdrawal` never negative (by type; overflow is rejected) |
//! | INVARIANT-2 | `circulating_supply == minted` |
//! | INVARIANT-3 | `minted <= total_supply` |
//! | INVARIANT-4 | Transfers conserve `balance + staked` across the two parties |
//! | INVARIANT-5 | Sum of balances, stakes and escrow never exceeds `minted + airdropped` |

use super::account_store::AccountStore;
use super::entities::{AccountState, LedgerMeta};
use super::value_objects::Amount;

/// A violated invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    CirculatingMismatch { circulating: Amount, minted: Amount },
    SupplyCapExceeded { minted: Amount, total_supply: Amount },
    HoldingsExceedIssued { held: Amount, issued: Amount },
    NotConserved { before: Amount, after: Amount },
    Overflow,
}

/// INVARIANT-4: compare combined holdings of a transfer's two parties.
#[must_use]
pub fn check_transfer_conservation(
    before: (&AccountState, &AccountState),
    after: (&AccountState, &AccountState),
) -> Option<InvariantViolation> {
    let total = |a: &AccountState, b: &AccountState| {
        a.holdings().and_then(|x| b.holdings().and_then(|y| x.checked_add(y)))
    };
    match (total(before.0, before.1), total(after.0, after.1)) {
        (Some(b), Some(a)) if a == b => None,
        (Some(before), Some(after)) => Some(InvariantViolation::NotConserved { before, after }),
        _ => Some(InvariantViolation::Overflow),
    }
}

/// Check every ledger-wide invariant. Empty result means the ledger is sound.
#[must_use]
pub fn check_all_invariants(meta: &LedgerMeta, accounts: &AccountStore) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let supply = &meta.supply;

    if supply.circulating_supply() != supply.minted() {
        violations.push(InvariantViolation::CirculatingMismatch {
            circulating: supply.circulating_supply(),
            minted: supply.minted(),
        });
    }

    if supply.minted() > supply.total_supply() {
        violations.push(InvariantViolation::SupplyCapExceeded {
            minted: supply.minted(),
            total_supply: supply.total_supply(),
        });
    }

    let held = accounts.iter().try_fold(0u128, |acc, (_, account)| {
        account
            .holdings()
            .and_then(|h| h.checked_add(account.pending_withdrawal))
            .and_then(|h| acc.checked_add(h))
    });
    let issued = supply.minted().checked_add(supply.airdropped());
    match (held, issued) {
        (Some(held), Some(issued)) if held > issued => {
            violations.push(InvariantViolation::HoldingsExceedIssued { held, issued });
        }
        (Some(_), Some(_)) => {}
        _ => violations.push(InvariantViolation::Overflow),
    }

    violations
}
