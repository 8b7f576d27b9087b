//! # Transfer Rules
//!
//! Pure balance-movement logic. Functions here operate on staged copies of
//! account state; they either return the updated pair or an error, and never
//! partially modify their inputs on failure.
//!
//! ## Stake Coupling
//!
//! A transfer does not only move `amount` of balance. The sender's entire
//! stake is reassigned to the receiver as part of the same operation, which
//! leaves the sender with `staked == 0`. Pending withdrawals stay with the
//! sender.

use super::entities::AccountState;
use super::errors::LedgerError;
use super::value_objects::{Address, Amount};

/// Result of an applied transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferOutcome {
    pub sender: AccountState,
    pub receiver: AccountState,
    /// Stake reassigned from sender to receiver.
    pub stake_moved: Amount,
}

fn ensure_not_blocked(address: Address, account: &AccountState) -> Result<(), LedgerError> {
    if account.blocked {
        return Err(LedgerError::AccountBlocked(address));
    }
    Ok(())
}

fn ensure_not_frozen(address: Address, account: &AccountState) -> Result<(), LedgerError> {
    if account.frozen {
        return Err(LedgerError::AccountFrozen(address));
    }
    Ok(())
}

/// Fail if `account` may not take part in a transfer. Blocked wins over frozen.
pub fn ensure_transferable(address: Address, account: &AccountState) -> Result<(), LedgerError> {
    ensure_not_blocked(address, account)?;
    ensure_not_frozen(address, account)
}

/// Move `amount` of balance and the whole stake from `sender` to `receiver`.
///
/// Checks run in a fixed order: blocked (sender, then receiver), frozen,
/// then balance. The caller handles `from == to` before reaching here.
pub fn apply_transfer(
    from: Address,
    sender: AccountState,
    to: Address,
    receiver: AccountState,
    amount: Amount,
) -> Result<TransferOutcome, LedgerError> {
    ensure_not_blocked(from, &sender)?;
    ensure_not_blocked(to, &receiver)?;
    ensure_not_frozen(from, &sender)?;
    ensure_not_frozen(to, &receiver)?;

    if sender.balance < amount {
        return Err(LedgerError::InsufficientBalance {
            required: amount,
            available: sender.balance,
        });
    }

    let mut sender = sender;
    let mut receiver = receiver;

    receiver.balance = receiver
        .balance
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    receiver.staked = receiver
        .staked
        .checked_add(sender.staked)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    sender.balance -= amount;
    let stake_moved = sender.staked;
    sender.staked = 0;

    Ok(TransferOutcome {
        sender,
        receiver,
        stake_moved,
    })
}

/// Credit `amount` without a matching debit.
pub fn credit(account: &mut AccountState, amount: Amount) -> Result<(), LedgerError> {
    account.balance = account
        .balance
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    Ok(())
}
