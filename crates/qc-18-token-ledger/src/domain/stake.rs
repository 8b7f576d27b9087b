//! # Stake Engine Rules
//!
//! Two-phase withdrawal: `withdraw` only moves stake into escrow
//! (`pending_withdrawal`). Value leaves the ledger in a separate,
//! admin-triggered settlement, which zeroes the escrow before the external
//! credit happens.
//!
//! ```text
//! Unstaked --stake--> Staked --withdraw--> WithdrawRequested --settle--> Settled
//!                       ^  |                                               |
//!                       |  +--stake (accumulates)                          |
//!                       +------------------------stake---------------------+
//! ```
//!
//! Zero amounts are accepted and change nothing.

use super::entities::AccountState;
use super::errors::LedgerError;
use super::value_objects::Amount;

/// Lock `amount` of balance into stake.
pub fn stake(account: &mut AccountState, amount: Amount) -> Result<(), LedgerError> {
    if amount == 0 {
        return Ok(());
    }
    if account.balance < amount {
        return Err(LedgerError::InsufficientBalance {
            required: amount,
            available: account.balance,
        });
    }
    let staked = account
        .staked
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    let before = account.stake_phase();
    account.balance -= amount;
    account.staked = staked;
    debug_assert!(before.can_transition_to(account.stake_phase()));
    Ok(())
}

/// Move `amount` of stake into escrow.
pub fn request_withdrawal(account: &mut AccountState, amount: Amount) -> Result<(), LedgerError> {
    if amount == 0 {
        return Ok(());
    }
    if account.staked < amount {
        return Err(LedgerError::InsufficientBalance {
            required: amount,
            available: account.staked,
        });
    }
    let pending = account
        .pending_withdrawal
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    let before = account.stake_phase();
    account.staked -= amount;
    account.pending_withdrawal = pending;
    debug_assert!(before.can_transition_to(account.stake_phase()));
    Ok(())
}

/// Take the whole escrow out of the account and return it.
///
/// The caller is responsible for delivering the returned amount to the
/// settlement gateway, and for restoring the previous state if delivery
/// fails.
pub fn release_pending(account: &mut AccountState) -> Result<Amount, LedgerError> {
    let amount = account.pending_withdrawal;
    if amount == 0 {
        return Ok(0);
    }
    let settled = account
        .settled
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    account.pending_withdrawal = 0;
    account.settled = settled;
    Ok(amount)
}

/// Put `amount` released by `release_pending` back into escrow.
pub fn revert_release(account: &mut AccountState, amount: Amount) -> Result<(), LedgerError> {
    if account.settled < amount {
        return Err(LedgerError::InsufficientBalance {
            required: amount,
            available: account.settled,
        });
    }
    let pending = account
        .pending_withdrawal
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow)?;

    account.settled -= amount;
    account.pending_withdrawal = pending;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::StakePhase;

    #[test]
    fn test_stake_accumulates() {
        let mut account = AccountState::with_balance(300);
        stake(&mut account, 100).unwrap();
        stake(&mut account, 100).unwrap();

        assert_eq!(account.staked, 200);
        assert_eq!(account.balance, 100);
        assert_eq!(account.stake_phase(), StakePhase::Staked);
    }

    #[test]
    fn test_stake_more_than_balance_fails_unchanged() {
        let mut account = AccountState::with_balance(11);
        let err = stake(&mut account, 1000).unwrap_err();

        assert_eq!(err.to_string(), "Insufficient balance");
        assert_eq!(account, AccountState::with_balance(11));
    }

    #[test]
    fn test_withdraw_moves_stake_to_escrow() {
        let mut account = AccountState::with_balance(100);
        stake(&mut account, 100).unwrap();
        request_withdrawal(&mut account, 100).unwrap();

        assert_eq!(account.staked, 0);
        assert_eq!(account.pending_withdrawal, 100);
        // Not released to the spendable balance.
        assert_eq!(account.balance, 0);
        assert_eq!(account.stake_phase(), StakePhase::WithdrawRequested);
    }

    #[test]
    fn test_withdraw_more_than_staked_fails() {
        let mut account = AccountState::with_balance(100);
        stake(&mut account, 10).unwrap();

        let err = request_withdrawal(&mut account, 11).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                required: 11,
                available: 10
            }
        );
        assert_eq!(account.staked, 10);
        assert_eq!(account.pending_withdrawal, 0);
    }

    #[test]
    fn test_zero_amounts_are_noops() {
        let mut account = AccountState::default();
        stake(&mut account, 0).unwrap();
        request_withdrawal(&mut account, 0).unwrap();
        assert_eq!(release_pending(&mut account).unwrap(), 0);
        assert_eq!(account, AccountState::default());
    }

    #[test]
    fn test_release_pending_zeroes_escrow() {
        let mut account = AccountState::with_balance(50);
        stake(&mut account, 50).unwrap();
        request_withdrawal(&mut account, 30).unwrap();

        let released = release_pending(&mut account).unwrap();
        assert_eq!(released, 30);
        assert_eq!(account.pending_withdrawal, 0);
        assert_eq!(account.settled, 30);
        // Remaining stake keeps the account in the Staked phase.
        assert_eq!(account.stake_phase(), StakePhase::Staked);
    }

    #[test]
    fn test_revert_release_restores_escrow() {
        let mut account = AccountState::with_balance(50);
        stake(&mut account, 50).unwrap();
        request_withdrawal(&mut account, 50).unwrap();
        let before = account;

        let released = release_pending(&mut account).unwrap();
        assert_eq!(account.stake_phase(), StakePhase::Settled);

        revert_release(&mut account, released).unwrap();
        assert_eq!(account, before);
        assert_eq!(account.stake_phase(), StakePhase::WithdrawRequested);
    }

    #[test]
    fn test_revert_more_than_settled_fails() {
        let mut account = AccountState {
            settled: 10,
            ..Default::default()
        };
        assert_eq!(
            revert_release(&mut account, 11),
            Err(LedgerError::InsufficientBalance {
                required: 11,
                available: 10
            })
        );
        assert_eq!(account.settled, 10);
    }
}
