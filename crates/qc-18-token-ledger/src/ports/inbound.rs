//! # Inbound Port
//!
//! The operations the ledger exposes to its callers. Caller identity is
//! always an explicit argument; the ledger has no notion of a session.
//!
//! Reads are infallible: unknown accounts read as zero-valued.

use crate::domain::{AccountState, Address, Amount, LedgerError, StakePhase, SupplyStats};

/// Primary API for the token ledger.
pub trait TokenLedgerApi: Send + Sync {
    // === Metadata ===

    fn name(&self) -> String;

    fn symbol(&self) -> String;

    fn decimals(&self) -> u8;

    fn total_supply(&self) -> Amount;

    // === Supply ===

    /// Cumulative minted amount, initial allocation included.
    fn circulating_supply(&self) -> Amount;

    fn supply_stats(&self) -> SupplyStats;

    /// Owner-only. Credits `payment * mint_rate` to the caller and returns
    /// the credited amount.
    fn mint(&self, caller: Address, payment: Amount) -> Result<Amount, LedgerError>;

    /// Owner-only. Credits `to` without debiting anyone.
    fn airdrop(&self, caller: Address, amount: Amount, to: Address) -> Result<(), LedgerError>;

    // === Balances & transfers ===

    fn balance_of(&self, account: Address) -> Amount;

    /// Full state of `account`.
    fn account(&self, account: Address) -> AccountState;

    /// Move `amount` from the caller to `to`, together with the caller's
    /// entire stake.
    fn transfer(&self, caller: Address, to: Address, amount: Amount) -> Result<(), LedgerError>;

    // === Account flags ===

    fn block_account(&self, caller: Address, account: Address) -> Result<(), LedgerError>;

    fn unblock_account(&self, caller: Address, account: Address) -> Result<(), LedgerError>;

    fn is_blocked(&self, account: Address) -> bool;

    /// Admin-only.
    fn freeze_account(
        &self,
        caller: Address,
        account: Address,
        frozen: bool,
    ) -> Result<(), LedgerError>;

    fn frozen_accounts(&self, account: Address) -> bool;

    // === Pricing ===

    fn price(&self) -> Amount;

    fn sell_price(&self) -> Amount;

    fn buy_price(&self) -> Amount;

    /// Owner-only.
    fn change_price(&self, caller: Address, new_price: Amount) -> Result<(), LedgerError>;

    /// Admin-only. Sets both prices or neither.
    fn set_prices(
        &self,
        caller: Address,
        sell_price: Amount,
        buy_price: Amount,
    ) -> Result<(), LedgerError>;

    // === Staking ===

    fn stake(&self, caller: Address, amount: Amount) -> Result<(), LedgerError>;

    fn staked(&self, account: Address) -> Amount;

    /// Move stake into escrow. Nothing returns to the spendable balance.
    fn withdraw(&self, caller: Address, amount: Amount) -> Result<(), LedgerError>;

    fn pending_withdrawals(&self, account: Address) -> Amount;

    /// Admin-only. Releases the account's escrow to the settlement gateway
    /// and returns the released amount (zero is a no-op).
    fn withdraw_pending_withdrawals(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<Amount, LedgerError>;

    fn stake_phase(&self, account: Address) -> StakePhase;

    // === Roles ===

    fn owner(&self) -> Address;

    fn admin(&self) -> Address;

    /// Owner-only.
    fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), LedgerError>;

    /// Owner-only.
    fn set_admin(&self, caller: Address, new_admin: Address) -> Result<(), LedgerError>;
}
