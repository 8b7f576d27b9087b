//! # Domain Entities for the Token Ledger
//!
//! ## Type Decisions
//!
//! - Amounts are `u128` base units. Balances can never be negative because the
//!   type cannot represent it; every subtraction goes through checked
//!   arithmetic and fails instead of wrapping.
//! - Accounts are never allocated explicitly. An address that has never been
//!   written reads as `AccountState::default()`.

use serde::{Deserialize, Serialize};

use super::access::AccessControl;
use super::pricing::PricingPolicy;
use super::supply::SupplyLedger;
use super::value_objects::{Address, Amount, DEFAULT_DECIMALS};

/// Per-account ledger state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Spendable balance.
    pub balance: Amount,
    /// Amount locked by staking.
    pub staked: Amount,
    /// Amount withdrawn from stake and held in escrow until admin settlement.
    pub pending_withdrawal: Amount,
    /// Cumulative amount released to the settlement gateway.
    pub settled: Amount,
    /// Blocked accounts can neither send nor receive transfers.
    pub blocked: bool,
    /// Administrative freeze, independent of `blocked`.
    pub frozen: bool,
}

impl AccountState {
    /// Create an account holding `balance`.
    #[must_use]
    pub fn with_balance(balance: Amount) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// Balance plus stake: the value the holder controls inside the ledger.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn holdings(&self) -> Option<Amount> {
        self.balance.checked_add(self.staked)
    }

    /// Where this account sits in the staking lifecycle.
    ///
    /// Outstanding escrow takes precedence over an active stake, so an
    /// account that staked twice and withdrew once reports
    /// `WithdrawRequested` until the admin settles it.
    #[must_use]
    pub fn stake_phase(&self) -> StakePhase {
        if self.pending_withdrawal > 0 {
            StakePhase::WithdrawRequested
        } else if self.staked > 0 {
            StakePhase::Staked
        } else if self.settled > 0 {
            StakePhase::Settled
        } else {
            StakePhase::Unstaked
        }
    }
}

/// Staking lifecycle of a single account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakePhase {
    /// Nothing staked, nothing in escrow, nothing ever settled.
    #[default]
    Unstaked,
    /// Tokens locked in stake.
    Staked,
    /// Stake withdrawn into escrow, waiting for admin settlement.
    WithdrawRequested,
    /// Escrow released; nothing staked or pending.
    Settled,
}

impl StakePhase {
    /// Check if a transition is one the stake engine can perform.
    #[must_use]
    pub fn can_transition_to(&self, next: StakePhase) -> bool {
        match (self, next) {
            (Self::Unstaked | Self::Settled, Self::Staked) => true,
            (Self::Staked, Self::Staked | Self::WithdrawRequested) => true,
            // Stake moved away by a transfer.
            (Self::Staked, Self::Unstaked | Self::Settled) => true,
            (Self::WithdrawRequested, Self::WithdrawRequested | Self::Staked) => true,
            (Self::WithdrawRequested, Self::Settled) => true,
            _ => false,
        }
    }
}

/// Static token metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "MyToken".to_string(),
            symbol: "MTK".to_string(),
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// Everything about the ledger that is not per-account.
///
/// Persisted as a single record so that a mint (which touches supply and an
/// account) or an ownership change writes one consistent value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMeta {
    pub metadata: TokenMetadata,
    pub access: AccessControl,
    pub supply: SupplyLedger,
    pub pricing: PricingPolicy,
}

/// Parameters for creating a ledger.
///
/// All amounts are already in base units; `LedgerConfig::to_params` handles
/// the conversion from whole tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerParams {
    pub owner: Address,
    /// Defaults to `owner` when not set.
    pub admin: Option<Address>,
    pub metadata: TokenMetadata,
    pub total_supply: Amount,
    /// Credited to the owner at creation and counted as minted.
    pub initial_allocation: Amount,
    pub price: Amount,
    /// Base units of token credited per base unit of mint payment.
    pub mint_rate: Amount,
}

/// Supply figures reported by `supply_stats()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStats {
    pub total_supply: Amount,
    pub minted: Amount,
    pub airdropped: Amount,
    pub circulating_supply: Amount,
}
