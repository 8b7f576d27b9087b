//! # QC-18 Token Ledger - Fungible Token Accounting Subsystem
//!
//! **Subsystem ID:** 18
//!
//! ## Purpose
//!
//! Keeps balances for a single fungible token: owner/admin access control,
//! minted and circulating supply, pricing parameters, account block and
//! freeze flags, and a two-phase stake withdrawal whose escrow is released
//! to an external settlement gateway by the admin.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Amounts never negative | `u128` + checked arithmetic throughout `domain/` |
//! | INVARIANT-2 | `circulating_supply == minted` | `domain/supply.rs` - `SupplyLedger::circulating_supply()` |
//! | INVARIANT-3 | `minted <= total_supply` | `domain/supply.rs` - `SupplyLedger::mint()` |
//! | INVARIANT-4 | Transfers conserve `balance + staked` | `domain/transfer.rs` - `apply_transfer()` |
//! | INVARIANT-5 | Held value never exceeds issued value | `domain/invariants.rs` - `check_all_invariants()` |
//!
//! ## Authorization
//!
//! | Operation | Role |
//! |-----------|------|
//! | `mint`, `airdrop`, `block_account`, `unblock_account`, `change_price` | owner |
//! | `transfer_ownership`, `set_admin` | owner |
//! | `set_prices`, `freeze_account`, `withdraw_pending_withdrawals` | admin |
//! | `transfer`, `stake`, `withdraw` | any account, acting on itself |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `KeyValueStore` | Write-through persistence of ledger and account state |
//! | `SettlementGateway` | Receives released withdrawal escrow |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_18_token_ledger::prelude::*;
//!
//! let config = LedgerConfig::load("ledger.toml")?;
//! init_logging(&config.logging)?;
//!
//! let ledger = LedgerService::new(
//!     config.to_params()?,
//!     InMemoryKVStore::new(),
//!     InMemorySettlement::new(),
//! )?;
//!
//! ledger.transfer(owner, alice, parse_units("100", 18)?)?;
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod service;
pub mod storage;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        AccountState, LedgerMeta, LedgerParams, StakePhase, SupplyStats, TokenMetadata,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        format_units, parse_units, tokens, Address, Amount, DEFAULT_DECIMALS,
    };

    // Errors
    pub use crate::domain::errors::{LedgerError, Role};

    // Invariants
    pub use crate::domain::invariants::{check_all_invariants, InvariantViolation};

    // Ports
    pub use crate::ports::inbound::TokenLedgerApi;
    pub use crate::ports::outbound::{
        BatchOperation, KVStoreError, KeyValueStore, SettlementError, SettlementGateway,
    };

    // Adapters
    pub use crate::adapters::{InMemoryKVStore, InMemorySettlement};

    // Configuration & logging
    pub use crate::config::{ConfigError, LedgerConfig, LoggingConfig, TokenConfig};
    pub use crate::logging::{init_logging, LoggingError};

    // Service
    pub use crate::service::{LedgerService, ServiceStats};

    #[cfg(any(test, feature = "test-utils"))]
    pub use crate::service::create_test_service;
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 18;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Token Ledger";

// =============================================================================
// TESTS
// =============================================================================
