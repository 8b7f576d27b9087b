//! # Token Ledger Service
//!
//! Implements `TokenLedgerApi` on top of the domain rules.
//!
//! ## Write Path
//!
//! Every mutation holds the write lock for its whole run:
//!
//! 1. Authorize the caller
//! 2. Stage the changes on copies of the affected state
//! 3. Persist the staged state as one atomic batch
//! 4. Commit the staged state in memory
//!
//! A failure at any step returns before the commit, so a rejected call has
//! no effect in memory or in the store.
//!
//! ## Settlement
//!
//! Releasing escrow spans the store and the settlement gateway, which share
//! no transaction. The zeroed escrow is written in the same batch as a
//! `settlement:<address>` record of the released amount. Once the gateway
//! answers, the record is deleted (credit accepted) or rolled back together
//! with the escrow (credit refused). A repair write the store refuses is kept
//! and prepended to the next batch. `restore` rolls every record it finds
//! back into escrow.

use parking_lot::RwLock;
use tracing::{debug, error, info, instrument, warn};

#[cfg(any(test, feature = "test-utils"))]
use crate::adapters::{InMemoryKVStore, InMemorySettlement};
use crate::domain::stake;
use crate::domain::transfer::{self, apply_transfer, ensure_transferable};
use crate::domain::{
    check_all_invariants, check_transfer_conservation, AccessControl, AccountState,
    AccountStore, Address, Amount, InvariantViolation, LedgerError, LedgerMeta, LedgerParams,
    PricingPolicy, StakePhase, SupplyLedger, SupplyStats,
};
use crate::ports::inbound::TokenLedgerApi;
use crate::ports::outbound::{BatchOperation, KeyValueStore, SettlementGateway};
use crate::storage::{self, ACCOUNT_PREFIX, META_KEY, SETTLEMENT_PREFIX};

/// Service statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Mutations that committed.
    pub operations_applied: u64,
    /// Mutations refused by a ledger rule (authorization, balance, flags).
    pub operations_rejected: u64,
    /// Mutations that failed in an outbound port.
    pub operations_failed: u64,
    /// Non-zero escrow releases delivered to the settlement gateway.
    pub settlements: u64,
    /// Base units delivered to the settlement gateway.
    pub total_settled: Amount,
}

struct LedgerInner<S> {
    meta: LedgerMeta,
    accounts: AccountStore,
    store: S,
    /// Repair operations the store refused, replayed ahead of the next batch.
    deferred: Vec<BatchOperation>,
}

impl<S: KeyValueStore> LedgerInner<S> {
    fn new(meta: LedgerMeta, accounts: AccountStore, store: S) -> Self {
        Self {
            meta,
            accounts,
            store,
            deferred: Vec::new(),
        }
    }

    fn write(&mut self, batch: Vec<BatchOperation>) -> Result<(), LedgerError> {
        let mut operations = self.deferred.clone();
        operations.extend(batch);
        self.store.atomic_batch_write(operations)?;
        if !self.deferred.is_empty() {
            info!(operations = self.deferred.len(), "Deferred repair writes flushed");
            self.deferred.clear();
        }
        Ok(())
    }

    /// Write `batch` now, or keep it for the next write the store accepts.
    fn repair(&mut self, batch: Vec<BatchOperation>) {
        if let Err(e) = self.write(batch.clone()) {
            error!(error = %e, operations = batch.len(), "Repair write failed, deferring");
            self.deferred.extend(batch);
        }
    }

    fn persist(
        &mut self,
        meta: Option<&LedgerMeta>,
        accounts: &[(Address, AccountState)],
    ) -> Result<(), LedgerError> {
        self.write(storage::write_batch(meta, accounts)?)
    }

    fn commit(
        &mut self,
        meta: Option<LedgerMeta>,
        accounts: Vec<(Address, AccountState)>,
    ) -> Result<(), LedgerError> {
        self.persist(meta.as_ref(), &accounts)?;
        if let Some(meta) = meta {
            self.meta = meta;
        }
        self.accounts.apply(accounts);
        Ok(())
    }

    fn require_owner(&self, caller: Address, operation: &'static str) -> Result<(), LedgerError> {
        self.meta.access.ensure_owner(caller).inspect_err(|_| {
            warn!(%caller, operation, "Rejected: caller is not the owner");
        })
    }

    fn require_admin(&self, caller: Address, operation: &'static str) -> Result<(), LedgerError> {
        self.meta.access.ensure_admin(caller).inspect_err(|_| {
            warn!(%caller, operation, "Rejected: caller is not the admin");
        })
    }
}

/// The token ledger.
///
/// Generic over the persistence backend and the settlement gateway.
pub struct LedgerService<S: KeyValueStore, G: SettlementGateway> {
    inner: RwLock<LedgerInner<S>>,
    settlement: G,
    stats: RwLock<ServiceStats>,
}

impl<S: KeyValueStore, G: SettlementGateway> LedgerService<S, G> {
    /// Create a ledger and write its initial state to `store`.
    ///
    /// The initial allocation is credited to the owner and counted as minted.
    /// Fails if `store` already holds a ledger; use [`Self::restore`] for that.
    pub fn new(params: LedgerParams, store: S, settlement: G) -> Result<Self, LedgerError> {
        if store.get(META_KEY)?.is_some() {
            return Err(LedgerError::Storage("store already initialized".to_string()));
        }

        let admin = params.admin.unwrap_or(params.owner);
        let access = AccessControl::new(params.owner, admin)?;

        let mut supply = SupplyLedger::new(params.total_supply);
        supply.mint(params.initial_allocation)?;

        let meta = LedgerMeta {
            metadata: params.metadata,
            access,
            supply,
            pricing: PricingPolicy::new(params.price, params.mint_rate),
        };

        let mut inner = LedgerInner::new(meta.clone(), AccountStore::new(), store);
        let mut allocation = Vec::new();
        if params.initial_allocation > 0 {
            allocation.push((
                params.owner,
                AccountState::with_balance(params.initial_allocation),
            ));
        }
        inner.commit(Some(meta), allocation)?;

        info!(
            symbol = %inner.meta.metadata.symbol,
            owner = %params.owner,
            admin = %admin,
            total_supply = params.total_supply,
            initial_allocation = params.initial_allocation,
            "Token ledger created"
        );

        Ok(Self::from_inner(inner, settlement))
    }

    /// Rebuild a ledger from a store previously written by `new`.
    ///
    /// Settlements still on record were never confirmed; their amounts go
    /// back into escrow and the records are removed.
    pub fn restore(mut store: S, settlement: G) -> Result<Self, LedgerError> {
        let meta_bytes = store
            .get(META_KEY)?
            .ok_or_else(|| LedgerError::Storage("ledger metadata not found".to_string()))?;
        let meta = storage::decode_meta(&meta_bytes)?;

        let mut accounts = store
            .prefix_scan(ACCOUNT_PREFIX)?
            .into_iter()
            .map(|(key, value)| -> Result<_, LedgerError> {
                Ok((
                    storage::parse_account_key(&key)?,
                    storage::decode_account(&value)?,
                ))
            })
            .collect::<Result<AccountStore, LedgerError>>()?;

        let outstanding = store.prefix_scan(SETTLEMENT_PREFIX)?;
        if !outstanding.is_empty() {
            let mut batch = Vec::with_capacity(outstanding.len() * 2);
            for (key, value) in outstanding {
                let address = storage::parse_settlement_key(&key)?;
                let amount = storage::decode_amount(&value)?;
                let mut state = accounts.get(address);
                stake::revert_release(&mut state, amount).map_err(|e| {
                    LedgerError::Storage(format!("settlement record for {address}: {e}"))
                })?;
                warn!(account = %address, amount, "Unconfirmed settlement returned to escrow");
                accounts.apply([(address, state)]);
                batch.extend(storage::settlement_rollback_batch(address, &state)?);
            }
            store.atomic_batch_write(batch)?;
        }

        info!(
            symbol = %meta.metadata.symbol,
            accounts = accounts.len(),
            minted = meta.supply.minted(),
            "Token ledger restored"
        );

        Ok(Self::from_inner(
            LedgerInner::new(meta, accounts, store),
            settlement,
        ))
    }

    fn from_inner(inner: LedgerInner<S>, settlement: G) -> Self {
        Self {
            inner: RwLock::new(inner),
            settlement,
            stats: RwLock::new(ServiceStats::default()),
        }
    }

    /// Get current service statistics.
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    pub fn settlement(&self) -> &G {
        &self.settlement
    }

    /// Consume the service and hand back its store.
    ///
    /// Deferred repair writes are dropped; `restore` recovers from the
    /// settlement records they would have cleared.
    pub fn into_store(self) -> S {
        self.inner.into_inner().store
    }

    /// Check ledger-wide invariants against the current state.
    pub fn verify_invariants(&self) -> Vec<InvariantViolation> {
        let inner = self.inner.read();
        check_all_invariants(&inner.meta, &inner.accounts)
    }

    /// Run `operation` under the write lock and count the outcome.
    fn mutate<T, F>(&self, operation: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerInner<S>) -> Result<T, LedgerError>,
    {
        let result = {
            let mut inner = self.inner.write();
            operation(&mut inner)
        };

        let mut stats = self.stats.write();
        match &result {
            Ok(_) => stats.operations_applied += 1,
            Err(e) if e.is_rejection() => stats.operations_rejected += 1,
            Err(e) => {
                stats.operations_failed += 1;
                error!(error = %e, "Ledger operation failed");
            }
        }
        result
    }

    fn read<T>(&self, f: impl FnOnce(&LedgerInner<S>) -> T) -> T {
        f(&self.inner.read())
    }

    fn set_blocked(
        &self,
        caller: Address,
        account: Address,
        blocked: bool,
    ) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            inner.require_owner(
                caller,
                if blocked {
                    "block_account"
                } else {
                    "unblock_account"
                },
            )?;
            let mut state = inner.accounts.get(account);
            state.blocked = blocked;
            inner.commit(None, vec![(account, state)])?;
            info!(%account, blocked, "Account block flag updated");
            Ok(())
        })
    }
}

/// Create a service backed by in-memory adapters.
///
/// Owner and admin are both `owner`; the token uses the default parameters.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_service(owner: Address) -> LedgerService<InMemoryKVStore, InMemorySettlement> {
    use crate::domain::{tokens, TokenMetadata};

    let params = LedgerParams {
        owner,
        admin: None,
        metadata: TokenMetadata::default(),
        total_supply: tokens(1_000_000),
        initial_allocation: tokens(110_000),
        price: tokens(1) / 100,
        mint_rate: 1000,
    };
    match LedgerService::new(params, InMemoryKVStore::new(), InMemorySettlement::new()) {
        Ok(service) => service,
        Err(e) => panic!("test service parameters are valid: {e}"),
    }
}

// =============================================================================
// TokenLedgerApi Implementation
// =============================================================================

impl<S: KeyValueStore, G: SettlementGateway> TokenLedgerApi for LedgerService<S, G> {
    fn name(&self) -> String {
        self.read(|inner| inner.meta.metadata.name.clone())
    }

    fn symbol(&self) -> String {
        self.read(|inner| inner.meta.metadata.symbol.clone())
    }

    fn decimals(&self) -> u8 {
        self.read(|inner| inner.meta.metadata.decimals)
    }

    fn total_supply(&self) -> Amount {
        self.read(|inner| inner.meta.supply.total_supply())
    }

    fn circulating_supply(&self) -> Amount {
        self.read(|inner| inner.meta.supply.circulating_supply())
    }

    fn supply_stats(&self) -> SupplyStats {
        self.read(|inner| inner.meta.supply.stats())
    }

    #[instrument(skip(self))]
    fn mint(&self, caller: Address, payment: Amount) -> Result<Amount, LedgerError> {
        self.mutate(|inner| {
            inner.require_owner(caller, "mint")?;

            let amount = inner.meta.pricing.tokens_for_payment(payment)?;
            let mut meta = inner.meta.clone();
            meta.supply.mint(amount)?;

            let mut owner = inner.accounts.get(caller);
            transfer::credit(&mut owner, amount)?;

            let minted = meta.supply.minted();
            inner.commit(Some(meta), vec![(caller, owner)])?;
            info!(payment, amount, minted, "Tokens minted");
            Ok(amount)
        })
    }

    #[instrument(skip(self))]
    fn airdrop(&self, caller: Address, amount: Amount, to: Address) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            inner.require_owner(caller, "airdrop")?;

            let mut meta = inner.meta.clone();
            meta.supply.record_airdrop(amount)?;

            let mut receiver = inner.accounts.get(to);
            transfer::credit(&mut receiver, amount)?;

            inner.commit(Some(meta), vec![(to, receiver)])?;
            info!(amount, "Airdrop credited");
            Ok(())
        })
    }

    fn balance_of(&self, account: Address) -> Amount {
        self.read(|inner| inner.accounts.get(account).balance)
    }

    fn account(&self, account: Address) -> AccountState {
        self.read(|inner| inner.accounts.get(account))
    }

    #[instrument(skip(self))]
    fn transfer(&self, caller: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            let sender = inner.accounts.get(caller);

            if caller == to {
                ensure_transferable(caller, &sender)?;
                if sender.balance < amount {
                    return Err(LedgerError::InsufficientBalance {
                        required: amount,
                        available: sender.balance,
                    });
                }
                debug!(amount, "Self-transfer accepted without changes");
                return Ok(());
            }

            let receiver = inner.accounts.get(to);
            let outcome = apply_transfer(caller, sender, to, receiver, amount)?;
            debug_assert!(check_transfer_conservation(
                (&sender, &receiver),
                (&outcome.sender, &outcome.receiver)
            )
            .is_none());
            inner.commit(
                None,
                vec![(caller, outcome.sender), (to, outcome.receiver)],
            )?;
            debug!(amount, stake_moved = outcome.stake_moved, "Transfer applied");
            Ok(())
        })
    }

    #[instrument(skip(self))]
    fn block_account(&self, caller: Address, account: Address) -> Result<(), LedgerError> {
        self.set_blocked(caller, account, true)
    }

    #[instrument(skip(self))]
    fn unblock_account(&self, caller: Address, account: Address) -> Result<(), LedgerError> {
        self.set_blocked(caller, account, false)
    }

    fn is_blocked(&self, account: Address) -> bool {
        self.read(|inner| inner.accounts.get(account).blocked)
    }

    #[instrument(skip(self))]
    fn freeze_account(
        &self,
        caller: Address,
        account: Address,
        frozen: bool,
    ) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            inner.require_admin(caller, "freeze_account")?;
            let mut state = inner.accounts.get(account);
            state.frozen = frozen;
            inner.commit(None, vec![(account, state)])?;
            info!(frozen, "Account freeze flag updated");
            Ok(())
        })
    }

    fn frozen_accounts(&self, account: Address) -> bool {
        self.read(|inner| inner.accounts.get(account).frozen)
    }

    fn price(&self) -> Amount {
        self.read(|inner| inner.meta.pricing.price())
    }

    fn sell_price(&self) -> Amount {
        self.read(|inner| inner.meta.pricing.sell_price())
    }

    fn buy_price(&self) -> Amount {
        self.read(|inner| inner.meta.pricing.buy_price())
    }

    #[instrument(skip(self))]
    fn change_price(&self, caller: Address, new_price: Amount) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            inner.require_owner(caller, "change_price")?;
            let mut meta = inner.meta.clone();
            meta.pricing.set_price(new_price);
            inner.commit(Some(meta), Vec::new())?;
            info!(new_price, "Price changed");
            Ok(())
        })
    }

    #[instrument(skip(self))]
    fn set_prices(
        &self,
        caller: Address,
        sell_price: Amount,
        buy_price: Amount,
    ) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            inner.require_admin(caller, "set_prices")?;
            let mut meta = inner.meta.clone();
            meta.pricing.set_prices(sell_price, buy_price);
            inner.commit(Some(meta), Vec::new())?;
            info!(sell_price, buy_price, "Sell and buy prices set");
            Ok(())
        })
    }

    #[instrument(skip(self))]
    fn stake(&self, caller: Address, amount: Amount) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            if amount == 0 {
                return Ok(());
            }
            let mut state = inner.accounts.get(caller);
            stake::stake(&mut state, amount)?;
            inner.commit(None, vec![(caller, state)])?;
            debug!(amount, staked = state.staked, "Stake added");
            Ok(())
        })
    }

    fn staked(&self, account: Address) -> Amount {
        self.read(|inner| inner.accounts.get(account).staked)
    }

    #[instrument(skip(self))]
    fn withdraw(&self, caller: Address, amount: Amount) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            if amount == 0 {
                return Ok(());
            }
            let mut state = inner.accounts.get(caller);
            stake::request_withdrawal(&mut state, amount)?;
            inner.commit(None, vec![(caller, state)])?;
            debug!(
                amount,
                pending = state.pending_withdrawal,
                "Withdrawal requested"
            );
            Ok(())
        })
    }

    fn pending_withdrawals(&self, account: Address) -> Amount {
        self.read(|inner| inner.accounts.get(account).pending_withdrawal)
    }

    #[instrument(skip(self))]
    fn withdraw_pending_withdrawals(
        &self,
        caller: Address,
        account: Address,
    ) -> Result<Amount, LedgerError> {
        let released = self.mutate(|inner| {
            inner.require_admin(caller, "withdraw_pending_withdrawals")?;

            let previous = inner.accounts.get(account);
            let mut state = previous;
            let amount = stake::release_pending(&mut state)?;
            if amount == 0 {
                return Ok(0);
            }

            // Escrow is zeroed in the store before value leaves the ledger.
            inner.write(storage::settlement_open_batch(account, &state, amount)?)?;

            if let Err(e) = self.settlement.credit(account, amount) {
                warn!(amount, error = %e, "Settlement failed, restoring escrow");
                inner.repair(storage::settlement_rollback_batch(account, &previous)?);
                return Err(e.into());
            }

            inner.repair(vec![BatchOperation::delete(storage::settlement_key(account))]);
            inner.accounts.apply([(account, state)]);
            info!(amount, "Pending withdrawal settled");
            Ok(amount)
        })?;

        if released > 0 {
            let mut stats = self.stats.write();
            stats.settlements += 1;
            stats.total_settled = stats.total_settled.saturating_add(released);
        }
        Ok(released)
    }

    fn stake_phase(&self, account: Address) -> StakePhase {
        self.read(|inner| inner.accounts.get(account).stake_phase())
    }

    fn owner(&self) -> Address {
        self.read(|inner| inner.meta.access.owner())
    }

    fn admin(&self) -> Address {
        self.read(|inner| inner.meta.access.admin())
    }

    #[instrument(skip(self))]
    fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            inner.require_owner(caller, "transfer_ownership")?;
            let mut meta = inner.meta.clone();
            meta.access.transfer_ownership(caller, new_owner)?;
            inner.commit(Some(meta), Vec::new())?;
            info!("Ownership transferred");
            Ok(())
        })
    }

    #[instrument(skip(self))]
    fn set_admin(&self, caller: Address, new_admin: Address) -> Result<(), LedgerError> {
        self.mutate(|inner| {
            inner.require_owner(caller, "set_admin")?;
            let mut meta = inner.meta.clone();
            meta.access.set_admin(caller, new_admin)?;
            inner.commit(Some(meta), Vec::new())?;
            info!("Admin changed");
            Ok(())
        })
    }
}
