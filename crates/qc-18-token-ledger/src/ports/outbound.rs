//! # Outbound Ports (Driven Ports)
//!
//! Interfaces the host application provides to the ledger.
//!
//! Testing: `InMemoryKVStore`, `InMemorySettlement` (see `adapters`).

use thiserror::Error;

use crate::domain::{Address, Amount, LedgerError};

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

impl From<KVStoreError> for LedgerError {
    fn from(err: KVStoreError) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

/// Result of a prefix scan: `(key, value)` pairs.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value persistence.
///
/// The ledger writes every committed mutation as a single atomic batch and
/// reads everything back once in `LedgerService::restore`.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Iterate over keys with a prefix.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Settlement gateway errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("settlement rejected for {account:?}: {reason}")]
    Rejected { account: Address, reason: String },

    #[error("settlement gateway unavailable")]
    Unavailable,
}

impl From<SettlementError> for LedgerError {
    fn from(err: SettlementError) -> Self {
        LedgerError::Settlement(err.to_string())
    }
}

/// Destination for escrow released by `withdraw_pending_withdrawals`.
///
/// Balances held here live outside the ledger; the ledger never reads them
/// back into account state.
pub trait SettlementGateway: Send + Sync {
    /// Deliver `amount` to `account`'s external balance.
    fn credit(&self, account: Address, amount: Amount) -> Result<(), SettlementError>;

    /// External balance of `account`.
    fn balance_of(&self, account: Address) -> Amount;
}
