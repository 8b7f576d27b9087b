//! # Storage Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `ledger:meta` | bincode `LedgerMeta` |
//! | `account:<40 hex digits>` | bincode `AccountState` |
//! | `settlement:<40 hex digits>` | bincode `Amount` released but not yet confirmed by the gateway |
//!
//! Keys are ASCII so a store can be inspected by hand.

use crate::domain::{AccountState, Address, Amount, LedgerError, LedgerMeta};
use crate::ports::outbound::BatchOperation;

pub const META_KEY: &[u8] = b"ledger:meta";
pub const ACCOUNT_PREFIX: &[u8] = b"account:";
pub const SETTLEMENT_PREFIX: &[u8] = b"settlement:";

fn address_key(prefix: &[u8], address: Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 40);
    key.extend_from_slice(prefix);
    key.extend_from_slice(address.to_hex().as_bytes());
    key
}

fn parse_address_key(prefix: &[u8], key: &[u8]) -> Result<Address, LedgerError> {
    let kind = String::from_utf8_lossy(prefix);
    let digits = key
        .strip_prefix(prefix)
        .ok_or_else(|| LedgerError::Serialization(format!("not a {kind} key")))?;
    let text = std::str::from_utf8(digits)
        .map_err(|e| LedgerError::Serialization(format!("{kind} key: {e}")))?;
    text.parse()
        .map_err(|_| LedgerError::Serialization(format!("{kind} key: {text}")))
}

#[must_use]
pub fn account_key(address: Address) -> Vec<u8> {
    address_key(ACCOUNT_PREFIX, address)
}

pub fn parse_account_key(key: &[u8]) -> Result<Address, LedgerError> {
    parse_address_key(ACCOUNT_PREFIX, key)
}

#[must_use]
pub fn settlement_key(address: Address) -> Vec<u8> {
    address_key(SETTLEMENT_PREFIX, address)
}

pub fn parse_settlement_key(key: &[u8]) -> Result<Address, LedgerError> {
    parse_address_key(SETTLEMENT_PREFIX, key)
}

pub fn encode_meta(meta: &LedgerMeta) -> Result<Vec<u8>, LedgerError> {
    bincode::serialize(meta).map_err(|e| LedgerError::Serialization(e.to_string()))
}

pub fn decode_meta(bytes: &[u8]) -> Result<LedgerMeta, LedgerError> {
    bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
}

pub fn encode_account(account: &AccountState) -> Result<Vec<u8>, LedgerError> {
    bincode::serialize(account).map_err(|e| LedgerError::Serialization(e.to_string()))
}

pub fn decode_account(bytes: &[u8]) -> Result<AccountState, LedgerError> {
    bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
}

pub fn encode_amount(amount: Amount) -> Result<Vec<u8>, LedgerError> {
    bincode::serialize(&amount).map_err(|e| LedgerError::Serialization(e.to_string()))
}

pub fn decode_amount(bytes: &[u8]) -> Result<Amount, LedgerError> {
    bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
}

/// Batch that zeroes an account's escrow and records the released amount
/// as outstanding until the gateway confirms it.
pub fn settlement_open_batch(
    address: Address,
    released: &AccountState,
    amount: Amount,
) -> Result<Vec<BatchOperation>, LedgerError> {
    let mut batch = write_batch(None, &[(address, *released)])?;
    batch.push(BatchOperation::put(settlement_key(address), encode_amount(amount)?));
    Ok(batch)
}

/// Batch that puts the account back to `previous` and drops the record.
pub fn settlement_rollback_batch(
    address: Address,
    previous: &AccountState,
) -> Result<Vec<BatchOperation>, LedgerError> {
    let mut batch = write_batch(None, &[(address, *previous)])?;
    batch.push(BatchOperation::delete(settlement_key(address)));
    Ok(batch)
}

/// Build the write batch for one committed operation.
pub fn write_batch(
    meta: Option<&LedgerMeta>,
    accounts: &[(Address, AccountState)],
) -> Result<Vec<BatchOperation>, LedgerError> {
    let mut batch = Vec::with_capacity(accounts.len() + 1);
    if let Some(meta) = meta {
        batch.push(BatchOperation::put(META_KEY, encode_meta(meta)?));
    }
    for (address, account) in accounts {
        batch.push(BatchOperation::put(account_key(*address), encode_account(account)?));
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_key_layout() {
        let address = Address::new([0xAB; 20]);
        let key = account_key(address);

        assert!(key.starts_with(ACCOUNT_PREFIX));
        assert_eq!(key.len(), ACCOUNT_PREFIX.len() + 40);
        assert_eq!(parse_account_key(&key).unwrap(), address);
    }

    #[test]
    fn test_parse_rejects_foreign_keys() {
        assert!(parse_account_key(META_KEY).is_err());
        assert!(parse_account_key(b"account:zz").is_err());
    }

    #[test]
    fn test_settlement_key_layout() {
        let address = Address::new([0x5E; 20]);
        let key = settlement_key(address);

        assert!(key.starts_with(SETTLEMENT_PREFIX));
        assert!(!key.starts_with(ACCOUNT_PREFIX));
        assert_eq!(parse_settlement_key(&key).unwrap(), address);
        assert!(parse_account_key(&key).is_err());
    }

    #[test]
    fn test_settlement_open_then_rollback() {
        let address = Address::new([0x5E; 20]);
        let previous = AccountState {
            pending_withdrawal: 50,
            ..Default::default()
        };
        let released = AccountState {
            settled: 50,
            ..Default::default()
        };

        let open = settlement_open_batch(address, &released, 50).unwrap();
        assert_eq!(open.len(), 2);
        match &open[1] {
            BatchOperation::Put { key, value } => {
                assert_eq!(key, &settlement_key(address));
                assert_eq!(decode_amount(value).unwrap(), 50);
            }
            BatchOperation::Delete { .. } => panic!("expected put"),
        }

        let rollback = settlement_rollback_batch(address, &previous).unwrap();
        assert_eq!(
            rollback[1],
            BatchOperation::delete(settlement_key(address))
        );
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            decode_account(&[1, 2]),
            Err(LedgerError::Serialization(_))
        ));
    }

    #[test]
    fn test_write_batch_encodes_accounts() {
        let account = AccountState::with_balance(5);
        let batch = write_batch(None, &[(Address::new([1; 20]), account)]).unwrap();
        assert_eq!(batch.len(), 1);
        match &batch[0] {
            BatchOperation::Put { key, value } => {
                assert!(key.starts_with(ACCOUNT_PREFIX));
                assert_eq!(decode_account(value).unwrap(), account);
            }
            BatchOperation::Delete { .. } => panic!("expected put"),
        }
    }
}
