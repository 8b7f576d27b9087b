//! # Value Objects
//!
//! Immutable primitives for the token ledger: account addresses and
//! fixed-point token amounts.
//!
//! ## Amounts
//!
//! Every amount is an exact integer in the smallest denomination. With the
//! default 18 fractional digits, one whole token is `10^18` base units.
//! `u128` holds up to ~3.4 * 10^38, which leaves room for supplies in the
//! quintillions of whole tokens. No floating point is used anywhere.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::LedgerError;

/// Token amount in base units.
pub type Amount = u128;

/// Default number of fractional digits (wei-style).
pub const DEFAULT_DECIMALS: u8 = 18;

/// Largest `decimals` value whose scale (`10^decimals`) fits in a `u128`.
pub const MAX_DECIMALS: u8 = 38;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account identifier.
///
/// Textual form is `0x` followed by 40 hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Full lowercase hex form without the `0x` prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes =
            hex::decode(digits).map_err(|_| LedgerError::InvalidAddress(s.to_string()))?;
        Self::from_slice(&bytes).ok_or_else(|| LedgerError::InvalidAddress(s.to_string()))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

// =============================================================================
// FIXED-POINT UNITS
// =============================================================================

/// `10^decimals`, or `None` if it does not fit in a `u128`.
#[must_use]
pub fn unit_scale(decimals: u8) -> Option<Amount> {
    10u128.checked_pow(u32::from(decimals))
}

/// Parse a decimal string such as `"0.01"` into base units.
///
/// Rejects signs, exponents, and more fractional digits than `decimals`
/// rather than rounding.
pub fn parse_units(value: &str, decimals: u8) -> Result<Amount, LedgerError> {
    let invalid = || LedgerError::InvalidAmount(value.to_string());
    let scale = unit_scale(decimals).ok_or_else(invalid)?;

    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }
    if fraction.len() > usize::from(decimals) {
        return Err(invalid());
    }

    let whole_units: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction_units: Amount = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{fraction:0<width$}", width = usize::from(decimals));
        padded.parse().map_err(|_| invalid())?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction_units))
        .ok_or(LedgerError::ArithmeticOverflow)
}

/// Render base units as a decimal string, trimming trailing zeros.
#[must_use]
pub fn format_units(amount: Amount, decimals: u8) -> String {
    let Some(scale) = unit_scale(decimals) else {
        return amount.to_string();
    };
    let whole = amount / scale;
    let fraction = amount % scale;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0>width$}", width = usize::from(decimals));
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Whole tokens to base units with the default 18 decimals.
///
/// Saturates at `u128::MAX`; intended for constants and tests.
#[must_use]
pub const fn tokens(whole: u128) -> Amount {
    whole.saturating_mul(1_000_000_000_000_000_000)
}
