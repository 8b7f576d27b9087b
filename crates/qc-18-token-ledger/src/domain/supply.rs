//! Supply tracking.
//!
//! `circulating_supply` is the cumulative minted amount (initial allocation
//! included). It is not derived from `total_supply`, which only acts as the
//! minting cap. Airdrops are counted separately and never move `minted`.

use serde::{Deserialize, Serialize};

use super::entities::SupplyStats;
use super::errors::LedgerError;
use super::value_objects::Amount;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyLedger {
    total_supply: Amount,
    minted: Amount,
    airdropped: Amount,
}

impl SupplyLedger {
    #[must_use]
    pub fn new(total_supply: Amount) -> Self {
        Self {
            total_supply,
            minted: 0,
            airdropped: 0,
        }
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    #[must_use]
    pub fn minted(&self) -> Amount {
        self.minted
    }

    #[must_use]
    pub fn airdropped(&self) -> Amount {
        self.airdropped
    }

    #[must_use]
    pub fn circulating_supply(&self) -> Amount {
        self.minted
    }

    /// Headroom left under the cap.
    #[must_use]
    pub fn mintable(&self) -> Amount {
        self.total_supply.saturating_sub(self.minted)
    }

    /// Record `amount` as minted. Fails without changing anything if the
    /// cap would be exceeded.
    pub fn mint(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        let minted = self
            .minted
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        if minted > self.total_supply {
            return Err(LedgerError::SupplyCapExceeded {
                minted: self.minted,
                requested: amount,
                total_supply: self.total_supply,
            });
        }
        self.minted = minted;
        Ok(minted)
    }

    pub fn record_airdrop(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.airdropped = self
            .airdropped
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> SupplyStats {
        SupplyStats {
            total_supply: self.total_supply,
            minted: self.minted,
            airdropped: self.airdropped,
            circulating_supply: self.circulating_supply(),
        }
    }
}
