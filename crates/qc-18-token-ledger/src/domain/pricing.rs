//! Price parameters.
//!
//! `price` is owner-managed; the `sell_price`/`buy_price` pair is
//! admin-managed and always updated together. Authorization is checked by
//! the service before these setters run.

use serde::{Deserialize, Serialize};

use super::errors::LedgerError;
use super::value_objects::Amount;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    price: Amount,
    sell_price: Amount,
    buy_price: Amount,
    mint_rate: Amount,
}

impl PricingPolicy {
    #[must_use]
    pub fn new(price: Amount, mint_rate: Amount) -> Self {
        Self {
            price,
            mint_rate,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn price(&self) -> Amount {
        self.price
    }

    #[must_use]
    pub fn sell_price(&self) -> Amount {
        self.sell_price
    }

    #[must_use]
    pub fn buy_price(&self) -> Amount {
        self.buy_price
    }

    #[must_use]
    pub fn mint_rate(&self) -> Amount {
        self.mint_rate
    }

    pub fn set_price(&mut self, price: Amount) {
        self.price = price;
    }

    pub fn set_prices(&mut self, sell_price: Amount, buy_price: Amount) {
        self.sell_price = sell_price;
        self.buy_price = buy_price;
    }

    /// Tokens credited for a mint payment.
    pub fn tokens_for_payment(&self, payment: Amount) -> Result<Amount, LedgerError> {
        payment
            .checked_mul(self.mint_rate)
            .ok_or(LedgerError::ArithmeticOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{parse_units, tokens};

    #[test]
    fn test_set_prices_updates_both() {
        let mut pricing = PricingPolicy::new(parse_units("0.01", 18).unwrap(), 1000);
        pricing.set_prices(5, 7);
        assert_eq!(pricing.sell_price(), 5);
        assert_eq!(pricing.buy_price(), 7);
        assert_eq!(pricing.price(), parse_units("0.01", 18).unwrap());
    }

    #[test]
    fn test_tokens_for_payment() {
        let pricing = PricingPolicy::new(0, 1000);
        assert_eq!(pricing.tokens_for_payment(tokens(100)).unwrap(), tokens(100_000));
        assert_eq!(pricing.tokens_for_payment(0).unwrap(), 0);
    }

    #[test]
    fn test_tokens_for_payment_overflow() {
        let pricing = PricingPolicy::new(0, 2);
        assert_eq!(
            pricing.tokens_for_payment(Amount::MAX),
            Err(LedgerError::ArithmeticOverflow)
        );
    }
}
