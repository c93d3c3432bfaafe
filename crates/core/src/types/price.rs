//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are kept as [`Decimal`] in the currency's standard unit (dollars,
//! not cents) so that cart totals never accumulate floating point error.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's default currency.
    #[must_use]
    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )?;
        // Always render two decimal places, e.g. "$25.00"
        match self.amount.round_dp(2).scale() {
            0 => f.write_str(".00"),
            1 => f.write_str("0"),
            _ => Ok(()),
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_cents() {
        assert_eq!(Price::usd(Decimal::new(25, 0)).to_string(), "$25.00");
        assert_eq!(Price::usd(Decimal::new(255, 1)).to_string(), "$25.50");
        assert_eq!(Price::usd(Decimal::new(3999, 2)).to_string(), "$39.99");
    }

    #[test]
    fn test_display_rounds_extra_places() {
        assert_eq!(Price::usd(Decimal::new(19_999, 3)).to_string(), "$20.00");
        assert_eq!(Price::usd(Decimal::new(12_346, 3)).to_string(), "$12.35");
    }

    #[test]
    fn test_times() {
        let unit = Price::usd(Decimal::new(3999, 2));
        assert_eq!(unit.times(3).amount, Decimal::new(11997, 2));
        assert_eq!(unit.times(0).amount, Decimal::ZERO);
    }

    #[test]
    fn test_currency_symbol() {
        let price = Price::new(Decimal::new(10, 0), CurrencyCode::GBP);
        assert_eq!(price.to_string(), "£10.00");
    }
}
