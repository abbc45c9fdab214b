//! Type-safe price representation using decimal arithmetic.
//!
//! Every amount in the system carries its currency. The storefront is
//! configured with a single store currency; mixing currencies in arithmetic
//! is a bug, so [`Price`] only exposes addition through [`Price::checked_add`].

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Create a price from an amount in minor units (paise, cents).
    #[must_use]
    pub fn from_minor_units(minor: i64, currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(minor, 2),
            currency,
        }
    }

    /// Amount in minor units (paise, cents), as the payment gateway expects.
    ///
    /// Returns `None` if the amount does not fit in an `i64` after scaling.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        let scaled = self.amount.checked_mul(Decimal::ONE_HUNDRED)?;
        scaled.round().to_i64()
    }

    /// Add two prices of the same currency.
    ///
    /// Returns `None` on currency mismatch or overflow.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        Some(Self {
            amount: self.amount.checked_add(other.amount)?,
            currency: self.currency,
        })
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn checked_mul(&self, quantity: u32) -> Option<Self> {
        Some(Self {
            amount: self.amount.checked_mul(Decimal::from(quantity))?,
            currency: self.currency,
        })
    }

    /// Format for display (e.g., "₹1499.00").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency.symbol(), self.amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// ISO 4217 currency codes supported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Currency symbol for display.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_roundtrip() {
        let price = Price::from_minor_units(149_900, CurrencyCode::INR);
        assert_eq!(price.amount, Decimal::new(149_900, 2));
        assert_eq!(price.to_minor_units(), Some(149_900));
    }

    #[test]
    fn test_display_uses_currency_symbol() {
        let inr = Price::from_minor_units(149_900, CurrencyCode::INR);
        assert_eq!(inr.display(), "₹1499.00");

        let usd = Price::from_minor_units(1_999, CurrencyCode::USD);
        assert_eq!(usd.display(), "$19.99");
    }

    #[test]
    fn test_checked_add_same_currency() {
        let a = Price::from_minor_units(100, CurrencyCode::INR);
        let b = Price::from_minor_units(250, CurrencyCode::INR);
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.to_minor_units(), Some(350));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let a = Price::from_minor_units(100, CurrencyCode::INR);
        let b = Price::from_minor_units(100, CurrencyCode::USD);
        assert!(a.checked_add(&b).is_none());
    }

    #[test]
    fn test_checked_mul() {
        let unit = Price::from_minor_units(2_500, CurrencyCode::INR);
        let line = unit.checked_mul(3).unwrap();
        assert_eq!(line.to_minor_units(), Some(7_500));
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("inr".parse::<CurrencyCode>().unwrap(), CurrencyCode::INR);
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("JPY".parse::<CurrencyCode>().is_err());
    }
}
