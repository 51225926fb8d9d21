//! Type-safe price representation using decimal arithmetic.
//!
//! Listing prices arrive as decimal strings (`"19.99"`) and are kept as
//! [`Decimal`] so that line totals and cart subtotals never accumulate
//! floating point error. Formatting is fixed to two decimal places with no
//! currency symbol, matching how the listings API reports amounts.

use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a price string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0:?}")]
    Invalid(String),
    /// The input is below zero.
    #[error("negative price: {0}")]
    Negative(String),
}

/// A non-negative price in the shop's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this price, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Format as a two-decimal amount string (e.g., `"19.99"`).
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{:.2}", self.0.round_dp(2))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(s.to_string()));
        }
        Ok(Self(amount))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl Add for Price {
    type Output = Self;

    // Saturates; listing prices are remote input.
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_pads_to_two_places() {
        assert_eq!("5".parse::<Price>().unwrap().formatted(), "5.00");
        assert_eq!("19.9".parse::<Price>().unwrap().formatted(), "19.90");
        assert_eq!(Price::from_cents(1999).formatted(), "19.99");
    }

    #[test]
    fn test_times_and_sum() {
        let a: Price = "19.99".parse().unwrap();
        let b: Price = "0.01".parse().unwrap();
        let total: Price = [a.times(3), b.times(2)].into_iter().sum();
        assert_eq!(total.formatted(), "59.99");
    }

    #[test]
    fn test_parse_rejects_invalid_and_negative() {
        assert_eq!(
            "abc".parse::<Price>(),
            Err(PriceError::Invalid("abc".to_string()))
        );
        assert_eq!(
            "-1.00".parse::<Price>(),
            Err(PriceError::Negative("-1.00".to_string()))
        );
    }

    #[test]
    fn test_serde_roundtrip_preserves_amount() {
        let price: Price = "12.50".parse().unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_panicking() {
        let huge = Price::new(Decimal::MAX);
        assert_eq!(huge.times(u32::MAX), huge);
        assert_eq!(huge + Price::from_cents(1), huge);
        let total: Price = [huge, huge, Price::from_cents(1999)].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
    }
}
