//! Prices as the backend reports them.
//!
//! The backend is inconsistent about money: product prices usually arrive as
//! decimal strings (`"1299.00"`), occasionally with a currency symbol
//! (`"$1,299.00"`), and cart rows sometimes carry plain JSON numbers. [`Price`]
//! accepts all of these and keeps the value as a [`Decimal`] so cart totals
//! never accumulate binary floating point error. Arithmetic saturates
//! instead of panicking, since amounts come from outside.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors from strict price parsing (admin forms).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price cannot be empty")]
    Empty,
    #[error("price must be a number")]
    NotANumber,
    #[error("price cannot be negative")]
    Negative,
}

/// A price in the store currency (USD).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Parse a price the way the storefront always has: drop every character
    /// that is not a digit or `.`, then read the longest numeric prefix.
    ///
    /// Unparseable input yields zero rather than an error, so one malformed
    /// cart row cannot break the whole cart page.
    ///
    /// ```
    /// use arcverse_core::Price;
    ///
    /// assert_eq!(Price::parse_lenient("$1,299.50").to_string(), "$1299.50");
    /// assert_eq!(Price::parse_lenient("n/a"), Price::ZERO);
    /// ```
    #[must_use]
    pub fn parse_lenient(input: &str) -> Self {
        let cleaned: String = input
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        // Keep at most one decimal point, like a numeric prefix scan would.
        let numeric = match cleaned.match_indices('.').nth(1) {
            Some((second_dot, _)) => cleaned.get(..second_dot).unwrap_or_default(),
            None => cleaned.as_str(),
        };

        let numeric = numeric.trim_end_matches('.');
        if numeric.is_empty() || numeric == "." {
            return Self::ZERO;
        }

        Decimal::from_str(numeric).map_or(Self::ZERO, Self)
    }

    /// Parse a price typed into an admin form. Unlike [`Price::parse_lenient`],
    /// garbage is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] when the input is empty, not a number, or
    /// negative.
    pub fn parse_strict(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim().trim_start_matches('$');
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount = Decimal::from_str(trimmed).map_err(|_| PriceError::NotANumber)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Amount rounded half away from zero to cents, for display.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format for display (e.g., `"$19.99"`).
    #[must_use]
    pub fn display(&self) -> String {
        self.to_string()
    }

    /// Multiply by a quantity, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.rounded())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Wire representation: the backend sends numbers, strings or `null`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawPrice>::deserialize(deserializer)?;
        Ok(match raw {
            None => Self::ZERO,
            Some(RawPrice::Int(i)) => Self(Decimal::from(i)),
            // Shortest round-trip text of the float, so 19.99 stays 19.99.
            Some(RawPrice::Float(f)) => Self::parse_lenient(&f.to_string()),
            Some(RawPrice::Text(s)) => Self::parse_lenient(&s),
        })
    }
}

impl Serialize for Price {
    /// Serialised as a JSON number, which is what the product endpoints expect.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.rounded().to_f64().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_strips_symbols() {
        assert_eq!(Price::parse_lenient("$1,299.00"), Price::from_cents(129_900));
        assert_eq!(Price::parse_lenient("USD 19.99"), Price::from_cents(1999));
    }

    #[test]
    fn test_parse_lenient_second_dot_ends_number() {
        assert_eq!(Price::parse_lenient("1.2.3"), Price::from_cents(120));
    }

    #[test]
    fn test_parse_lenient_garbage_is_zero() {
        assert_eq!(Price::parse_lenient(""), Price::ZERO);
        assert_eq!(Price::parse_lenient("free"), Price::ZERO);
        assert_eq!(Price::parse_lenient("."), Price::ZERO);
    }

    #[test]
    fn test_parse_strict() {
        assert_eq!(Price::parse_strict(" 49.5 "), Ok(Price::from_cents(4950)));
        assert_eq!(Price::parse_strict("$10"), Ok(Price::from_cents(1000)));
        assert_eq!(Price::parse_strict(""), Err(PriceError::Empty));
        assert_eq!(Price::parse_strict("ten"), Err(PriceError::NotANumber));
        assert_eq!(Price::parse_strict("-1"), Err(PriceError::Negative));
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Price::new(Decimal::new(1_005, 3)).to_string(), "$1.01");
        assert_eq!(Price::from_cents(5).to_string(), "$0.05");
        assert_eq!(Price::new(Decimal::from(12)).to_string(), "$12.00");
    }

    #[test]
    fn test_deserialize_from_any_backend_shape() {
        let from_str: Price = serde_json::from_str("\"899.99\"").unwrap();
        let from_float: Price = serde_json::from_str("899.99").unwrap();
        let from_int: Price = serde_json::from_str("900").unwrap();
        let from_null: Price = serde_json::from_str("null").unwrap();

        assert_eq!(from_str, Price::from_cents(89_999));
        assert_eq!(from_float, Price::from_cents(89_999));
        assert_eq!(from_int, Price::from_cents(90_000));
        assert_eq!(from_null, Price::ZERO);
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&Price::from_cents(1999)).unwrap();
        assert_eq!(json, "19.99");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_cents(250).times(2), Price::from_cents(100)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(600));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Price::new(Decimal::MAX);
        assert_eq!(huge.times(8), huge);
        assert_eq!(huge + Price::from_cents(1), huge);
        assert_eq!(huge * Decimal::TWO, huge);
    }
}
