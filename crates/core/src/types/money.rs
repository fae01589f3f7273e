//! Fixed-point currency amounts.
//!
//! Prices and booking totals are stored as `NUMERIC(10, 2)`: at most ten
//! digits, two of them after the decimal point. [`Money`] enforces the same
//! shape in memory so a value that round-trips through the database never
//! changes.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount has more fractional digits than the currency allows.
    #[error("amount must have at most {max} decimal places")]
    TooPrecise {
        /// Maximum number of fractional digits.
        max: u32,
    },
    /// The amount does not fit in the storage column.
    #[error("amount must have at most {max} digits in total")]
    TooLarge {
        /// Maximum number of digits.
        max: u32,
    },
}

/// A non-negative currency amount with exactly two fractional digits.
///
/// Serializes as a decimal string (`"120.00"`), matching how the API renders
/// every monetary field.
///
/// ```
/// use rust_decimal::Decimal;
/// use wayfarer_core::Money;
///
/// let nightly = Money::new(Decimal::new(12_000, 2)).unwrap();
/// assert_eq!(nightly.to_string(), "120.00");
/// assert_eq!(nightly.times(3).unwrap().to_string(), "360.00");
///
/// assert!(Money::new(Decimal::new(-1, 0)).is_err());
/// assert!(Money::new(Decimal::new(1_001, 3)).is_err()); // 1.001
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Number of fractional digits.
    pub const SCALE: u32 = 2;

    /// Total number of digits (integer and fractional).
    pub const MAX_DIGITS: u32 = 10;

    /// Zero.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, Self::SCALE));

    /// Create a new amount, validating sign, precision, and magnitude.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two
    /// fractional digits, or needs more than ten digits in total.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }

        if amount.normalize().scale() > Self::SCALE {
            return Err(MoneyError::TooPrecise { max: Self::SCALE });
        }

        let limit = Decimal::from(10_i64.pow(Self::MAX_DIGITS - Self::SCALE));
        if amount >= limit {
            return Err(MoneyError::TooLarge {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self::rescaled(amount))
    }

    /// Create an amount from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting amount is negative or too large.
    pub fn from_cents(cents: i64) -> Result<Self, MoneyError> {
        Self::new(Decimal::new(cents, Self::SCALE))
    }

    /// The underlying decimal amount (always scale 2).
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a whole quantity, e.g. a number of nights.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::TooLarge`] if the product does not fit.
    pub fn times(self, quantity: u32) -> Result<Self, MoneyError> {
        let product = self
            .0
            .checked_mul(Decimal::from(quantity))
            .ok_or(MoneyError::TooLarge {
                max: Self::MAX_DIGITS,
            })?;
        Self::new(product)
    }

    fn rescaled(mut amount: Decimal) -> Self {
        amount.rescale(Self::SCALE);
        Self(amount)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // NUMERIC(10, 2) column, so the shape is already right
        Ok(Self::rescaled(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rescales_to_two_places() {
        let money = Money::new(Decimal::from(100)).unwrap();
        assert_eq!(money.to_string(), "100.00");
        assert_eq!(money.amount().scale(), 2);
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_precision() {
        // 99.5000 normalizes to 99.5
        let money = Money::new(Decimal::new(995_000, 4)).unwrap();
        assert_eq!(money.to_string(), "99.50");
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(
            Money::new(Decimal::new(-1, 2)),
            Err(MoneyError::Negative)
        );
    }

    #[test]
    fn test_rejects_three_decimal_places() {
        assert_eq!(
            Money::new(Decimal::new(10_005, 3)),
            Err(MoneyError::TooPrecise { max: 2 })
        );
    }

    #[test]
    fn test_rejects_more_than_ten_digits() {
        assert!(Money::new(Decimal::new(9_999_999_999, 2)).is_ok());
        assert_eq!(
            Money::new(Decimal::from(100_000_000)),
            Err(MoneyError::TooLarge { max: 10 })
        );
    }

    #[test]
    fn test_times() {
        let nightly = Money::from_cents(12_050).unwrap();
        assert_eq!(nightly.times(3).unwrap().to_string(), "361.50");
        assert_eq!(nightly.times(0).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_times_overflow() {
        let nightly = Money::from_cents(9_000_000_000).unwrap();
        assert!(nightly.times(2).is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let money = Money::from_cents(30_000).unwrap();
        assert_eq!(serde_json::to_string(&money).unwrap(), "\"300.00\"");
    }

    #[test]
    fn test_deserializes_from_string_and_number() {
        let from_str: Money = serde_json::from_str("\"120.5\"").unwrap();
        assert_eq!(from_str.to_string(), "120.50");

        let from_num: Money = serde_json::from_str("95").unwrap();
        assert_eq!(from_num.to_string(), "95.00");

        assert!(serde_json::from_str::<Money>("\"-3.00\"").is_err());
    }
}
