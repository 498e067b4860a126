//! Fixed-point amounts.
//!
//! Money always carries two decimal places and is persisted as integer minor
//! units. Stock quantities allow up to three places and are persisted as text.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places carried by [`Money`].
pub const MONEY_SCALE: u32 = 2;

/// Decimal places allowed in a [`Quantity`].
pub const QUANTITY_SCALE: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("Enter a number with at most {0} decimal places.")]
    TooPrecise(u32),

    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,

    #[error("Value is out of range.")]
    OutOfRange,

    #[error("Enter a number.")]
    Malformed,
}

/// A monetary amount with a fixed scale of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Accepts any decimal that fits the scale without rounding.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.normalize().scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise(MONEY_SCALE));
        }
        let mut amount = amount;
        amount.rescale(MONEY_SCALE);
        let money = Money(amount);
        // must round-trip through the minor-unit column
        money.minor_units()?;
        Ok(money)
    }

    /// Like [`Money::new`] but rejects amounts below zero.
    pub fn non_negative(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Money::new(amount)
    }

    /// Builds an amount from minor units (1 = 0.01).
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, MONEY_SCALE))
    }

    pub fn minor_units(&self) -> Result<i64, MoneyError> {
        let mut amount = self.0;
        amount.rescale(MONEY_SCALE);
        i64::try_from(amount.mantissa()).map_err(|_| MoneyError::OutOfRange)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(&self) -> Money {
        Money(self.0.abs())
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

/// Row decoding: money columns store minor units.
impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money::from_minor(minor)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Non-negative stock quantity, e.g. `2.5` kg of coffee beans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        let amount = amount.normalize();
        if amount.scale() > QUANTITY_SCALE {
            return Err(MoneyError::TooPrecise(QUANTITY_SCALE));
        }
        Ok(Quantity(amount))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

/// Row decoding: quantities are stored as decimal text.
impl TryFrom<String> for Quantity {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let amount: Decimal = value.trim().parse().map_err(|_| MoneyError::Malformed)?;
        Quantity::new(amount)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn money_keeps_two_places() {
        let money = Money::new(dec("12.5")).unwrap();
        assert_eq!(money.to_string(), "12.50");
        assert_eq!(money.minor_units().unwrap(), 1250);
    }

    #[test]
    fn money_rejects_sub_grosz_amounts() {
        assert_eq!(Money::new(dec("0.001")), Err(MoneyError::TooPrecise(2)));
        // trailing zeros are not extra precision
        assert!(Money::new(dec("3.1000")).is_ok());
    }

    #[test]
    fn negative_amounts_are_refused_where_required() {
        assert_eq!(Money::non_negative(dec("-0.01")), Err(MoneyError::Negative));
        assert!(Money::non_negative(dec("0")).is_ok());
        assert!(Money::new(dec("-0.01")).unwrap().is_negative());
    }

    #[test]
    fn minor_units_round_trip() {
        assert_eq!(Money::from_minor(-15000).to_string(), "-150.00");
        assert_eq!(Money::from_minor(123).minor_units().unwrap(), 123);
    }

    #[test]
    fn sums_are_exact() {
        // 0.1 + 0.2 drifts with floats
        let total: Money = [dec("0.10"), dec("0.20")]
            .into_iter()
            .map(|d| Money::new(d).unwrap())
            .sum();
        assert_eq!(total, Money::new(dec("0.30")).unwrap());
    }

    #[test]
    fn quantity_parses_stored_text() {
        let quantity = Quantity::try_from("2.500".to_string()).unwrap();
        assert_eq!(quantity.to_string(), "2.5");
        assert!(Quantity::try_from("-1".to_string()).is_err());
        assert!(Quantity::try_from("1.0001".to_string()).is_err());
        assert_eq!(Quantity::try_from("abc".to_string()), Err(MoneyError::Malformed));
    }

    #[test]
    fn money_deserializes_from_numbers_and_strings() {
        let from_str: Money = serde_json::from_str("\"10.25\"").unwrap();
        let from_num: Money = serde_json::from_str("10").unwrap();
        assert_eq!(from_str.minor_units().unwrap(), 1025);
        assert_eq!(from_num.minor_units().unwrap(), 1000);
        assert!(serde_json::from_str::<Money>("\"1.234\"").is_err());
    }
}
