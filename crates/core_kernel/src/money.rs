//! Monetary amounts and fixed-point measurements
//!
//! Settlement arithmetic is integer-only. `Amount` carries currency units held by
//! the pool or owed to a holder, `FixedPoint` carries signed trigger thresholds and
//! observed weather values, and `Percent` carries configured fractions.
//!
//! All arithmetic that can overflow is checked and surfaces `MoneyError` instead of
//! wrapping or panicking.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use thiserror::Error;

/// Errors that can occur during amount and fixed-point operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,

    #[error("Underflow during calculation")]
    Underflow,

    #[error("Percentage out of range: {0} (must be 0-100)")]
    PercentOutOfRange(u32),

    #[error("Value {0} cannot be represented with {1} decimal places")]
    PrecisionLoss(Decimal, u32),
}

/// A non-negative integer amount of currency units
///
/// Amounts never go negative: subtraction that would underflow is an error.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Creates an amount from raw currency units
    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// Returns the raw number of currency units
    pub const fn units(&self) -> u128 {
        self.0
    }

    /// Returns true if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(&self, other: Amount) -> Result<Amount, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction, failing instead of going negative
    pub fn checked_sub(&self, other: Amount) -> Result<Amount, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(MoneyError::Underflow)
    }

    /// Subtraction clamped at zero
    pub fn saturating_sub(&self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Checked multiplication by a scalar
    pub fn checked_mul(&self, factor: u128) -> Result<Amount, MoneyError> {
        self.0
            .checked_mul(factor)
            .map(Amount)
            .ok_or(MoneyError::Overflow)
    }

    /// Converts to a `Decimal` for rate calculations
    pub fn to_decimal(&self) -> Result<Decimal, MoneyError> {
        Decimal::from_u128(self.0).ok_or(MoneyError::Overflow)
    }

    /// Converts a non-negative `Decimal` to an amount, rounding up
    ///
    /// Used where a shortfall of one unit must be charged rather than forgiven.
    pub fn from_decimal_ceil(value: Decimal) -> Result<Amount, MoneyError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MoneyError::InvalidAmount(value.to_string()));
        }
        value
            .ceil()
            .to_u128()
            .map(Amount)
            .ok_or(MoneyError::Overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Amount(units as u128)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    /// Saturating sum; callers that need overflow detection should fold with `checked_add`
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| Amount(acc.0.saturating_add(a.0)))
    }
}

/// Computes `a * b / c` with the multiplication performed first and floor division
///
/// This is the only rounding site for proportional share accounting. Performing the
/// multiplication before the division keeps the full precision of the product.
///
/// # Errors
///
/// Returns `DivisionByZero` if `c` is zero and `Overflow` if `a * b` does not fit.
///
/// # Example
///
/// ```rust
/// use core_kernel::money::mul_div_floor;
///
/// assert_eq!(mul_div_floor(750, 1500, 1500).unwrap(), 750);
/// assert_eq!(mul_div_floor(10, 10, 3).unwrap(), 33);
/// ```
pub fn mul_div_floor(a: u128, b: u128, c: u128) -> Result<u128, MoneyError> {
    if c == 0 {
        return Err(MoneyError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(MoneyError::Overflow)?;
    Ok(product / c)
}

/// Signed fixed-point value with two decimal places
///
/// Thresholds and observed values use this type so that trigger evaluation is a pure
/// integer comparison. `FixedPoint::from_raw(3050)` is 30.50.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FixedPoint(i64);

impl FixedPoint {
    /// Number of decimal places carried
    pub const DECIMALS: u32 = 2;
    /// Raw units per whole value
    pub const SCALE: i64 = 100;

    /// Creates a value from its raw scaled representation
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Creates a value from a whole number
    pub fn from_int(value: i64) -> Result<Self, MoneyError> {
        value
            .checked_mul(Self::SCALE)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Creates a value from a decimal, rejecting anything that needs more than two places
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        if value.round_dp(Self::DECIMALS) != value {
            return Err(MoneyError::PrecisionLoss(value, Self::DECIMALS));
        }
        (value * Decimal::from(Self::SCALE))
            .to_i64()
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Returns the raw scaled representation
    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, Self::DECIMALS)
    }

    /// Canonical big-endian encoding of the raw value
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Three-way comparison on the raw representation
    pub fn compare(&self, other: &FixedPoint) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// A whole-number percentage in the range 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const HUNDRED: Percent = Percent(100);

    /// Creates a percentage, failing if above 100
    pub fn new(value: u32) -> Result<Self, MoneyError> {
        if value > 100 {
            return Err(MoneyError::PercentOutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    /// Returns the percentage value
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Applies this percentage to an amount with floor rounding
    pub fn apply_floor(&self, amount: Amount) -> Result<Amount, MoneyError> {
        mul_div_floor(amount.units(), self.0 as u128, 100).map(Amount::new)
    }
}

impl TryFrom<u32> for Percent {
    type Error = MoneyError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Percent::new(value)
    }
}

impl From<Percent> for u32 {
    fn from(p: Percent) -> u32 {
        p.0 as u32
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn mul_div_floor_is_exact_floor(
            a in 0u128..1_000_000_000_000,
            b in 0u128..1_000_000_000_000,
            c in 1u128..1_000_000_000_000
        ) {
            let q = mul_div_floor(a, b, c).unwrap();
            prop_assert!(q * c <= a * b);
            prop_assert!(a * b < (q + 1) * c);
        }

        #[test]
        fn fixed_point_decimal_conversion_is_stable(raw in -1_000_000_000i64..1_000_000_000i64) {
            let v = FixedPoint::from_raw(raw);
            prop_assert_eq!(FixedPoint::from_decimal(v.to_decimal()).unwrap(), v);
        }
    }
}
