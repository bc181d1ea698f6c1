//! Value objects: equality by value, validated at construction.
//!
//! Stock quantities and prices are the two values that must never go negative.
//! Both are checked here so that rows read back from storage, deserialized from
//! JSON, or produced by arithmetic cannot carry a negative amount.

use serde::{Deserialize, Serialize};

use crate::error::{StockError, StockResult};

/// Marker trait for value objects (immutable, compared by value).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A non-negative stock quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Build a quantity, rejecting negative values.
    pub fn new(value: i64) -> StockResult<Self> {
        if value < 0 {
            return Err(StockError::validation(format!(
                "quantity cannot be negative (got {value})"
            )));
        }
        Ok(Self(value))
    }

    /// Build a strictly positive quantity (requested amounts: transfers, order lines, restocks).
    pub fn positive(value: i64) -> StockResult<Self> {
        if value <= 0 {
            return Err(StockError::validation(format!(
                "quantity must be a positive integer (got {value})"
            )));
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Quantity) -> Option<Quantity> {
        self.0.checked_add(other.0).map(Quantity)
    }

    /// `None` when the result would be negative.
    pub fn checked_sub(self, other: Quantity) -> Option<Quantity> {
        if other.0 > self.0 {
            return None;
        }
        Some(Quantity(self.0 - other.0))
    }

    /// Subtract, flooring at zero.
    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity((self.0 - other.0).max(0))
    }
}

impl ValueObject for Quantity {}

impl TryFrom<i64> for Quantity {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A non-negative amount of money in minor units (cents).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> StockResult<Self> {
        if cents < 0 {
            return Err(StockError::validation(format!(
                "amount cannot be negative (got {cents})"
            )));
        }
        Ok(Self(cents))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Unit price times quantity; `None` on overflow.
    pub fn checked_mul(self, quantity: Quantity) -> Option<Money> {
        self.0.checked_mul(quantity.get()).map(Money)
    }
}

impl ValueObject for Money {}

impl TryFrom<i64> for Money {
    type Error = StockError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Money::from_cents(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
