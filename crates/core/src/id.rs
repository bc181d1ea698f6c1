//! Strongly-typed identifiers used across the stock services.
//!
//! Rows are keyed by database-assigned `BIGSERIAL` values, so every identifier
//! is a transparent `i64` newtype.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::StockError;

/// Identifier of a product (reference data).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of a shelf (a catalog location customers buy from).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShelfId(i64);

/// Identifier of a supplier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(i64);

/// Identifier of an employee (restock responsible).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(i64);

/// Identifier of a customer placing orders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of a restock order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestockId(i64);

/// Identifier of a customer order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

/// Identifier of a catalog entry (one per product-per-shelf).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogEntryId(i64);

macro_rules! impl_i64_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = StockError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = i64::from_str(s.trim())
                    .map_err(|e| StockError::validation(format!("{}: {}", $name, e)))?;
                if raw <= 0 {
                    return Err(StockError::validation(format!(
                        "{}: must be a positive integer",
                        $name
                    )));
                }
                Ok(Self(raw))
            }
        }
    };
}

impl_i64_newtype!(ProductId, "ProductId");
impl_i64_newtype!(ShelfId, "ShelfId");
impl_i64_newtype!(SupplierId, "SupplierId");
impl_i64_newtype!(EmployeeId, "EmployeeId");
impl_i64_newtype!(UserId, "UserId");
impl_i64_newtype!(RestockId, "RestockId");
impl_i64_newtype!(OrderId, "OrderId");
impl_i64_newtype!(CatalogEntryId, "CatalogEntryId");
