//! `stockroom-core`: shared building blocks for the stock-consistency service.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error taxonomy, non-negative value objects and the clock
//! abstraction used by the arrival scheduler.

pub mod clock;
pub mod error;
pub mod id;
pub mod value_object;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StockError, StockResult};
pub use id::{
    CatalogEntryId, EmployeeId, OrderId, ProductId, RestockId, ShelfId, SupplierId, UserId,
};
pub use value_object::{Money, Quantity, ValueObject};
