//! Sales domain: customer order requests, price snapshots and order totals.
//!
//! Pure domain logic; the order service in `stockroom-infra` drives it while
//! holding the catalog row locks.

pub mod order;

pub use order::{
    NewOrder, Order, OrderDraft, OrderItem, OrderLine, OrderRequest, OrderStatus, PricedLine,
};
