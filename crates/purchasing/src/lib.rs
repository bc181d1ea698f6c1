//! Purchasing domain: restock orders placed with suppliers and their arrival
//! state machine (`Ordered` → `Arrived`).

pub mod reference;
pub mod restock;

pub use reference::{Employee, Supplier};
pub use restock::{
    Arrival, NewRestock, RestockOrder, RestockRequest, RestockStatus, RestockView,
};
