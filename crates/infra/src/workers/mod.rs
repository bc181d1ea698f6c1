//! Background workers.

mod arrival_worker;

pub use arrival_worker::{ArrivalWorker, ArrivalWorkerHandle};
