//! Demand records and the demand pool.

mod aggregate;
mod events;
mod pool;
mod state;

pub use aggregate::{Demand, NewDemand};
pub use events::{DemandEvent, DemandUpdatedData, FieldChange};
pub use pool::DemandPool;
pub use state::DemandStatus;
