//! Shared types used across the production planning crates.
//!
//! - Typed identifiers for every record kind ([`DemandId`], [`PlanId`], ...)
//! - [`Version`] counter for optimistic concurrency on mutable records
//! - [`Actor`] and [`Role`] describing the caller of a mutating operation

mod identity;
mod types;

pub use identity::{Actor, Role};
pub use types::{
    DemandId, LineId, PlanId, PlanItemId, ProductionUpdateId, ScheduleItemId, Version,
};
