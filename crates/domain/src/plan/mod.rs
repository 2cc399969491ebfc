//! Production plans and their review lifecycle.

mod aggregate;
mod events;
mod service;
mod state;

pub use aggregate::{PlanItem, ProductionPlan};
pub use events::PlanEvent;
pub use service::PlanService;
pub use state::PlanStatus;
