//! Production lines and capacity scheduling.

mod item;
mod line;
mod scheduler;

pub use item::{CapacityConflict, ScheduleItem, ScheduleRequest};
pub use line::{LineRegistry, ProductionLine};
pub(crate) use scheduler::sort_items;
pub use scheduler::CapacityScheduler;
