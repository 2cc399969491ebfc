//! Report views built from a planning snapshot.

mod capacity;
mod daily_schedule;
mod production_report;

pub use capacity::{CapacityOverview, DailyCapacity, aggregate_window};
pub use daily_schedule::{DailySchedule, ScheduledRun};
pub use production_report::{ProductionReport, ReportFilter, ReportRow};
