//! Read side of the planning system.
//!
//! This crate derives report views from a [`domain::PlanningSnapshot`]:
//! - [`CapacityOverview`] for rolling-window utilization across all lines
//! - [`ProductionReport`] for planned versus produced output of finalized plans
//! - [`DailySchedule`] for the runs each line has on a date
//!
//! Views are pure functions of the snapshot and are recomputed on demand.

pub mod error;
pub mod read_model;
pub mod views;

pub use error::{ReportError, Result};
pub use read_model::ReadModel;
pub use views::{
    CapacityOverview, DailyCapacity, DailySchedule, ProductionReport, ReportFilter, ReportRow,
    ScheduledRun, aggregate_window,
};
