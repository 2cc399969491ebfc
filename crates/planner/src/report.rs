//! Run output assembled from the planning snapshot.

use chrono::NaiveDate;
use domain::{AuditEntry, Notification, PlanningContext, ProductionLine};
use projections::{CapacityOverview, DailySchedule, ProductionReport, ReadModel, ReportFilter};
use serde::Serialize;

use crate::error::AppError;

/// Everything a planner run prints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub lines: Vec<ProductionLine>,
    pub capacity: CapacityOverview,
    pub todays_schedule: DailySchedule,
    pub production: ProductionReport,
    pub audit_trail: Vec<AuditEntry>,
    pub notifications: Vec<Notification>,
}

impl RunReport {
    /// Builds all report views from one snapshot of `ctx`.
    pub fn build(
        ctx: &PlanningContext,
        window_start: NaiveDate,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        let snapshot = ctx.snapshot();
        let capacity = CapacityOverview::from_snapshot(&snapshot, window_start, window_days);
        let todays_schedule = DailySchedule::for_date(&snapshot, today);
        let production = ProductionReport::build(&snapshot, &ReportFilter::default())?;

        for view in [
            &capacity as &dyn ReadModel,
            &todays_schedule,
            &production,
        ] {
            tracing::debug!(view = view.name(), rows = view.count(), "report view built");
        }
        if let Some(peak) = capacity.peak() {
            tracing::info!(
                date = %peak.date,
                utilization = peak.utilization,
                overloaded = capacity.overloaded_days().count(),
                "capacity window computed"
            );
        }

        Ok(Self {
            lines: snapshot.lines.all().to_vec(),
            capacity,
            todays_schedule,
            production,
            audit_trail: Vec::new(),
            notifications: Vec::new(),
        })
    }
}
