//! Command-line runner for the planning core.
//!
//! A run wires a [`domain::PlanningContext`] from configuration, optionally
//! loads the reference scenario and prints the report views as JSON.

pub mod config;
pub mod error;
pub mod observability;
pub mod report;
pub mod seed;

use std::sync::Arc;

use chrono::NaiveDate;
use domain::{Effects, InMemoryAuditLog, InMemoryNotifications, PlanningContext};

pub use config::{Config, ConfigError, LogFormat};
pub use error::AppError;
pub use report::RunReport;

/// Builds a context from `config`, seeds it if requested and reports on it.
#[tracing::instrument(skip(config), fields(seed = config.seed, window_days = config.window_days))]
pub fn run(config: &Config, today: NaiveDate) -> Result<RunReport, AppError> {
    let audit = InMemoryAuditLog::new();
    let notifications = InMemoryNotifications::new();
    let effects = Effects::new(Arc::new(audit.clone()), Arc::new(notifications.clone()));
    let ctx = PlanningContext::new(config.load_lines()?, effects);
    tracing::info!(lines = ctx.lines().len(), "planning context ready");

    if config.seed {
        seed::reference_scenario(&ctx, today)?;
    }

    let mut report = RunReport::build(
        &ctx,
        config.window_start(today),
        config.window_days,
        today,
    )?;
    report.audit_trail = audit.entries();
    report.notifications = notifications.active();
    Ok(report)
}
