//! Production report read model: planned versus produced output of
//! finalized plans.

use chrono::NaiveDate;
use common::ScheduleItemId;
use domain::{PlanStatus, PlanningSnapshot, ProductionUpdate};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::read_model::ReadModel;

/// One schedule item of a finalized plan with its reported output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub schedule_item_id: ScheduleItemId,
    pub date: NaiveDate,
    pub sku: String,
    pub plan_name: String,
    pub line_name: String,
    pub planned_qty: u32,
    pub produced_qty: u32,
    pub scrap: u32,
    /// Produced minus planned; negative when short.
    pub variance: i64,
}

/// Row filter. Dates are inclusive; the SKU filter is a case-insensitive
/// substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sku: Option<String>,
}

impl ReportFilter {
    pub fn since(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    fn validate(&self) -> Result<()> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => {
                Err(ReportError::InvalidRange { start, end })
            }
            _ => Ok(()),
        }
    }

    fn matches(&self, row: &ReportRow) -> bool {
        let after_start = self.start_date.is_none_or(|start| row.date >= start);
        let before_end = self.end_date.is_none_or(|end| row.date <= end);
        let sku = match self.sku.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => row
                .sku
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        };
        after_start && before_end && sku
    }
}

/// Production variance report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionReport {
    pub rows: Vec<ReportRow>,
}

impl ProductionReport {
    /// Builds the report for schedule items of finalized plans.
    ///
    /// Items without a production update count as nothing produced. When an
    /// item has several updates the most recent one is used.
    pub fn build(snapshot: &PlanningSnapshot, filter: &ReportFilter) -> Result<Self> {
        filter.validate()?;

        let mut rows: Vec<ReportRow> = snapshot
            .schedule
            .iter()
            .filter_map(|item| {
                let plan = snapshot
                    .plan(&item.plan_id)
                    .filter(|plan| plan.status == PlanStatus::Finalized)?;
                let update = latest_update(&snapshot.updates, &item.id);
                let produced_qty = update.map_or(0, |update| update.quantity_produced);
                let line_name = snapshot
                    .lines
                    .find(&item.line_id)
                    .map_or("Unknown Line", |line| line.name.as_str());

                Some(ReportRow {
                    schedule_item_id: item.id.clone(),
                    date: item.date,
                    sku: item.sku.clone(),
                    plan_name: plan.name.clone(),
                    line_name: line_name.to_string(),
                    planned_qty: item.quantity,
                    produced_qty,
                    scrap: update.map_or(0, |update| update.scrap),
                    variance: i64::from(produced_qty) - i64::from(item.quantity),
                })
            })
            .filter(|row| filter.matches(row))
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));

        Ok(Self { rows })
    }

    pub fn total_planned(&self) -> u64 {
        self.rows.iter().map(|row| u64::from(row.planned_qty)).sum()
    }

    pub fn total_produced(&self) -> u64 {
        self.rows.iter().map(|row| u64::from(row.produced_qty)).sum()
    }

    pub fn total_scrap(&self) -> u64 {
        self.rows.iter().map(|row| u64::from(row.scrap)).sum()
    }

    pub fn total_variance(&self) -> i64 {
        self.rows.iter().map(|row| row.variance).sum()
    }
}

impl ReadModel for ProductionReport {
    fn name(&self) -> &'static str {
        "ProductionReport"
    }

    fn count(&self) -> usize {
        self.rows.len()
    }
}

fn latest_update<'a>(
    updates: &'a [ProductionUpdate],
    id: &ScheduleItemId,
) -> Option<&'a ProductionUpdate> {
    updates
        .iter()
        .rev()
        .find(|update| &update.schedule_item_id == id)
}
