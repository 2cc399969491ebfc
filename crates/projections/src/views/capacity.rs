//! Capacity window read model: daily utilization across all lines.

use chrono::NaiveDate;
use domain::{LineRegistry, PlanStatus, PlanningSnapshot, ProductionPlan, ScheduleItem};
use serde::{Deserialize, Serialize};

use crate::read_model::ReadModel;

/// Load against total line capacity for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCapacity {
    pub date: NaiveDate,
    pub total_capacity: u64,
    /// Units already placed on a line for this date.
    pub scheduled_qty: u64,
    /// Units in plans awaiting review, dated this day.
    pub submitted_qty: u64,
    pub total_demand: u64,
    /// Percentage of total capacity, rounded to one decimal.
    pub utilization: f64,
    pub is_overloaded: bool,
}

/// Computes daily utilization for `num_days` dates starting at `start`.
///
/// Returns an empty window when the lines have no capacity at all.
pub fn aggregate_window(
    lines: &LineRegistry,
    schedule: &[ScheduleItem],
    plans: &[ProductionPlan],
    start: NaiveDate,
    num_days: u32,
) -> Vec<DailyCapacity> {
    let total_capacity = lines.total_capacity();
    if total_capacity == 0 {
        return Vec::new();
    }

    start
        .iter_days()
        .take(num_days as usize)
        .map(|date| {
            let scheduled_qty: u64 = schedule
                .iter()
                .filter(|item| item.date == date)
                .map(|item| u64::from(item.quantity))
                .sum();
            let submitted_qty: u64 = plans
                .iter()
                .filter(|plan| plan.status == PlanStatus::Submitted)
                .flat_map(|plan| &plan.items)
                .filter(|item| item.date == date)
                .map(|item| u64::from(item.quantity))
                .sum();
            let total_demand = scheduled_qty + submitted_qty;

            DailyCapacity {
                date,
                total_capacity,
                scheduled_qty,
                submitted_qty,
                total_demand,
                utilization: utilization(total_demand, total_capacity),
                is_overloaded: total_demand > total_capacity,
            }
        })
        .collect()
}

fn utilization(demand: u64, capacity: u64) -> f64 {
    (demand as f64 / capacity as f64 * 1000.0).round() / 10.0
}

/// Rolling-window capacity overview built from a planning snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityOverview {
    pub start: NaiveDate,
    pub days: Vec<DailyCapacity>,
}

impl CapacityOverview {
    pub fn from_snapshot(snapshot: &PlanningSnapshot, start: NaiveDate, num_days: u32) -> Self {
        Self {
            start,
            days: aggregate_window(
                &snapshot.lines,
                &snapshot.schedule,
                &snapshot.plans,
                start,
                num_days,
            ),
        }
    }

    /// Returns the dates whose demand exceeds total capacity.
    pub fn overloaded_days(&self) -> impl Iterator<Item = &DailyCapacity> {
        self.days.iter().filter(|day| day.is_overloaded)
    }

    /// Returns the day with the highest utilization, earliest on ties.
    pub fn peak(&self) -> Option<&DailyCapacity> {
        self.days.iter().reduce(|peak, day| {
            if day.utilization > peak.utilization {
                day
            } else {
                peak
            }
        })
    }
}

impl ReadModel for CapacityOverview {
    fn name(&self) -> &'static str {
        "CapacityOverview"
    }

    fn count(&self) -> usize {
        self.days.len()
    }
}
