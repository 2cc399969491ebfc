//! Daily schedule read model: what each line runs on a given date.

use chrono::NaiveDate;
use common::{LineId, ScheduleItemId};
use domain::PlanningSnapshot;
use serde::{Deserialize, Serialize};

use crate::read_model::ReadModel;

/// A schedule item as shown on the shop floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledRun {
    pub schedule_item_id: ScheduleItemId,
    pub line_id: LineId,
    pub line_name: String,
    pub sku: String,
    pub quantity: u32,
    /// True once any production update was logged against the item.
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub runs: Vec<ScheduledRun>,
}

impl DailySchedule {
    /// Lists the schedule items on `date`, ordered by line name.
    pub fn for_date(snapshot: &PlanningSnapshot, date: NaiveDate) -> Self {
        let mut runs: Vec<ScheduledRun> = snapshot
            .schedule
            .iter()
            .filter(|item| item.date == date)
            .map(|item| ScheduledRun {
                schedule_item_id: item.id.clone(),
                line_id: item.line_id.clone(),
                line_name: snapshot
                    .lines
                    .find(&item.line_id)
                    .map_or_else(|| "Unknown Line".to_string(), |line| line.name.clone()),
                sku: item.sku.clone(),
                quantity: item.quantity,
                completed: snapshot
                    .updates
                    .iter()
                    .any(|update| update.schedule_item_id == item.id),
            })
            .collect();
        runs.sort_by(|a, b| a.line_name.cmp(&b.line_name));

        Self { date, runs }
    }

    /// Returns the runs still waiting for a production update.
    pub fn pending(&self) -> impl Iterator<Item = &ScheduledRun> {
        self.runs.iter().filter(|run| !run.completed)
    }
}

impl ReadModel for DailySchedule {
    fn name(&self) -> &'static str {
        "DailySchedule"
    }

    fn count(&self) -> usize {
        self.runs.len()
    }
}
