//! Schedule items and scheduling requests.

use chrono::NaiveDate;
use common::{LineId, PlanId, PlanItemId, ScheduleItemId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::plan::PlanItem;

use super::ProductionLine;

/// A plan item's quantity assigned to a line and date.
///
/// `override_reason` is set exactly when the item was admitted beyond the
/// line's remaining capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: ScheduleItemId,
    pub plan_id: PlanId,
    pub plan_item_id: PlanItemId,
    pub sku: String,
    pub quantity: u32,
    pub date: NaiveDate,
    pub line_id: LineId,
    pub override_reason: Option<String>,
}

impl ScheduleItem {
    /// Returns true if the item was admitted over capacity.
    pub fn is_override(&self) -> bool {
        self.override_reason.is_some()
    }
}

/// Request to place a quantity of a plan item on a line and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub plan_id: PlanId,
    pub plan_item_id: PlanItemId,
    pub sku: String,
    pub quantity: u32,
    pub date: NaiveDate,
    pub line_id: LineId,
    pub override_reason: Option<String>,
}

impl ScheduleRequest {
    /// Requests the full quantity of `item` on its own date.
    pub fn for_item(plan_id: &PlanId, item: &PlanItem, line_id: impl Into<LineId>) -> Self {
        Self {
            plan_id: plan_id.clone(),
            plan_item_id: item.id.clone(),
            sku: item.sku.clone(),
            quantity: item.quantity,
            date: item.date,
            line_id: line_id.into(),
            override_reason: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Attaches a capacity override reason.
    pub fn with_override(mut self, reason: impl Into<String>) -> Self {
        self.override_reason = Some(reason.into());
        self
    }

    /// Returns the override reason if it is present and not blank.
    pub(crate) fn override_reason(&self) -> Option<&str> {
        self.override_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
    }
}

/// Outcome of a capacity check that would overrun a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityConflict {
    pub line: ProductionLine,
    pub current_usage: u64,
    pub projected: u64,
    pub overage: u64,
}

impl From<CapacityConflict> for DomainError {
    fn from(conflict: CapacityConflict) -> Self {
        DomainError::CapacityExceeded {
            line_id: conflict.line.id,
            line_name: conflict.line.name,
            capacity: u64::from(conflict.line.daily_capacity),
            projected: conflict.projected,
            overage: conflict.overage,
        }
    }
}
