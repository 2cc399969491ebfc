//! Demand domain events.

use chrono::NaiveDate;
use common::PlanId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events that can occur on a demand record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DemandEvent {
    /// Draft fields were edited.
    DemandUpdated(DemandUpdatedData),

    /// Demand was submitted for approval.
    DemandSubmitted,

    /// Demand was approved.
    DemandApproved,

    /// Demand was rejected.
    DemandRejected,

    /// Demand was pooled into a plan.
    AssignedToPlan { plan_id: PlanId },

    /// Demand was returned to the pool.
    ReleasedFromPlan,
}

impl DomainEvent for DemandEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DemandEvent::DemandUpdated(_) => "DemandUpdated",
            DemandEvent::DemandSubmitted => "DemandSubmitted",
            DemandEvent::DemandApproved => "DemandApproved",
            DemandEvent::DemandRejected => "DemandRejected",
            DemandEvent::AssignedToPlan { .. } => "AssignedToPlan",
            DemandEvent::ReleasedFromPlan => "ReleasedFromPlan",
        }
    }

    // Allocation is tracked on the plan side; it does not edit the demand.
    fn is_mutation(&self) -> bool {
        !matches!(
            self,
            DemandEvent::AssignedToPlan { .. } | DemandEvent::ReleasedFromPlan
        )
    }
}

/// Data for the DemandUpdated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandUpdatedData {
    pub sku: String,
    pub quantity: u32,
    pub date: NaiveDate,

    /// Field-level changes, in field order.
    pub changes: Vec<FieldChange>,
}

/// A single field edit, recorded for traceability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

impl FieldChange {
    pub fn new(field: &str, old: impl ToString, new: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            old: old.to_string(),
            new: new.to_string(),
        }
    }
}

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} from {} to {}", self.field, self.old, self.new)
    }
}
