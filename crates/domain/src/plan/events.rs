//! Production plan domain events.

use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::PlanItem;

/// Events that can occur on a production plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PlanEvent {
    /// Name or items of a draft plan were edited.
    PlanUpdated { name: String, items: Vec<PlanItem> },

    /// Plan was submitted for review.
    PlanSubmitted,

    /// Plan was approved by a reviewer.
    PlanApproved { reviewed_by: String },

    /// Plan was rejected with a reason.
    PlanRejected { reason: String, reviewed_by: String },

    /// Plan was finalized and locked.
    PlanFinalized { final_approved_by: String },
}

impl DomainEvent for PlanEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PlanEvent::PlanUpdated { .. } => "PlanUpdated",
            PlanEvent::PlanSubmitted => "PlanSubmitted",
            PlanEvent::PlanApproved { .. } => "PlanApproved",
            PlanEvent::PlanRejected { .. } => "PlanRejected",
            PlanEvent::PlanFinalized { .. } => "PlanFinalized",
        }
    }
}
