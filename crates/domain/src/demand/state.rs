//! Demand status machine.

use serde::{Deserialize, Serialize};

/// The status of a demand record.
///
/// State transitions:
/// ```text
/// Draft ──► Submitted ──┬──► Approved
///                       └──► Rejected
/// ```
///
/// Only approved demand that is not yet assigned to a plan may be pooled
/// into a new production plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DemandStatus {
    /// Demand is being entered and may be edited or deleted.
    #[default]
    Draft,

    /// Demand awaits approval.
    Submitted,

    /// Demand is approved and may be planned.
    Approved,

    /// Demand was rejected (terminal state).
    Rejected,
}

impl DemandStatus {
    /// Returns true if the demand can be edited in this state.
    pub fn can_edit(&self) -> bool {
        matches!(self, DemandStatus::Draft)
    }

    /// Returns true if the demand can be deleted in this state.
    pub fn can_delete(&self) -> bool {
        matches!(self, DemandStatus::Draft)
    }

    /// Returns true if the demand can be submitted in this state.
    pub fn can_submit(&self) -> bool {
        matches!(self, DemandStatus::Draft)
    }

    /// Returns true if the demand can be approved or rejected in this state.
    pub fn can_review(&self) -> bool {
        matches!(self, DemandStatus::Submitted)
    }

    /// Returns true if the demand can be assigned to a plan in this state.
    pub fn can_plan(&self) -> bool {
        matches!(self, DemandStatus::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DemandStatus::Draft => "Draft",
            DemandStatus::Submitted => "Submitted",
            DemandStatus::Approved => "Approved",
            DemandStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
