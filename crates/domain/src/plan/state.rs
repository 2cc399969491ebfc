//! Production plan status machine.

use serde::{Deserialize, Serialize};

/// The status of a production plan in its review lifecycle.
///
/// State transitions:
/// ```text
/// Draft ──► Submitted ──┬──► Approved ──┬──► Finalized
///                       │               │
///                       └───────────────┴──► Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlanStatus {
    /// Plan is being assembled; name and items may change.
    #[default]
    Draft,

    /// Plan awaits review by a production manager.
    Submitted,

    /// Plan is approved and its items may be scheduled.
    Approved,

    /// Plan was rejected (terminal state).
    Rejected,

    /// Plan and its schedule are locked (terminal state).
    Finalized,
}

impl PlanStatus {
    /// Returns true if name and items can be edited in this state.
    pub fn can_edit(&self) -> bool {
        matches!(self, PlanStatus::Draft)
    }

    /// Returns true if the plan can be deleted in this state.
    pub fn can_delete(&self) -> bool {
        matches!(self, PlanStatus::Draft)
    }

    /// Returns true if the plan can be submitted for review in this state.
    pub fn can_submit(&self) -> bool {
        matches!(self, PlanStatus::Draft)
    }

    /// Returns true if the plan can be approved in this state.
    pub fn can_approve(&self) -> bool {
        matches!(self, PlanStatus::Submitted)
    }

    /// Returns true if the plan can be rejected in this state.
    pub fn can_reject(&self) -> bool {
        matches!(self, PlanStatus::Submitted | PlanStatus::Approved)
    }

    /// Returns true if the plan can be finalized in this state.
    pub fn can_finalize(&self) -> bool {
        matches!(self, PlanStatus::Approved)
    }

    /// Returns true if schedule items may be added to or removed from the plan.
    pub fn can_schedule(&self) -> bool {
        matches!(self, PlanStatus::Approved)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Rejected | PlanStatus::Finalized)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "Draft",
            PlanStatus::Submitted => "Submitted",
            PlanStatus::Approved => "Approved",
            PlanStatus::Rejected => "Rejected",
            PlanStatus::Finalized => "Finalized",
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
