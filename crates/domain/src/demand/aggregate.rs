//! Demand record.

use chrono::{DateTime, NaiveDate, Utc};
use common::{DemandId, PlanId, Version};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::error::{DomainError, Result, require_non_blank, require_positive};

use super::events::{DemandUpdatedData, FieldChange};
use super::{DemandEvent, DemandStatus};

/// Fields supplied when entering a new demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDemand {
    pub sku: String,
    pub quantity: u32,
    pub date: NaiveDate,
}

impl NewDemand {
    pub fn new(sku: impl Into<String>, quantity: u32, date: NaiveDate) -> Self {
        Self {
            sku: sku.into(),
            quantity,
            date,
        }
    }
}

/// A requested quantity of a SKU for a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub id: DemandId,
    pub sku: String,
    pub quantity: u32,
    pub date: NaiveDate,
    pub status: DemandStatus,
    pub version: Version,
    pub submitted_by: String,
    pub last_modified: DateTime<Utc>,
    pub plan_id: Option<PlanId>,
}

impl Aggregate for Demand {
    type Event = DemandEvent;

    fn aggregate_type() -> &'static str {
        "Demand"
    }

    fn version(&self) -> Version {
        self.version
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.version = self.version.next();
        self.last_modified = at;
    }

    fn apply_change(&mut self, event: &DemandEvent) {
        match event {
            DemandEvent::DemandUpdated(data) => {
                self.sku = data.sku.clone();
                self.quantity = data.quantity;
                self.date = data.date;
            }
            DemandEvent::DemandSubmitted => self.status = DemandStatus::Submitted,
            DemandEvent::DemandApproved => self.status = DemandStatus::Approved,
            DemandEvent::DemandRejected => self.status = DemandStatus::Rejected,
            DemandEvent::AssignedToPlan { plan_id } => self.plan_id = Some(plan_id.clone()),
            DemandEvent::ReleasedFromPlan => self.plan_id = None,
        }
    }
}

// Query methods
impl Demand {
    /// Returns true if the demand may be pooled into a new plan.
    pub fn is_available(&self) -> bool {
        self.status.can_plan() && self.plan_id.is_none()
    }
}

// Command methods (return events)
impl Demand {
    /// Creates a new draft demand.
    pub(crate) fn create(
        id: DemandId,
        fields: NewDemand,
        submitted_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Self> {
        require_non_blank("sku", &fields.sku)?;
        require_positive("quantity", fields.quantity)?;

        Ok(Self {
            id,
            sku: fields.sku,
            quantity: fields.quantity,
            date: fields.date,
            status: DemandStatus::Draft,
            version: Version::first(),
            submitted_by: submitted_by.to_string(),
            last_modified: at,
            plan_id: None,
        })
    }

    /// Edits the draft fields from a caller-modified copy of the record.
    ///
    /// Only `sku`, `quantity` and `date` are taken from `edited`.
    pub fn update(&self, edited: &Demand) -> Result<Vec<DemandEvent>> {
        self.ensure_status(self.status.can_edit(), "update")?;

        if edited.version != self.version {
            return Err(DomainError::ConcurrencyConflict {
                entity: Self::aggregate_type(),
                id: self.id.to_string(),
                expected: edited.version,
                actual: self.version,
            });
        }

        require_non_blank("sku", &edited.sku)?;
        require_positive("quantity", edited.quantity)?;

        let mut changes = Vec::new();
        if edited.sku != self.sku {
            changes.push(FieldChange::new("sku", &self.sku, &edited.sku));
        }
        if edited.quantity != self.quantity {
            changes.push(FieldChange::new("quantity", self.quantity, edited.quantity));
        }
        if edited.date != self.date {
            changes.push(FieldChange::new("date", self.date, edited.date));
        }

        Ok(vec![DemandEvent::DemandUpdated(DemandUpdatedData {
            sku: edited.sku.clone(),
            quantity: edited.quantity,
            date: edited.date,
            changes,
        })])
    }

    /// Fails unless the demand may be deleted.
    pub fn ensure_deletable(&self) -> Result<()> {
        self.ensure_status(self.status.can_delete(), "delete")
    }

    /// Submits the demand for approval.
    pub fn submit(&self) -> Result<Vec<DemandEvent>> {
        self.ensure_status(self.status.can_submit(), "submit")?;
        Ok(vec![DemandEvent::DemandSubmitted])
    }

    /// Approves a submitted demand.
    pub fn approve(&self) -> Result<Vec<DemandEvent>> {
        self.ensure_status(self.status.can_review(), "approve")?;
        Ok(vec![DemandEvent::DemandApproved])
    }

    /// Rejects a submitted demand.
    pub fn reject(&self) -> Result<Vec<DemandEvent>> {
        self.ensure_status(self.status.can_review(), "reject")?;
        Ok(vec![DemandEvent::DemandRejected])
    }

    /// Pools the demand into `plan_id`.
    ///
    /// Re-assigning to the plan that already holds the demand is allowed.
    pub fn assign_to(&self, plan_id: &PlanId) -> Result<Vec<DemandEvent>> {
        self.ensure_status(self.status.can_plan(), "assign")?;

        match &self.plan_id {
            Some(current) if current != plan_id => Err(DomainError::invalid_state(
                Self::aggregate_type(),
                &self.id,
                format!("{} (assigned to plan {current})", self.status),
                "assign",
            )),
            _ => Ok(vec![DemandEvent::AssignedToPlan {
                plan_id: plan_id.clone(),
            }]),
        }
    }

    /// Returns the demand to the pool.
    pub fn release(&self) -> Vec<DemandEvent> {
        if self.plan_id.is_some() {
            vec![DemandEvent::ReleasedFromPlan]
        } else {
            vec![]
        }
    }

    fn ensure_status(&self, allowed: bool, action: &'static str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(DomainError::invalid_state(
                Self::aggregate_type(),
                &self.id,
                self.status,
                action,
            ))
        }
    }
}
