//! Production plan aggregate.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use common::{PlanId, PlanItemId, Version};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::demand::Demand;
use crate::error::{DomainError, Result, require_non_blank, require_positive};

use super::{PlanEvent, PlanStatus};

/// A line item of a plan, copied from the demand it was built from.
///
/// The item id is the source demand's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    pub id: PlanItemId,
    pub sku: String,
    pub quantity: u32,
    pub date: NaiveDate,
}

impl PlanItem {
    pub fn from_demand(demand: &Demand) -> Self {
        Self {
            id: demand.id.clone(),
            sku: demand.sku.clone(),
            quantity: demand.quantity,
            date: demand.date,
        }
    }
}

/// A bundle of demand items moving through review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlan {
    pub id: PlanId,
    pub name: String,
    pub status: PlanStatus,
    pub items: Vec<PlanItem>,
    pub version: Version,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub final_approved_by: Option<String>,
}

impl Aggregate for ProductionPlan {
    type Event = PlanEvent;

    fn aggregate_type() -> &'static str {
        "ProductionPlan"
    }

    fn version(&self) -> Version {
        self.version
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.version = self.version.next();
        self.last_modified = at;
    }

    fn apply_change(&mut self, event: &PlanEvent) {
        match event {
            PlanEvent::PlanUpdated { name, items } => {
                self.name = name.clone();
                self.items = items.clone();
            }
            PlanEvent::PlanSubmitted => self.status = PlanStatus::Submitted,
            PlanEvent::PlanApproved { reviewed_by } => {
                self.status = PlanStatus::Approved;
                self.reviewed_by = Some(reviewed_by.clone());
            }
            PlanEvent::PlanRejected {
                reason,
                reviewed_by,
            } => {
                self.status = PlanStatus::Rejected;
                self.rejection_reason = Some(reason.clone());
                self.reviewed_by = Some(reviewed_by.clone());
            }
            PlanEvent::PlanFinalized { final_approved_by } => {
                self.status = PlanStatus::Finalized;
                self.final_approved_by = Some(final_approved_by.clone());
            }
        }
    }
}

// Query methods
impl ProductionPlan {
    /// Returns the item with the given id.
    pub fn item(&self, id: &PlanItemId) -> Option<&PlanItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns the ids of all items, in item order.
    pub fn item_ids(&self) -> Vec<PlanItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    /// Returns the sum of all item quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

// Command methods (return events)
impl ProductionPlan {
    /// Creates a new draft plan holding one item per demand.
    pub(crate) fn create(
        id: PlanId,
        name: &str,
        demands: &[Demand],
        created_by: &str,
        at: DateTime<Utc>,
    ) -> Result<Self> {
        require_non_blank("name", name)?;
        let items: Vec<PlanItem> = demands.iter().map(PlanItem::from_demand).collect();
        validate_items(&items)?;

        Ok(Self {
            id,
            name: name.to_string(),
            status: PlanStatus::Draft,
            items,
            version: Version::first(),
            created_by: created_by.to_string(),
            created_at: at,
            last_modified: at,
            reviewed_by: None,
            rejection_reason: None,
            final_approved_by: None,
        })
    }

    /// Edits name and items from a caller-modified copy of the plan.
    ///
    /// Items already in the plan take only `quantity` and `date` from
    /// `edited`; their SKU may not change. Items new to the plan are copied
    /// from the demand `source` returns for their id. Status, reviewers and
    /// timestamps on `edited` are ignored.
    pub fn update(
        &self,
        edited: &ProductionPlan,
        source: impl Fn(&PlanItemId) -> Option<Demand>,
    ) -> Result<Vec<PlanEvent>> {
        self.ensure_status(self.status.can_edit(), "update")?;

        if edited.version != self.version {
            return Err(DomainError::ConcurrencyConflict {
                entity: Self::aggregate_type(),
                id: self.id.to_string(),
                expected: edited.version,
                actual: self.version,
            });
        }

        require_non_blank("name", &edited.name)?;

        let mut items = Vec::with_capacity(edited.items.len());
        for item in &edited.items {
            match self.item(&item.id) {
                Some(current) if current.sku != item.sku => {
                    return Err(DomainError::validation(
                        "sku",
                        format!(
                            "item {} is for SKU {}, not {}",
                            item.id, current.sku, item.sku
                        ),
                    ));
                }
                Some(_) => items.push(item.clone()),
                None => {
                    let demand = source(&item.id).ok_or_else(|| {
                        DomainError::not_found(Demand::aggregate_type(), &item.id)
                    })?;
                    items.push(PlanItem::from_demand(&demand));
                }
            }
        }
        validate_items(&items)?;

        Ok(vec![PlanEvent::PlanUpdated {
            name: edited.name.clone(),
            items,
        }])
    }

    /// Fails unless the plan may be deleted.
    pub fn ensure_deletable(&self) -> Result<()> {
        self.ensure_status(self.status.can_delete(), "delete")
    }

    /// Submits the plan for review.
    pub fn submit(&self) -> Result<Vec<PlanEvent>> {
        self.ensure_status(self.status.can_submit(), "submit")?;
        Ok(vec![PlanEvent::PlanSubmitted])
    }

    /// Approves a submitted plan.
    pub fn approve(&self, reviewed_by: &str) -> Result<Vec<PlanEvent>> {
        self.ensure_status(self.status.can_approve(), "approve")?;
        Ok(vec![PlanEvent::PlanApproved {
            reviewed_by: reviewed_by.to_string(),
        }])
    }

    /// Rejects a submitted or approved plan.
    pub fn reject(&self, reason: &str, reviewed_by: &str) -> Result<Vec<PlanEvent>> {
        self.ensure_status(self.status.can_reject(), "reject")?;
        require_non_blank("rejection reason", reason)?;
        Ok(vec![PlanEvent::PlanRejected {
            reason: reason.trim().to_string(),
            reviewed_by: reviewed_by.to_string(),
        }])
    }

    /// Finalizes an approved plan, locking it and its schedule.
    pub fn finalize(&self, final_approved_by: &str) -> Result<Vec<PlanEvent>> {
        self.ensure_status(self.status.can_finalize(), "finalize")?;
        Ok(vec![PlanEvent::PlanFinalized {
            final_approved_by: final_approved_by.to_string(),
        }])
    }

    pub(crate) fn ensure_status(&self, allowed: bool, action: &'static str) -> Result<()> {
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

fn validate_items(items: &[PlanItem]) -> Result<()> {
    if items.is_empty() {
        return Err(DomainError::validation(
            "items",
            "a plan needs at least one demand item",
        ));
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        require_positive("quantity", item.quantity)?;
        if !seen.insert(&item.id) {
            return Err(DomainError::validation(
                "items",
                format!("demand {} appears more than once", item.id),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::DemandStatus;
    use crate::error::ErrorKind;
    use common::DemandId;

    fn demand(id: &str, quantity: u32) -> Demand {
        Demand {
            id: DemandId::new(id),
            sku: format!("SKU-{id}"),
            quantity,
            date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            status: DemandStatus::Approved,
            version: Version::new(3),
            submitted_by: "Pat Planner".to_string(),
            last_modified: Utc::now(),
            plan_id: None,
        }
    }

    fn draft() -> ProductionPlan {
        ProductionPlan::create(
            PlanId::new("pp1"),
            "Week 32",
            &[demand("d1", 100), demand("d2", 250)],
            "Pat Planner",
            Utc::now(),
        )
        .unwrap()
    }

    fn no_source(_: &PlanItemId) -> Option<Demand> {
        None
    }

    fn with_status(status: PlanStatus) -> ProductionPlan {
        ProductionPlan { status, ..draft() }
    }

    #[test]
    fn test_create_copies_demand_fields() {
        let plan = draft();
        assert_eq!(plan.status, PlanStatus::Draft);
        assert_eq!(plan.version, Version::first());
        assert_eq!(plan.item_ids(), vec![DemandId::new("d1"), DemandId::new("d2")]);
        assert_eq!(plan.item(&DemandId::new("d2")).unwrap().quantity, 250);
        assert_eq!(plan.total_quantity(), 350);
        assert_eq!(plan.created_at, plan.last_modified);
    }

    #[test]
    fn test_create_validation() {
        let now = Utc::now();
        let empty = ProductionPlan::create(PlanId::new("p"), "Empty", &[], "Pat", now);
        assert_eq!(empty.unwrap_err().kind(), ErrorKind::Validation);

        let blank = ProductionPlan::create(PlanId::new("p"), "  ", &[demand("d1", 1)], "Pat", now);
        assert_eq!(blank.unwrap_err().kind(), ErrorKind::Validation);

        let dup = ProductionPlan::create(
            PlanId::new("p"),
            "Dup",
            &[demand("d1", 1), demand("d1", 1)],
            "Pat",
            now,
        );
        assert_eq!(dup.unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_full_approval_path_bumps_version_per_step() {
        let mut plan = draft();
        let now = Utc::now();

        plan.apply_events(&plan.submit().unwrap(), now);
        plan.apply_events(&plan.approve("Mary Manager").unwrap(), now);
        plan.apply_events(&plan.finalize("Olga Ops").unwrap(), now);

        assert_eq!(plan.status, PlanStatus::Finalized);
        assert_eq!(plan.version, Version::new(4));
        assert_eq!(plan.reviewed_by.as_deref(), Some("Mary Manager"));
        assert_eq!(plan.final_approved_by.as_deref(), Some("Olga Ops"));
    }

    #[test]
    fn test_finalize_requires_approval() {
        let err = with_status(PlanStatus::Submitted)
            .finalize("Olga Ops")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_reject_checks_state_before_reason() {
        let err = draft().reject("", "Mary").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err = with_status(PlanStatus::Submitted)
            .reject("   ", "Mary")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_reject_from_approved_records_reason() {
        let mut plan = with_status(PlanStatus::Approved);
        plan.apply_events(&plan.reject("line down", "Mary").unwrap(), Utc::now());
        assert_eq!(plan.status, PlanStatus::Rejected);
        assert_eq!(plan.rejection_reason.as_deref(), Some("line down"));
    }

    #[test]
    fn test_update_only_in_draft() {
        for status in [
            PlanStatus::Submitted,
            PlanStatus::Approved,
            PlanStatus::Rejected,
            PlanStatus::Finalized,
        ] {
            let plan = with_status(status);
            let mut edited = plan.clone();
            edited.name = "Renamed".to_string();
            assert_eq!(plan.update(&edited, no_source).unwrap_err().kind(), ErrorKind::InvalidState);
            assert_eq!(plan.ensure_deletable().unwrap_err().kind(), ErrorKind::InvalidState);
        }
    }

    #[test]
    fn test_update_rejects_stale_copy_and_empty_items() {
        let plan = draft();

        let mut stale = plan.clone();
        stale.version = Version::new(5);
        assert_eq!(plan.update(&stale, no_source).unwrap_err().kind(), ErrorKind::Conflict);

        let mut emptied = plan.clone();
        emptied.items.clear();
        assert_eq!(plan.update(&emptied, no_source).unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_update_ignores_status_on_edited_copy() {
        let mut plan = draft();
        let mut edited = plan.clone();
        edited.name = "Week 33".to_string();
        edited.status = PlanStatus::Finalized;

        plan.apply_events(&plan.update(&edited, no_source).unwrap(), Utc::now());

        assert_eq!(plan.name, "Week 33");
        assert_eq!(plan.status, PlanStatus::Draft);
        assert_eq!(plan.version, Version::new(2));
    }

    #[test]
    fn test_update_keeps_sku_of_existing_items() {
        let plan = draft();
        let mut edited = plan.clone();
        edited.items[0].sku = "SKU-OTHER".to_string();
        assert_eq!(plan.update(&edited, no_source).unwrap_err().kind(), ErrorKind::Validation);

        let mut edited = plan.clone();
        edited.items[0].quantity = 80;
        edited.items[0].date = NaiveDate::from_ymd_opt(2024, 8, 3).unwrap();
        let mut updated = plan.clone();
        updated.apply_events(&plan.update(&edited, no_source).unwrap(), Utc::now());
        assert_eq!(updated.items[0].sku, "SKU-d1");
        assert_eq!(updated.items[0].quantity, 80);
    }

    #[test]
    fn test_update_copies_added_items_from_source_demand() {
        let plan = draft();
        let mut edited = plan.clone();
        edited.items.push(PlanItem {
            id: DemandId::new("d3"),
            sku: "FORGED".to_string(),
            quantity: 9999,
            date: NaiveDate::from_ymd_opt(2024, 8, 20).unwrap(),
        });

        let events = plan
            .update(&edited, |id| (id.as_str() == "d3").then(|| demand("d3", 50)))
            .unwrap();
        let mut updated = plan.clone();
        updated.apply_events(&events, Utc::now());
        assert_eq!(updated.item(&DemandId::new("d3")), Some(&PlanItem::from_demand(&demand("d3", 50))));

        let err = plan.update(&edited, no_source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_from_demand_keeps_demand_id() {
        let source = demand("d9", 40);
        let item = PlanItem::from_demand(&source);
        assert_eq!(item.id, source.id);
        assert_eq!(item.quantity, 40);
    }
}
