//! Plan lifecycle service.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::Utc;
use common::{Actor, DemandId, PlanId};

use crate::aggregate::Aggregate;
use crate::demand::{Demand, DemandPool};
use crate::effects::Effects;
use crate::error::{DomainError, Result};
use crate::lock;
use crate::notification::NotificationKind;

use super::{PlanEvent, PlanStatus, ProductionPlan};

pub(crate) type PlanBook = HashMap<PlanId, ProductionPlan>;

/// Service owning all production plans and their demand allocation.
///
/// Plan writes take the plan lock before the demand pool's lock, so a plan
/// and the demands it holds are always observed together.
#[derive(Debug, Clone)]
pub struct PlanService {
    plans: Arc<RwLock<PlanBook>>,
    demands: DemandPool,
    effects: Effects,
}

impl PlanService {
    /// Creates a plan service allocating from `demands`.
    pub fn new(demands: DemandPool, effects: Effects) -> Self {
        Self {
            plans: Arc::new(RwLock::new(PlanBook::new())),
            demands,
            effects,
        }
    }

    pub(crate) fn book(&self) -> &RwLock<PlanBook> {
        &self.plans
    }

    /// Returns the demand pool this service allocates from.
    pub fn demands(&self) -> &DemandPool {
        &self.demands
    }

    /// Creates a draft plan from available demands and assigns them to it.
    #[tracing::instrument(skip(self, demands), fields(demand_count = demands.len()))]
    pub fn create_plan(
        &self,
        name: &str,
        demands: &[Demand],
        created_by: &Actor,
    ) -> Result<ProductionPlan> {
        self.create_plan_with_id(PlanId::generate(), name, demands, created_by)
    }

    /// Creates a draft plan under an externally assigned id.
    ///
    /// Items are copied from the stored demand records, not from `demands`.
    pub fn create_plan_with_id(
        &self,
        id: PlanId,
        name: &str,
        demands: &[Demand],
        created_by: &Actor,
    ) -> Result<ProductionPlan> {
        let now = Utc::now();
        let mut plans = lock::write(&self.plans);
        if plans.contains_key(&id) {
            return Err(DomainError::validation(
                "id",
                format!("plan {id} already exists"),
            ));
        }

        let mut book = lock::write(self.demands.book());
        let stored = demands
            .iter()
            .map(|demand| {
                book.get(&demand.id)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found(Demand::aggregate_type(), &demand.id))
            })
            .collect::<Result<Vec<_>>>()?;

        let plan = ProductionPlan::create(id, name, &stored, &created_by.name, now)?;
        book.assign(&plan.item_ids(), &plan.id, now)
            .inspect_err(|error| tracing::debug!(%error, "plan creation rejected"))?;
        plans.insert(plan.id.clone(), plan.clone());
        drop(book);
        drop(plans);

        metrics::counter!("plan_transitions_total", "transition" => "create").increment(1);
        tracing::info!(plan_id = %plan.id, items = plan.items.len(), "plan created");
        self.effects.audit(
            created_by,
            format!(
                "Created plan \"{}\" with {} demand items.",
                plan.name,
                plan.items.len()
            ),
            now,
        );
        Ok(plan)
    }

    /// Edits a draft plan from a caller-modified copy.
    ///
    /// Demands dropped from the item list return to the pool; added items must
    /// reference available demands, which are assigned to the plan and copied
    /// from the stored record.
    #[tracing::instrument(skip(self, plan), fields(plan_id = %plan.id))]
    pub fn update_plan(&self, plan: &ProductionPlan, actor: &Actor) -> Result<ProductionPlan> {
        let now = Utc::now();
        let mut plans = lock::write(&self.plans);
        let stored = plans
            .get_mut(&plan.id)
            .ok_or_else(|| DomainError::not_found(ProductionPlan::aggregate_type(), &plan.id))?;
        let mut book = lock::write(self.demands.book());
        let events = stored
            .update(plan, |id| book.get(id).cloned())
            .inspect_err(|error| tracing::debug!(%error, "plan update rejected"))?;

        let before: HashSet<DemandId> = stored.item_ids().into_iter().collect();
        let after: HashSet<DemandId> = plan.item_ids().into_iter().collect();
        let added: Vec<DemandId> = plan
            .item_ids()
            .into_iter()
            .filter(|id| !before.contains(id))
            .collect();
        let removed: Vec<DemandId> = stored
            .item_ids()
            .into_iter()
            .filter(|id| !after.contains(id))
            .collect();

        book.assign(&added, &plan.id, now)?;
        book.release(&removed, now);
        drop(book);

        let old_name = stored.name.clone();
        stored.apply_events(&events, now);
        let updated = stored.clone();
        drop(plans);

        metrics::counter!("plan_transitions_total", "transition" => "update").increment(1);
        tracing::info!(
            plan_id = %updated.id,
            added = added.len(),
            removed = removed.len(),
            "plan updated"
        );
        let description = if old_name != updated.name {
            format!("Renamed plan from \"{old_name}\" to \"{}\".", updated.name)
        } else {
            format!("Updated items in plan \"{}\".", updated.name)
        };
        self.effects.audit(actor, description, now);
        Ok(updated)
    }

    /// Submits a draft plan for review.
    #[tracing::instrument(skip(self))]
    pub fn submit_plan(&self, id: &PlanId, actor: &Actor) -> Result<ProductionPlan> {
        let plan = self.transition(id, "submit", ProductionPlan::submit)?;
        self.effects.audit(
            actor,
            format!("Submitted plan \"{}\" for review.", plan.name),
            plan.last_modified,
        );
        self.effects.notify(
            NotificationKind::Info,
            &format!("Plan \"{}\" has been submitted.", plan.name),
        );
        Ok(plan)
    }

    /// Approves a submitted plan on behalf of `reviewed_by`.
    #[tracing::instrument(skip(self))]
    pub fn approve_plan(&self, id: &PlanId, reviewed_by: &Actor) -> Result<ProductionPlan> {
        let plan = self.transition(id, "approve", |plan| plan.approve(&reviewed_by.name))?;
        self.effects.audit(
            reviewed_by,
            format!("Approved plan \"{}\".", plan.name),
            plan.last_modified,
        );
        self.effects.notify(
            NotificationKind::Success,
            &format!("Plan \"{}\" has been approved.", plan.name),
        );
        Ok(plan)
    }

    /// Rejects a submitted or approved plan with a non-blank reason.
    #[tracing::instrument(skip(self))]
    pub fn reject_plan(
        &self,
        id: &PlanId,
        reason: &str,
        reviewed_by: &Actor,
    ) -> Result<ProductionPlan> {
        let plan = self.transition(id, "reject", |plan| {
            plan.reject(reason, &reviewed_by.name)
        })?;
        let reason = plan.rejection_reason.as_deref().unwrap_or(reason);
        self.effects.audit(
            reviewed_by,
            format!("Rejected plan \"{}\". Reason: {reason}", plan.name),
            plan.last_modified,
        );
        self.effects.notify(
            NotificationKind::Error,
            &format!("Plan \"{}\" has been rejected.", plan.name),
        );
        Ok(plan)
    }

    /// Finalizes an approved plan, locking it and its schedule.
    #[tracing::instrument(skip(self))]
    pub fn finalize_plan(&self, id: &PlanId, final_approved_by: &Actor) -> Result<ProductionPlan> {
        let plan = self.transition(id, "finalize", |plan| {
            plan.finalize(&final_approved_by.name)
        })?;
        self.effects.audit(
            final_approved_by,
            format!("Finalized and locked plan \"{}\".", plan.name),
            plan.last_modified,
        );
        self.effects.notify(
            NotificationKind::Success,
            &format!("Plan \"{}\" has been finalized.", plan.name),
        );
        Ok(plan)
    }

    /// Deletes a draft plan and returns its demands to the pool.
    #[tracing::instrument(skip(self))]
    pub fn delete_plan(&self, id: &PlanId, actor: &Actor) -> Result<ProductionPlan> {
        let now = Utc::now();
        let mut plans = lock::write(&self.plans);
        plans
            .get(id)
            .ok_or_else(|| DomainError::not_found(ProductionPlan::aggregate_type(), id))?
            .ensure_deletable()
            .inspect_err(|error| tracing::debug!(%error, "plan deletion rejected"))?;
        let removed = plans
            .remove(id)
            .ok_or_else(|| DomainError::not_found(ProductionPlan::aggregate_type(), id))?;
        lock::write(self.demands.book()).release(&removed.item_ids(), now);
        drop(plans);

        metrics::counter!("plan_transitions_total", "transition" => "delete").increment(1);
        tracing::info!(plan_id = %id, "plan deleted");
        self.effects
            .audit(actor, format!("Deleted plan \"{}\".", removed.name), now);
        Ok(removed)
    }

    /// Returns a plan by id.
    pub fn get(&self, id: &PlanId) -> Option<ProductionPlan> {
        lock::read(&self.plans).get(id).cloned()
    }

    /// Returns all plans, oldest first.
    pub fn list(&self) -> Vec<ProductionPlan> {
        self.collect(|_| true)
    }

    /// Returns plans in the given status, oldest first.
    pub fn plans_with_status(&self, status: PlanStatus) -> Vec<ProductionPlan> {
        self.collect(|plan| plan.status == status)
    }

    /// Returns plans whose items may be scheduled.
    pub fn approved_plans(&self) -> Vec<ProductionPlan> {
        self.plans_with_status(PlanStatus::Approved)
    }

    /// Returns plans awaiting review.
    pub fn submitted_plans(&self) -> Vec<ProductionPlan> {
        self.plans_with_status(PlanStatus::Submitted)
    }

    fn collect(&self, filter: impl Fn(&ProductionPlan) -> bool) -> Vec<ProductionPlan> {
        let mut plans: Vec<ProductionPlan> = lock::read(&self.plans)
            .values()
            .filter(|plan| filter(plan))
            .cloned()
            .collect();
        plans.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        plans
    }

    fn transition(
        &self,
        id: &PlanId,
        transition: &'static str,
        command: impl FnOnce(&ProductionPlan) -> Result<Vec<PlanEvent>>,
    ) -> Result<ProductionPlan> {
        let now = Utc::now();
        let mut plans = lock::write(&self.plans);
        let plan = plans
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(ProductionPlan::aggregate_type(), id))?;
        let from = plan.status;
        let events = command(plan).inspect_err(|error| {
            tracing::debug!(%error, transition, "plan transition rejected");
        })?;
        plan.apply_events(&events, now);
        let updated = plan.clone();
        drop(plans);

        metrics::counter!("plan_transitions_total", "transition" => transition).increment(1);
        tracing::info!(plan_id = %id, %from, to = %updated.status, "plan transitioned");
        Ok(updated)
    }
}
