//! Demand pool: the collection of demand records and their allocation state.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use common::{Actor, DemandId, PlanId};

use crate::aggregate::Aggregate;
use crate::effects::Effects;
use crate::error::{DomainError, Result};
use crate::lock;

use super::{Demand, DemandEvent, NewDemand};

/// Demand records keyed by id, with an index of the available ones.
#[derive(Debug, Default)]
pub(crate) struct DemandBook {
    demands: HashMap<DemandId, Demand>,
    available: BTreeSet<DemandId>,
}

impl DemandBook {
    pub(crate) fn get(&self, id: &DemandId) -> Option<&Demand> {
        self.demands.get(id)
    }

    fn require(&self, id: &DemandId) -> Result<&Demand> {
        self.demands
            .get(id)
            .ok_or_else(|| DomainError::not_found(Demand::aggregate_type(), id))
    }

    fn insert(&mut self, demand: Demand) {
        let id = demand.id.clone();
        self.demands.insert(id.clone(), demand);
        self.reindex(&id);
    }

    fn remove(&mut self, id: &DemandId) -> Option<Demand> {
        self.available.remove(id);
        self.demands.remove(id)
    }

    /// Applies already validated events to one demand and refreshes the index.
    fn commit(
        &mut self,
        id: &DemandId,
        events: &[DemandEvent],
        at: DateTime<Utc>,
    ) -> Option<Demand> {
        let demand = self.demands.get_mut(id)?;
        demand.apply_events(events, at);
        let updated = demand.clone();
        self.reindex(id);
        Some(updated)
    }

    fn reindex(&mut self, id: &DemandId) {
        match self.demands.get(id) {
            Some(demand) if demand.is_available() => {
                self.available.insert(id.clone());
            }
            _ => {
                self.available.remove(id);
            }
        }
    }

    pub(crate) fn available(&self) -> impl Iterator<Item = &Demand> {
        self.available.iter().filter_map(|id| self.demands.get(id))
    }

    /// Assigns every id to `plan_id`, or none of them.
    pub(crate) fn assign(
        &mut self,
        ids: &[DemandId],
        plan_id: &PlanId,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut pending = Vec::with_capacity(ids.len());
        for id in ids {
            let events = self.require(id)?.assign_to(plan_id)?;
            pending.push((id, events));
        }
        for (id, events) in pending {
            self.commit(id, &events, at);
        }
        Ok(())
    }

    /// Returns every id to the pool. Unknown ids are skipped.
    pub(crate) fn release(&mut self, ids: &[DemandId], at: DateTime<Utc>) {
        for id in ids {
            if let Some(demand) = self.demands.get(id) {
                let events = demand.release();
                self.commit(id, &events, at);
            }
        }
    }
}

/// Service owning all demand records.
///
/// Cloning the pool yields another handle to the same records.
#[derive(Debug, Clone)]
pub struct DemandPool {
    book: Arc<RwLock<DemandBook>>,
    effects: Effects,
}

impl DemandPool {
    /// Creates an empty demand pool.
    pub fn new(effects: Effects) -> Self {
        Self {
            book: Arc::new(RwLock::new(DemandBook::default())),
            effects,
        }
    }

    pub(crate) fn book(&self) -> &RwLock<DemandBook> {
        &self.book
    }

    /// Enters a new draft demand.
    #[tracing::instrument(skip(self, demand), fields(sku = %demand.sku, quantity = demand.quantity))]
    pub fn create(&self, demand: NewDemand, submitted_by: &Actor) -> Result<Demand> {
        self.create_with_id(DemandId::generate(), demand, submitted_by)
    }

    /// Enters a new draft demand under an externally assigned id.
    pub fn create_with_id(
        &self,
        id: DemandId,
        fields: NewDemand,
        submitted_by: &Actor,
    ) -> Result<Demand> {
        let now = Utc::now();
        let mut book = lock::write(&self.book);
        if book.get(&id).is_some() {
            return Err(DomainError::validation(
                "id",
                format!("demand {id} already exists"),
            ));
        }

        let demand = Demand::create(id, fields, &submitted_by.name, now)?;
        book.insert(demand.clone());
        drop(book);

        tracing::info!(demand_id = %demand.id, "demand created");
        self.effects.audit(
            submitted_by,
            format!(
                "Created new demand for SKU {} with quantity {}.",
                demand.sku, demand.quantity
            ),
            now,
        );
        Ok(demand)
    }

    /// Edits a draft demand from a caller-modified copy of the record.
    #[tracing::instrument(skip(self, demand), fields(demand_id = %demand.id))]
    pub fn update(&self, demand: &Demand, actor: &Actor) -> Result<Demand> {
        let now = Utc::now();
        let mut book = lock::write(&self.book);
        let stored = book.require(&demand.id)?;
        let old_sku = stored.sku.clone();
        let events = stored.update(demand).inspect_err(|error| {
            tracing::debug!(%error, "demand update rejected");
        })?;
        let changes = match &events[..] {
            [DemandEvent::DemandUpdated(data)] => data
                .changes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        };
        let updated = book
            .commit(&demand.id, &events, now)
            .ok_or_else(|| DomainError::not_found(Demand::aggregate_type(), &demand.id))?;
        drop(book);

        let description = if changes.is_empty() {
            format!("Updated demand for SKU {old_sku}.")
        } else {
            format!("Updated demand for SKU {old_sku}: {}.", changes.join(", "))
        };
        self.effects.audit(actor, description, now);
        Ok(updated)
    }

    /// Deletes a draft demand.
    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: &DemandId, actor: &Actor) -> Result<Demand> {
        let now = Utc::now();
        let mut book = lock::write(&self.book);
        book.require(id)?.ensure_deletable()?;
        let removed = book
            .remove(id)
            .ok_or_else(|| DomainError::not_found(Demand::aggregate_type(), id))?;
        drop(book);

        self.effects.audit(
            actor,
            format!("Deleted demand for SKU {}.", removed.sku),
            now,
        );
        Ok(removed)
    }

    /// Submits a draft demand for approval.
    #[tracing::instrument(skip(self))]
    pub fn submit(&self, id: &DemandId, actor: &Actor) -> Result<Demand> {
        let demand = self.transition(id, "submit", Demand::submit)?;
        self.effects.audit(
            actor,
            format!(
                "Submitted demand for SKU {} ({} units on {}) for approval.",
                demand.sku, demand.quantity, demand.date
            ),
            demand.last_modified,
        );
        Ok(demand)
    }

    /// Approves a submitted demand, making it available for planning.
    #[tracing::instrument(skip(self))]
    pub fn approve(&self, id: &DemandId, actor: &Actor) -> Result<Demand> {
        let demand = self.transition(id, "approve", Demand::approve)?;
        self.effects.audit(
            actor,
            format!("Approved demand for SKU {}.", demand.sku),
            demand.last_modified,
        );
        Ok(demand)
    }

    /// Rejects a submitted demand.
    #[tracing::instrument(skip(self))]
    pub fn reject(&self, id: &DemandId, actor: &Actor) -> Result<Demand> {
        let demand = self.transition(id, "reject", Demand::reject)?;
        self.effects.audit(
            actor,
            format!("Rejected demand for SKU {}.", demand.sku),
            demand.last_modified,
        );
        Ok(demand)
    }

    /// Assigns demands to a plan.
    ///
    /// Every id must be approved and either unassigned or already assigned to
    /// `plan_id`; otherwise nothing is assigned. Keeping the plan's items in
    /// agreement is the caller's responsibility; plan creation goes through
    /// [`crate::PlanService::create_plan`], which does both together.
    pub fn assign_to_plan(&self, ids: &[DemandId], plan_id: &PlanId) -> Result<()> {
        lock::write(&self.book).assign(ids, plan_id, Utc::now())
    }

    /// Returns a demand by id.
    pub fn get(&self, id: &DemandId) -> Option<Demand> {
        lock::read(&self.book).get(id).cloned()
    }

    /// Returns all demands, ordered by date then id.
    pub fn list(&self) -> Vec<Demand> {
        let mut demands: Vec<Demand> = lock::read(&self.book).demands.values().cloned().collect();
        demands.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        demands
    }

    /// Returns approved demands that are not assigned to any plan.
    pub fn list_available(&self) -> Vec<Demand> {
        lock::read(&self.book).available().cloned().collect()
    }

    fn transition(
        &self,
        id: &DemandId,
        transition: &'static str,
        command: impl FnOnce(&Demand) -> Result<Vec<DemandEvent>>,
    ) -> Result<Demand> {
        let now = Utc::now();
        let mut book = lock::write(&self.book);
        let events = command(book.require(id)?).inspect_err(|error| {
            tracing::debug!(%error, transition, "demand transition rejected");
        })?;
        let demand = book
            .commit(id, &events, now)
            .ok_or_else(|| DomainError::not_found(Demand::aggregate_type(), id))?;
        drop(book);

        metrics::counter!("demand_transitions_total", "transition" => transition).increment(1);
        tracing::info!(demand_id = %id, status = %demand.status, "demand transitioned");
        Ok(demand)
    }
}
