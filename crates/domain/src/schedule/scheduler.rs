//! Capacity scheduler.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{NaiveDate, Utc};
use common::{Actor, LineId, PlanId, PlanItemId, ScheduleItemId};

use crate::aggregate::Aggregate;
use crate::effects::Effects;
use crate::error::{DomainError, Result, require_positive};
use crate::lock;
use crate::plan::{PlanService, PlanStatus, ProductionPlan};

use super::{CapacityConflict, LineRegistry, ScheduleItem, ScheduleRequest};

/// Schedule items keyed by id, with per line and date usage totals.
#[derive(Debug, Default)]
pub(crate) struct ScheduleBook {
    items: HashMap<ScheduleItemId, ScheduleItem>,
    usage: HashMap<(LineId, NaiveDate), u64>,
}

impl ScheduleBook {
    pub(crate) fn get(&self, id: &ScheduleItemId) -> Option<&ScheduleItem> {
        self.items.get(id)
    }

    pub(crate) fn items(&self) -> impl Iterator<Item = &ScheduleItem> {
        self.items.values()
    }

    fn usage(&self, line_id: &LineId, date: NaiveDate) -> u64 {
        self.usage
            .get(&(line_id.clone(), date))
            .copied()
            .unwrap_or(0)
    }

    fn insert(&mut self, item: ScheduleItem) {
        *self
            .usage
            .entry((item.line_id.clone(), item.date))
            .or_default() += u64::from(item.quantity);
        self.items.insert(item.id.clone(), item);
    }

    fn remove(&mut self, id: &ScheduleItemId) -> Option<ScheduleItem> {
        let item = self.items.remove(id)?;
        let key = (item.line_id.clone(), item.date);
        if let Some(total) = self.usage.get_mut(&key) {
            *total = total.saturating_sub(u64::from(item.quantity));
            if *total == 0 {
                self.usage.remove(&key);
            }
        }
        Some(item)
    }
}

/// Places approved plan items onto production lines under a daily capacity
/// limit.
///
/// Capacity may only be exceeded with an explicit, non-blank override reason.
/// Scheduling reads plan status under the plan lock, so a plan cannot be
/// finalized or rejected halfway through a scheduling call.
#[derive(Debug, Clone)]
pub struct CapacityScheduler {
    schedule: Arc<RwLock<ScheduleBook>>,
    plans: PlanService,
    lines: LineRegistry,
    effects: Effects,
}

impl CapacityScheduler {
    pub fn new(plans: PlanService, lines: LineRegistry, effects: Effects) -> Self {
        Self {
            schedule: Arc::new(RwLock::new(ScheduleBook::default())),
            plans,
            lines,
            effects,
        }
    }

    pub(crate) fn book(&self) -> &RwLock<ScheduleBook> {
        &self.schedule
    }

    pub(crate) fn plans(&self) -> &PlanService {
        &self.plans
    }

    /// Returns the line registry.
    pub fn lines(&self) -> &LineRegistry {
        &self.lines
    }

    /// Checks whether `quantity` more units fit on a line for a date.
    ///
    /// Returns the conflict when the projected usage would exceed the line's
    /// daily capacity, `None` when it fits.
    pub fn check_capacity(
        &self,
        line_id: &LineId,
        date: NaiveDate,
        quantity: u32,
    ) -> Result<Option<CapacityConflict>> {
        let line = self.lines.get(line_id)?;
        let current_usage = lock::read(&self.schedule).usage(line_id, date);
        Ok(conflict(line, current_usage, quantity))
    }

    /// Schedules a quantity of an approved plan's item on a line and date.
    #[tracing::instrument(
        skip(self, request),
        fields(
            plan_id = %request.plan_id,
            line_id = %request.line_id,
            date = %request.date,
            quantity = request.quantity
        )
    )]
    pub fn schedule_item(&self, request: ScheduleRequest, actor: &Actor) -> Result<ScheduleItem> {
        let now = Utc::now();
        let plans = lock::read(self.plans.book());
        let plan = plans.get(&request.plan_id).ok_or_else(|| {
            DomainError::not_found(ProductionPlan::aggregate_type(), &request.plan_id)
        })?;
        plan.ensure_status(plan.status.can_schedule(), "schedule")
            .inspect_err(|error| tracing::debug!(%error, "scheduling rejected"))?;
        require_positive("quantity", request.quantity)?;
        let plan_item = plan
            .item(&request.plan_item_id)
            .ok_or_else(|| DomainError::not_found("PlanItem", &request.plan_item_id))?;
        if request.sku != plan_item.sku {
            return Err(DomainError::validation(
                "sku",
                format!(
                    "plan item {} is for SKU {}, not {}",
                    plan_item.id, plan_item.sku, request.sku
                ),
            ));
        }
        let line = self.lines.get(&request.line_id)?;

        let mut schedule = lock::write(&self.schedule);
        let current_usage = schedule.usage(&line.id, request.date);
        let overrun = conflict(line, current_usage, request.quantity);
        let override_reason = match (overrun, request.override_reason()) {
            (None, _) => None,
            (Some(conflict), Some(reason)) => {
                metrics::counter!("capacity_overrides_total").increment(1);
                tracing::info!(
                    overage = conflict.overage,
                    reason,
                    "capacity exceeded with override"
                );
                Some(reason.to_string())
            }
            (Some(conflict), None) => {
                metrics::counter!("capacity_rejections_total").increment(1);
                tracing::debug!(overage = conflict.overage, "capacity exceeded");
                return Err(conflict.into());
            }
        };

        let item = ScheduleItem {
            id: ScheduleItemId::generate(),
            plan_id: request.plan_id,
            plan_item_id: request.plan_item_id,
            sku: request.sku,
            quantity: request.quantity,
            date: request.date,
            line_id: line.id.clone(),
            override_reason,
        };
        schedule.insert(item.clone());
        drop(schedule);
        drop(plans);

        metrics::counter!("schedule_items_admitted_total").increment(1);
        tracing::info!(schedule_item_id = %item.id, "schedule item admitted");

        let mut description = format!(
            "Scheduled {} of SKU {} on {} for {}.",
            item.quantity, item.sku, line.name, item.date
        );
        if let Some(reason) = &item.override_reason {
            description.push_str(&format!(" Capacity override reason: {reason}."));
        }
        self.effects.audit(actor, description, now);
        Ok(item)
    }

    /// Removes a schedule item unless its plan is finalized.
    #[tracing::instrument(skip(self))]
    pub fn unschedule_item(&self, id: &ScheduleItemId, actor: &Actor) -> Result<ScheduleItem> {
        let now = Utc::now();
        let plans = lock::read(self.plans.book());
        let mut schedule = lock::write(&self.schedule);
        let item = schedule
            .get(id)
            .ok_or_else(|| DomainError::not_found("ScheduleItem", id))?;
        if let Some(plan) = plans.get(&item.plan_id)
            && plan.status == PlanStatus::Finalized
        {
            tracing::debug!(plan_id = %plan.id, "unscheduling rejected on finalized plan");
            return Err(DomainError::invalid_state(
                "ScheduleItem",
                id,
                format!("{} plan", plan.status),
                "unschedule",
            ));
        }
        let removed = schedule
            .remove(id)
            .ok_or_else(|| DomainError::not_found("ScheduleItem", id))?;
        drop(schedule);
        drop(plans);

        metrics::counter!("schedule_items_removed_total").increment(1);
        tracing::info!(schedule_item_id = %id, "schedule item removed");

        let line_name = self
            .lines
            .find(&removed.line_id)
            .map_or_else(|| removed.line_id.to_string(), |line| line.name.clone());
        self.effects.audit(
            actor,
            format!(
                "Unscheduled {} of SKU {} from {} on {}.",
                removed.quantity, removed.sku, line_name, removed.date
            ),
            now,
        );
        Ok(removed)
    }

    /// Returns the summed quantity scheduled on a line for a date.
    pub fn usage_for_line(&self, line_id: &LineId, date: NaiveDate) -> u64 {
        lock::read(&self.schedule).usage(line_id, date)
    }

    /// Returns the units still free on a line for a date, never below zero.
    pub fn remaining_capacity(&self, line_id: &LineId, date: NaiveDate) -> Result<u64> {
        let line = self.lines.get(line_id)?;
        let used = self.usage_for_line(line_id, date);
        Ok(u64::from(line.daily_capacity).saturating_sub(used))
    }

    /// Returns a schedule item by id.
    pub fn get(&self, id: &ScheduleItemId) -> Option<ScheduleItem> {
        lock::read(&self.schedule).get(id).cloned()
    }

    /// Returns all schedule items ordered by date, line and id.
    pub fn items(&self) -> Vec<ScheduleItem> {
        self.collect(|_| true)
    }

    pub fn items_for_plan(&self, plan_id: &PlanId) -> Vec<ScheduleItem> {
        self.collect(|item| &item.plan_id == plan_id)
    }

    pub fn items_on(&self, date: NaiveDate) -> Vec<ScheduleItem> {
        self.collect(|item| item.date == date)
    }

    /// Returns the ids of plan items that have at least one schedule item.
    pub fn scheduled_plan_item_ids(&self) -> HashSet<PlanItemId> {
        lock::read(&self.schedule)
            .items()
            .map(|item| item.plan_item_id.clone())
            .collect()
    }

    fn collect(&self, filter: impl Fn(&ScheduleItem) -> bool) -> Vec<ScheduleItem> {
        let mut items: Vec<ScheduleItem> = lock::read(&self.schedule)
            .items()
            .filter(|item| filter(item))
            .cloned()
            .collect();
        sort_items(&mut items);
        items
    }
}

pub(crate) fn sort_items(items: &mut [ScheduleItem]) {
    items.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.line_id.cmp(&b.line_id))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn conflict(
    line: &super::ProductionLine,
    current_usage: u64,
    quantity: u32,
) -> Option<CapacityConflict> {
    let capacity = u64::from(line.daily_capacity);
    let projected = current_usage + u64::from(quantity);
    (projected > capacity).then(|| CapacityConflict {
        line: line.clone(),
        current_usage,
        projected,
        overage: projected - capacity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::{DemandPool, NewDemand};
    use crate::error::ErrorKind;
    use crate::schedule::ProductionLine;

    struct Fixture {
        scheduler: CapacityScheduler,
        plan: ProductionPlan,
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
    }

    fn ops() -> Actor {
        Actor::operations_head("Olga Ops")
    }

    fn fixture() -> Fixture {
        let effects = Effects::tracing();
        let pool = DemandPool::new(effects.clone());
        let plans = PlanService::new(pool.clone(), effects.clone());
        let lines = LineRegistry::new(vec![ProductionLine::new("L1", "Line One", 1000)]).unwrap();
        let scheduler = CapacityScheduler::new(plans.clone(), lines, effects);

        let planner = Actor::planner("Pat");
        let demand = pool
            .create(NewDemand::new("SKU-001", 1200, date()), &planner)
            .unwrap();
        pool.submit(&demand.id, &planner).unwrap();
        let demand = pool.approve(&demand.id, &Actor::manager("Mary")).unwrap();
        let plan = plans.create_plan("Week 32", &[demand], &planner).unwrap();
        plans.submit_plan(&plan.id, &planner).unwrap();
        let plan = plans.approve_plan(&plan.id, &Actor::manager("Mary")).unwrap();

        Fixture { scheduler, plan }
    }

    fn request(f: &Fixture, quantity: u32) -> ScheduleRequest {
        ScheduleRequest::for_item(&f.plan.id, &f.plan.items[0], "L1").with_quantity(quantity)
    }

    #[test]
    fn test_usage_tracks_admitted_and_removed_items() {
        let f = fixture();
        let line = LineId::new("L1");
        let first = f.scheduler.schedule_item(request(&f, 300), &ops()).unwrap();
        f.scheduler.schedule_item(request(&f, 200), &ops()).unwrap();
        assert_eq!(f.scheduler.usage_for_line(&line, date()), 500);

        f.scheduler.unschedule_item(&first.id, &ops()).unwrap();
        assert_eq!(f.scheduler.usage_for_line(&line, date()), 200);
        assert_eq!(f.scheduler.remaining_capacity(&line, date()).unwrap(), 800);
    }

    #[test]
    fn test_sku_must_match_plan_item() {
        let f = fixture();
        let mut mismatched = request(&f, 100);
        mismatched.sku = "OTHER".to_string();

        let err = f.scheduler.schedule_item(mismatched, &ops()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(f.scheduler.items().is_empty());
        assert_eq!(f.scheduler.usage_for_line(&LineId::new("L1"), date()), 0);
    }

    #[test]
    fn test_check_capacity_reports_overage() {
        let f = fixture();
        f.scheduler.schedule_item(request(&f, 700), &ops()).unwrap();

        let conflict = f
            .scheduler
            .check_capacity(&LineId::new("L1"), date(), 400)
            .unwrap()
            .unwrap();
        assert_eq!(conflict.current_usage, 700);
        assert_eq!(conflict.overage, 100);

        assert!(
            f.scheduler
                .check_capacity(&LineId::new("L1"), date(), 300)
                .unwrap()
                .is_none()
        );
        let err = f
            .scheduler
            .check_capacity(&LineId::new("nope"), date(), 1)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_reason_is_dropped_when_capacity_fits() {
        let f = fixture();
        let item = f
            .scheduler
            .schedule_item(request(&f, 10).with_override("rush"), &ops())
            .unwrap();
        assert!(!item.is_override());
    }

    #[test]
    fn test_blank_override_is_rejected() {
        let f = fixture();
        let err = f
            .scheduler
            .schedule_item(request(&f, 1001).with_override("  "), &ops())
            .unwrap_err();
        assert_eq!(err.overage(), Some(1));
        assert!(f.scheduler.items().is_empty());
    }

    #[test]
    fn test_zero_quantity_and_unknown_item() {
        let f = fixture();
        let err = f.scheduler.schedule_item(request(&f, 0), &ops()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut foreign = request(&f, 10);
        foreign.plan_item_id = PlanItemId::new("not-in-plan");
        let err = f.scheduler.schedule_item(foreign, &ops()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_scheduled_plan_item_ids() {
        let f = fixture();
        assert!(f.scheduler.scheduled_plan_item_ids().is_empty());
        f.scheduler.schedule_item(request(&f, 10), &ops()).unwrap();
        assert!(
            f.scheduler
                .scheduled_plan_item_ids()
                .contains(&f.plan.items[0].id)
        );
        assert_eq!(f.scheduler.items_for_plan(&f.plan.id).len(), 1);
        assert_eq!(f.scheduler.items_on(date()).len(), 1);
    }
}
