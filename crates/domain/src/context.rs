//! Wiring of the planning components.

use common::PlanId;

use crate::demand::DemandPool;
use crate::effects::Effects;
use crate::lock;
use crate::plan::{PlanService, ProductionPlan};
use crate::production::{ProductionLog, ProductionUpdate};
use crate::schedule::{CapacityScheduler, LineRegistry, ScheduleItem, sort_items};

/// Holds one instance of each planning component, wired together.
///
/// Every accessor hands out a handle onto the same shared state.
#[derive(Debug, Clone)]
pub struct PlanningContext {
    demands: DemandPool,
    plans: PlanService,
    scheduler: CapacityScheduler,
    production: ProductionLog,
}

impl PlanningContext {
    pub fn new(lines: LineRegistry, effects: Effects) -> Self {
        let demands = DemandPool::new(effects.clone());
        let plans = PlanService::new(demands.clone(), effects.clone());
        let scheduler = CapacityScheduler::new(plans.clone(), lines, effects.clone());
        let production = ProductionLog::new(scheduler.clone(), effects);

        Self {
            demands,
            plans,
            scheduler,
            production,
        }
    }

    pub fn demands(&self) -> &DemandPool {
        &self.demands
    }

    pub fn plans(&self) -> &PlanService {
        &self.plans
    }

    pub fn scheduler(&self) -> &CapacityScheduler {
        &self.scheduler
    }

    pub fn production(&self) -> &ProductionLog {
        &self.production
    }

    pub fn lines(&self) -> &LineRegistry {
        self.scheduler.lines()
    }

    /// Captures plans, schedule and production updates at a single point.
    pub fn snapshot(&self) -> PlanningSnapshot {
        let plans_guard = lock::read(self.scheduler.plans().book());
        let schedule_guard = lock::read(self.scheduler.book());
        let updates_guard = lock::read(self.production.book());

        let mut plans: Vec<ProductionPlan> = plans_guard.values().cloned().collect();
        plans.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        let mut schedule: Vec<ScheduleItem> = schedule_guard.items().cloned().collect();
        sort_items(&mut schedule);

        PlanningSnapshot {
            lines: self.lines().clone(),
            plans,
            schedule,
            updates: updates_guard.clone(),
        }
    }
}

/// Point-in-time copy of the state read by reports.
#[derive(Debug, Clone)]
pub struct PlanningSnapshot {
    pub lines: LineRegistry,
    pub plans: Vec<ProductionPlan>,
    pub schedule: Vec<ScheduleItem>,
    pub updates: Vec<ProductionUpdate>,
}

impl PlanningSnapshot {
    pub fn plan(&self, id: &PlanId) -> Option<&ProductionPlan> {
        self.plans.iter().find(|plan| &plan.id == id)
    }
}
