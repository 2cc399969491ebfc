//! Reference scenario loaded into a fresh planning context.

use chrono::{Days, NaiveDate};
use common::{Actor, DemandId, PlanId};
use domain::{
    Demand, DomainError, LogProduction, NewDemand, PlanningContext, ProductionPlan, Result,
    ScheduleRequest,
};

/// What the reference scenario created.
#[derive(Debug, Clone)]
pub struct SeededScenario {
    pub demands: Vec<Demand>,
    /// Submitted plan awaiting review.
    pub submitted: ProductionPlan,
    /// Approved plan whose items are not yet scheduled.
    pub approved: ProductionPlan,
    /// Finalized plan with today's schedule.
    pub finalized: ProductionPlan,
}

struct Crew {
    planner: Actor,
    manager: Actor,
    operations: Actor,
    floor: Actor,
}

impl Default for Crew {
    fn default() -> Self {
        Self {
            planner: Actor::planner("Pat Planner"),
            manager: Actor::manager("Mary Manager"),
            operations: Actor::operations_head("Olivia Ops"),
            floor: Actor::shop_floor("Frank Floor"),
        }
    }
}

/// Builds the reference data set through the public operations only.
///
/// Six approved demands, a submitted plan, an approved plan and a finalized
/// plan scheduled on the first two registered lines for `today`, with one
/// production update logged against it.
#[tracing::instrument(skip(ctx))]
pub fn reference_scenario(ctx: &PlanningContext, today: NaiveDate) -> Result<SeededScenario> {
    let crew = Crew::default();
    let lines = ctx.lines().all();
    let (first_line, second_line) = match lines {
        [] => {
            return Err(DomainError::NotFound {
                entity: "ProductionLine",
                id: "any".to_string(),
            });
        }
        [only] => (only.id.clone(), only.id.clone()),
        [first, second, ..] => (first.id.clone(), second.id.clone()),
    };

    let entries = [
        ("d1", "SKU-001", 100, 1),
        ("d2", "SKU-002", 250, 5),
        ("d3", "SKU-003", 50, 10),
        ("d4", "SKU-004", 300, 12),
        ("d5", "SKU-005", 500, 0),
        ("d6", "SKU-006", 200, 0),
    ];
    let mut demands = Vec::with_capacity(entries.len());
    for (id, sku, quantity, offset) in entries {
        let date = today + Days::new(offset);
        let demand = ctx.demands().create_with_id(
            DemandId::new(id),
            NewDemand::new(sku, quantity, date),
            &crew.planner,
        )?;
        ctx.demands().submit(&demand.id, &crew.planner)?;
        demands.push(ctx.demands().approve(&demand.id, &crew.manager)?);
    }
    let pick = |ids: &[&str]| -> Vec<Demand> {
        demands
            .iter()
            .filter(|demand| ids.contains(&demand.id.as_str()))
            .cloned()
            .collect()
    };

    let plans = ctx.plans();
    let submitted = plans.create_plan_with_id(
        PlanId::new("pp1"),
        "Weekly Plan - Week 32",
        &pick(&["d2"]),
        &crew.planner,
    )?;
    let submitted = plans.submit_plan(&submitted.id, &crew.planner)?;

    let approved = plans.create_plan_with_id(
        PlanId::new("pp2"),
        "Urgent Components - Week 33",
        &pick(&["d1", "d3", "d4"]),
        &crew.planner,
    )?;
    plans.submit_plan(&approved.id, &crew.planner)?;
    let approved = plans.approve_plan(&approved.id, &crew.manager)?;

    let finalized = plans.create_plan_with_id(
        PlanId::new("pp3"),
        "Daily Production Run - Today",
        &pick(&["d5", "d6"]),
        &crew.planner,
    )?;
    plans.submit_plan(&finalized.id, &crew.planner)?;
    let finalized = plans.approve_plan(&finalized.id, &crew.manager)?;

    let scheduler = ctx.scheduler();
    let first_run = scheduler.schedule_item(
        ScheduleRequest::for_item(&finalized.id, &finalized.items[0], first_line),
        &crew.operations,
    )?;
    scheduler.schedule_item(
        ScheduleRequest::for_item(&finalized.id, &finalized.items[1], second_line),
        &crew.operations,
    )?;
    let finalized = plans.finalize_plan(&finalized.id, &crew.operations)?;

    ctx.production().log_update(
        LogProduction::new(first_run.id, 498, 2).with_reason("Minor material defect"),
        &crew.floor,
    )?;

    let demands = ctx.demands().list();
    tracing::info!(
        demands = demands.len(),
        plans = plans.list().len(),
        "reference scenario loaded"
    );
    Ok(SeededScenario {
        demands,
        submitted,
        approved,
        finalized,
    })
}

#[cfg(test)]
mod tests {
    use common::LineId;
    use domain::{Effects, LineRegistry, PlanStatus};

    use super::*;
    use crate::config::reference_lines;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
    }

    #[test]
    fn test_scenario_states() {
        let ctx = PlanningContext::new(
            LineRegistry::new(reference_lines()).unwrap(),
            Effects::tracing(),
        );
        let seeded = reference_scenario(&ctx, today()).unwrap();

        assert_eq!(seeded.demands.len(), 6);
        assert_eq!(seeded.submitted.status, PlanStatus::Submitted);
        assert_eq!(seeded.approved.status, PlanStatus::Approved);
        assert_eq!(seeded.finalized.status, PlanStatus::Finalized);
        assert_eq!(seeded.finalized.final_approved_by.as_deref(), Some("Olivia Ops"));
        assert!(ctx.demands().list_available().is_empty());

        let scheduler = ctx.scheduler();
        assert_eq!(scheduler.usage_for_line(&LineId::new("line1"), today()), 500);
        assert_eq!(scheduler.usage_for_line(&LineId::new("line2"), today()), 200);
        assert_eq!(ctx.production().updates().len(), 1);
    }

    #[test]
    fn test_single_line_takes_both_runs() {
        let lines = LineRegistry::new(vec![domain::ProductionLine::new("solo", "Solo", 700)]).unwrap();
        let ctx = PlanningContext::new(lines, Effects::tracing());
        reference_scenario(&ctx, today()).unwrap();
        assert_eq!(ctx.scheduler().usage_for_line(&LineId::new("solo"), today()), 700);
    }

    #[test]
    fn test_no_lines_is_an_error() {
        let ctx = PlanningContext::new(LineRegistry::default(), Effects::tracing());
        let err = reference_scenario(&ctx, today()).unwrap_err();
        assert_eq!(err.kind(), domain::ErrorKind::NotFound);
    }
}
