//! Integration tests: planning operations → snapshot → report views.

use chrono::NaiveDate;
use common::{Actor, LineId};
use domain::{
    Effects, LineRegistry, LogProduction, NewDemand, PlanningContext, ProductionLine,
    ProductionPlan, ScheduleRequest,
};
use projections::{
    CapacityOverview, DailySchedule, ProductionReport, ReadModel, ReportError, ReportFilter,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
}

fn context() -> PlanningContext {
    let lines = LineRegistry::new(vec![
        ProductionLine::new("line1", "Assembly Line 1", 1000),
        ProductionLine::new("line2", "Component Line A", 500),
        ProductionLine::new("line3", "Finishing Line", 800),
    ])
    .unwrap();
    PlanningContext::new(lines, Effects::tracing())
}

fn plan(ctx: &PlanningContext, name: &str, items: &[(&str, u32, NaiveDate)]) -> ProductionPlan {
    let planner = Actor::planner("Pat Planner");
    let manager = Actor::manager("Mary Manager");
    let demands: Vec<_> = items
        .iter()
        .map(|(sku, quantity, date)| {
            let demand = ctx
                .demands()
                .create(NewDemand::new(*sku, *quantity, *date), &planner)
                .unwrap();
            ctx.demands().submit(&demand.id, &planner).unwrap();
            ctx.demands().approve(&demand.id, &manager).unwrap()
        })
        .collect();
    ctx.plans().create_plan(name, &demands, &planner).unwrap()
}

fn ops() -> Actor {
    Actor::operations_head("Olga Ops")
}

/// Two finalized lines of output on day 1, one submitted plan on day 2, and
/// an approved but unfinalized item on day 3.
fn populated() -> PlanningContext {
    let ctx = context();
    let planner = Actor::planner("Pat Planner");
    let manager = Actor::manager("Mary Manager");

    let finalized = plan(&ctx, "Finalized", &[("SKU-005", 500, day(1)), ("SKU-006", 200, day(1))]);
    ctx.plans().submit_plan(&finalized.id, &planner).unwrap();
    ctx.plans().approve_plan(&finalized.id, &manager).unwrap();
    let first = ctx
        .scheduler()
        .schedule_item(
            ScheduleRequest::for_item(&finalized.id, &finalized.items[0], "line1"),
            &ops(),
        )
        .unwrap();
    ctx.scheduler()
        .schedule_item(
            ScheduleRequest::for_item(&finalized.id, &finalized.items[1], "line2"),
            &ops(),
        )
        .unwrap();
    ctx.plans().finalize_plan(&finalized.id, &ops()).unwrap();
    ctx.production()
        .log_update(
            LogProduction::new(first.id, 498, 2).with_reason("Die change"),
            &Actor::shop_floor("Frank Floor"),
        )
        .unwrap();

    let submitted = plan(&ctx, "Submitted", &[("SKU-002", 250, day(2))]);
    ctx.plans().submit_plan(&submitted.id, &planner).unwrap();

    let approved = plan(&ctx, "Approved", &[("SKU-001", 100, day(3))]);
    ctx.plans().submit_plan(&approved.id, &planner).unwrap();
    ctx.plans().approve_plan(&approved.id, &manager).unwrap();
    ctx.scheduler()
        .schedule_item(
            ScheduleRequest::for_item(&approved.id, &approved.items[0], "line3"),
            &ops(),
        )
        .unwrap();

    ctx
}

mod capacity_overview {
    use super::*;

    #[test]
    fn window_reflects_schedule_and_submitted_plans() {
        let ctx = populated();
        let overview = CapacityOverview::from_snapshot(&ctx.snapshot(), day(1), 14);

        assert_eq!(overview.count(), 14);
        assert_eq!(overview.days[0].total_capacity, 2300);
        assert_eq!(overview.days[0].scheduled_qty, 700);
        assert_eq!(overview.days[0].utilization, 30.4);
        assert_eq!(overview.days[1].submitted_qty, 250);
        assert_eq!(overview.days[1].scheduled_qty, 0);
        assert_eq!(overview.days[2].scheduled_qty, 100);
        assert_eq!(overview.days[13].total_demand, 0);
        assert_eq!(overview.peak().unwrap().date, day(1));
    }

    #[test]
    fn override_can_overload_a_day() {
        let ctx = context();
        let plan = plan(&ctx, "Rush", &[("SKU-001", 2400, day(1))]);
        ctx.plans()
            .submit_plan(&plan.id, &Actor::planner("Pat"))
            .unwrap();
        ctx.plans()
            .approve_plan(&plan.id, &Actor::manager("Mary"))
            .unwrap();
        ctx.scheduler()
            .schedule_item(
                ScheduleRequest::for_item(&plan.id, &plan.items[0], "line1")
                    .with_override("rush order"),
                &ops(),
            )
            .unwrap();

        let overview = CapacityOverview::from_snapshot(&ctx.snapshot(), day(1), 1);
        assert!(overview.days[0].is_overloaded);
        assert_eq!(overview.overloaded_days().count(), 1);
        assert_eq!(
            ctx.scheduler()
                .usage_for_line(&LineId::new("line1"), day(1)),
            2400
        );
    }

    #[test]
    fn zero_capacity_gives_empty_report() {
        let ctx = PlanningContext::new(LineRegistry::default(), Effects::tracing());
        let overview = CapacityOverview::from_snapshot(&ctx.snapshot(), day(1), 14);
        assert!(overview.is_empty());
    }
}

mod production_report {
    use super::*;

    #[test]
    fn only_finalized_plans_are_reported() {
        let ctx = populated();
        let report = ProductionReport::build(&ctx.snapshot(), &ReportFilter::default()).unwrap();

        assert_eq!(report.count(), 2);
        let skus: Vec<&str> = report.rows.iter().map(|row| row.sku.as_str()).collect();
        assert!(skus.contains(&"SKU-005"));
        assert!(skus.contains(&"SKU-006"));

        let produced = report.rows.iter().find(|row| row.sku == "SKU-005").unwrap();
        assert_eq!(produced.line_name, "Assembly Line 1");
        assert_eq!(produced.plan_name, "Finalized");
        assert_eq!(produced.produced_qty, 498);
        assert_eq!(produced.scrap, 2);
        assert_eq!(produced.variance, -2);

        let pending = report.rows.iter().find(|row| row.sku == "SKU-006").unwrap();
        assert_eq!(pending.produced_qty, 0);
        assert_eq!(pending.variance, -200);
        assert_eq!(report.total_planned(), 700);
    }

    #[test]
    fn filters_narrow_rows() {
        let ctx = populated();
        let snapshot = ctx.snapshot();

        let by_sku = ProductionReport::build(&snapshot, &ReportFilter::default().sku("sku-006"))
            .unwrap();
        assert_eq!(by_sku.count(), 1);

        let later = ProductionReport::build(&snapshot, &ReportFilter::default().since(day(2)))
            .unwrap();
        assert!(later.is_empty());

        let err = ProductionReport::build(
            &snapshot,
            &ReportFilter::default().since(day(3)).until(day(1)),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::InvalidRange { .. }));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let ctx = populated();
        let report = ProductionReport::build(&ctx.snapshot(), &ReportFilter::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let row = &json["rows"][0];
        assert!(row.get("plannedQty").is_some());
        assert!(row.get("lineName").is_some());
    }
}

mod daily_schedule {
    use super::*;

    #[test]
    fn runs_are_sorted_by_line_name_with_completion() {
        let ctx = populated();
        let schedule = DailySchedule::for_date(&ctx.snapshot(), day(1));

        let lines: Vec<&str> = schedule
            .runs
            .iter()
            .map(|run| run.line_name.as_str())
            .collect();
        assert_eq!(lines, vec!["Assembly Line 1", "Component Line A"]);
        assert!(schedule.runs[0].completed);
        assert!(!schedule.runs[1].completed);
        assert_eq!(schedule.pending().count(), 1);
    }

    #[test]
    fn empty_day_has_no_runs() {
        let ctx = populated();
        assert!(DailySchedule::for_date(&ctx.snapshot(), day(9)).is_empty());
    }
}
