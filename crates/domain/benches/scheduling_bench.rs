use chrono::NaiveDate;
use common::{Actor, LineId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Effects, LineRegistry, NewDemand, PlanningContext, ProductionLine, ProductionPlan,
    ScheduleRequest,
};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 1).unwrap()
}

fn context() -> PlanningContext {
    let lines = LineRegistry::new(vec![
        ProductionLine::new("line1", "Assembly Line 1", 1000),
        ProductionLine::new("line2", "Component Line A", 500),
    ])
    .unwrap();
    PlanningContext::new(lines, Effects::tracing())
}

fn approved_plan(ctx: &PlanningContext, demands: u32) -> ProductionPlan {
    let planner = Actor::planner("Bench Planner");
    let manager = Actor::manager("Bench Manager");
    let pool = ctx.demands();
    let approved: Vec<_> = (0..demands)
        .map(|n| {
            let demand = pool
                .create(NewDemand::new(format!("SKU-{n:03}"), 10, date()), &planner)
                .unwrap();
            pool.submit(&demand.id, &planner).unwrap();
            pool.approve(&demand.id, &manager).unwrap()
        })
        .collect();
    let plan = ctx
        .plans()
        .create_plan("Bench", &approved, &planner)
        .unwrap();
    ctx.plans().submit_plan(&plan.id, &planner).unwrap();
    ctx.plans().approve_plan(&plan.id, &manager).unwrap()
}

fn bench_schedule_item(c: &mut Criterion) {
    let ctx = context();
    let plan = approved_plan(&ctx, 1);
    let ops = Actor::operations_head("Bench Ops");

    c.bench_function("scheduling/schedule_item_with_override", |b| {
        b.iter(|| {
            ctx.scheduler()
                .schedule_item(
                    ScheduleRequest::for_item(&plan.id, &plan.items[0], "line1")
                        .with_override("bench"),
                    &ops,
                )
                .unwrap();
        });
    });
}

fn bench_check_capacity(c: &mut Criterion) {
    let ctx = context();
    let plan = approved_plan(&ctx, 50);
    let ops = Actor::operations_head("Bench Ops");
    for item in &plan.items {
        ctx.scheduler()
            .schedule_item(ScheduleRequest::for_item(&plan.id, item, "line2"), &ops)
            .unwrap();
    }
    let line = LineId::new("line2");

    c.bench_function("scheduling/check_capacity", |b| {
        b.iter(|| ctx.scheduler().check_capacity(&line, date(), 10).unwrap());
    });
}

fn bench_plan_lifecycle(c: &mut Criterion) {
    c.bench_function("scheduling/create_submit_approve_plan", |b| {
        b.iter(|| {
            let ctx = context();
            approved_plan(&ctx, 5)
        });
    });
}

criterion_group!(
    benches,
    bench_schedule_item,
    bench_check_capacity,
    bench_plan_lifecycle
);
criterion_main!(benches);
