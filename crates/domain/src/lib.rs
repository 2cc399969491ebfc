//! Planning core for the production planning system.
//!
//! This crate provides:
//! - Demand pool with demand approval and allocation to plans
//! - Production plan lifecycle (draft, review, approval, finalization)
//! - Capacity scheduler placing plan items onto production lines
//! - Shop-floor production log
//! - Audit and notification sinks, routed through [`Effects`]
//!
//! Components are plain handles over shared in-memory state and are wired
//! together by [`PlanningContext`].

pub mod aggregate;
pub mod audit;
pub mod context;
pub mod demand;
pub mod effects;
pub mod error;
mod lock;
pub mod notification;
pub mod plan;
pub mod production;
pub mod schedule;

pub use aggregate::{Aggregate, DomainEvent};
pub use audit::{AuditEntry, AuditSink, InMemoryAuditLog, SinkError, TracingAuditSink};
pub use context::{PlanningContext, PlanningSnapshot};
pub use demand::{Demand, DemandEvent, DemandPool, DemandStatus, NewDemand};
pub use effects::Effects;
pub use error::{DomainError, ErrorKind, Result};
pub use notification::{
    InMemoryNotifications, Notification, NotificationKind, NotificationSink,
    TracingNotificationSink,
};
pub use plan::{PlanEvent, PlanItem, PlanService, PlanStatus, ProductionPlan};
pub use production::{LogProduction, ProductionLog, ProductionUpdate};
pub use schedule::{
    CapacityConflict, CapacityScheduler, LineRegistry, ProductionLine, ScheduleItem,
    ScheduleRequest,
};
