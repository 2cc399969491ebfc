//! Shop-floor production log.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use common::{Actor, ProductionUpdateId, ScheduleItemId};
use serde::{Deserialize, Serialize};

use crate::effects::Effects;
use crate::error::{DomainError, Result};
use crate::lock;
use crate::schedule::CapacityScheduler;

/// Produced quantity and scrap reported against a schedule item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionUpdate {
    pub id: ProductionUpdateId,
    pub schedule_item_id: ScheduleItemId,
    pub quantity_produced: u32,
    pub scrap: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// A shop-floor report to be logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogProduction {
    pub schedule_item_id: ScheduleItemId,
    pub quantity_produced: u32,
    pub scrap: u32,
    pub reason: Option<String>,
}

impl LogProduction {
    pub fn new(
        schedule_item_id: impl Into<ScheduleItemId>,
        quantity_produced: u32,
        scrap: u32,
    ) -> Self {
        Self {
            schedule_item_id: schedule_item_id.into(),
            quantity_produced,
            scrap,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Append-only log of production updates.
#[derive(Debug, Clone)]
pub struct ProductionLog {
    updates: Arc<RwLock<Vec<ProductionUpdate>>>,
    scheduler: CapacityScheduler,
    effects: Effects,
}

impl ProductionLog {
    pub fn new(scheduler: CapacityScheduler, effects: Effects) -> Self {
        Self {
            updates: Arc::new(RwLock::new(Vec::new())),
            scheduler,
            effects,
        }
    }

    pub(crate) fn book(&self) -> &RwLock<Vec<ProductionUpdate>> {
        &self.updates
    }

    /// Records produced and scrapped quantities for a schedule item.
    ///
    /// A reason is required when output differs from the scheduled quantity
    /// or any scrap is reported.
    #[tracing::instrument(skip(self, report), fields(schedule_item_id = %report.schedule_item_id))]
    pub fn log_update(&self, report: LogProduction, actor: &Actor) -> Result<ProductionUpdate> {
        let now = Utc::now();
        let schedule = lock::read(self.scheduler.book());
        let item = schedule
            .get(&report.schedule_item_id)
            .ok_or_else(|| DomainError::not_found("ScheduleItem", &report.schedule_item_id))?;

        let reason = report
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty());
        let deviates = report.quantity_produced != item.quantity || report.scrap > 0;
        if deviates && reason.is_none() {
            return Err(DomainError::validation(
                "reason",
                "required when production does not match the plan or scrap is reported",
            ));
        }

        let update = ProductionUpdate {
            id: ProductionUpdateId::generate(),
            schedule_item_id: report.schedule_item_id.clone(),
            quantity_produced: report.quantity_produced,
            scrap: report.scrap,
            reason: reason.map(str::to_string),
            updated_at: now,
            updated_by: actor.name.clone(),
        };
        lock::write(&self.updates).push(update.clone());
        drop(schedule);

        metrics::counter!("production_updates_logged_total").increment(1);
        tracing::info!(
            produced = update.quantity_produced,
            scrap = update.scrap,
            "production logged"
        );
        self.effects.audit(
            actor,
            format!(
                "Logged production for schedule item {}: {} produced, {} scrap.",
                update.schedule_item_id, update.quantity_produced, update.scrap
            ),
            now,
        );
        Ok(update)
    }

    /// Returns all updates in logging order.
    pub fn updates(&self) -> Vec<ProductionUpdate> {
        lock::read(&self.updates).clone()
    }

    pub fn for_schedule_item(&self, id: &ScheduleItemId) -> Vec<ProductionUpdate> {
        lock::read(&self.updates)
            .iter()
            .filter(|update| &update.schedule_item_id == id)
            .cloned()
            .collect()
    }

    /// Returns the most recent update for a schedule item.
    pub fn latest_for(&self, id: &ScheduleItemId) -> Option<ProductionUpdate> {
        lock::read(&self.updates)
            .iter()
            .rev()
            .find(|update| &update.schedule_item_id == id)
            .cloned()
    }
}
