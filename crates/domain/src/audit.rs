//! Audit trail sinks.
//!
//! Every successful mutating operation records one human-readable entry.
//! Sinks are fire-and-forget from the core's point of view: a failing sink
//! is logged and never affects the operation that produced the entry.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use common::{Actor, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lock;

/// Error reported by an audit or notification sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink could not accept the entry.
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// A single audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub actor_name: String,
    pub actor_role: Role,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates an entry for `actor` stamped with `timestamp`.
    pub fn new(actor: &Actor, description: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            actor_name: actor.name.clone(),
            actor_role: actor.role,
            description: description.into(),
            timestamp,
        }
    }
}

/// Trait for audit trail sinks.
pub trait AuditSink: Send + Sync {
    /// Records an audit entry.
    fn record(&self, entry: AuditEntry) -> Result<(), SinkError>;
}

/// Audit sink that writes entries to the `audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) -> Result<(), SinkError> {
        tracing::info!(
            target: "audit",
            actor = %entry.actor_name,
            role = %entry.actor_role,
            timestamp = %entry.timestamp,
            "{}",
            entry.description
        );
        Ok(())
    }
}

/// In-memory audit trail, newest entry first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    /// Creates an empty audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all entries, newest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        lock::read(&self.entries).clone()
    }

    /// Returns the descriptions of all entries, newest first.
    pub fn descriptions(&self) -> Vec<String> {
        lock::read(&self.entries)
            .iter()
            .map(|entry| entry.description.clone())
            .collect()
    }

    /// Returns the most recent entry.
    pub fn latest(&self) -> Option<AuditEntry> {
        lock::read(&self.entries).first().cloned()
    }

    pub fn len(&self) -> usize {
        lock::read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) -> Result<(), SinkError> {
        lock::write(&self.entries).insert(0, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_log_is_newest_first() {
        let log = InMemoryAuditLog::new();
        let actor = Actor::planner("Pat Planner");

        log.record(AuditEntry::new(&actor, "first", Utc::now())).unwrap();
        log.record(AuditEntry::new(&actor, "second", Utc::now())).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.descriptions(), vec!["second", "first"]);
        assert_eq!(log.latest().unwrap().description, "second");
    }

    #[test]
    fn test_entry_copies_actor_identity() {
        let actor = Actor::operations_head("Olivia Ops");
        let entry = AuditEntry::new(&actor, "Finalized", Utc::now());
        assert_eq!(entry.actor_name, "Olivia Ops");
        assert_eq!(entry.actor_role, Role::OperationsHead);
    }

    #[test]
    fn test_clones_share_entries() {
        let log = InMemoryAuditLog::new();
        let handle = log.clone();
        handle
            .record(AuditEntry::new(&Actor::planner("Pat"), "x", Utc::now()))
            .unwrap();
        assert!(!log.is_empty());
    }
}
