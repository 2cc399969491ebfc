//! Side-effect routing for audit entries and notifications.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::Actor;

use crate::audit::{AuditEntry, AuditSink, TracingAuditSink};
use crate::notification::{NotificationKind, NotificationSink, TracingNotificationSink};

/// Bundles the audit and notification sinks shared by all components.
///
/// Emission never fails: sink errors are logged at `warn` and dropped.
#[derive(Clone)]
pub struct Effects {
    audit: Arc<dyn AuditSink>,
    notifications: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for Effects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effects").finish_non_exhaustive()
    }
}

impl Effects {
    /// Creates effects routed to the given sinks.
    pub fn new(audit: Arc<dyn AuditSink>, notifications: Arc<dyn NotificationSink>) -> Self {
        Self {
            audit,
            notifications,
        }
    }

    /// Creates effects that only write to tracing.
    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingAuditSink), Arc::new(TracingNotificationSink))
    }

    /// Records an audit entry for `actor`.
    pub fn audit(&self, actor: &Actor, description: impl Into<String>, at: DateTime<Utc>) {
        let entry = AuditEntry::new(actor, description, at);
        if let Err(error) = self.audit.record(entry) {
            tracing::warn!(%error, actor = %actor.name, "audit sink rejected entry");
        }
    }

    /// Publishes a notification.
    pub fn notify(&self, kind: NotificationKind, message: &str) {
        if let Err(error) = self.notifications.notify(kind, message) {
            tracing::warn!(%error, %kind, "notification sink rejected message");
        }
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::tracing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{InMemoryAuditLog, SinkError};
    use crate::notification::InMemoryNotifications;

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn record(&self, _entry: AuditEntry) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("disk full".to_string()))
        }
    }

    impl NotificationSink for FailingSink {
        fn notify(&self, _kind: NotificationKind, _message: &str) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_routes_to_configured_sinks() {
        let log = InMemoryAuditLog::new();
        let centre = InMemoryNotifications::new();
        let effects = Effects::new(Arc::new(log.clone()), Arc::new(centre.clone()));

        effects.audit(&Actor::planner("Pat Planner"), "Created plan", Utc::now());
        effects.notify(NotificationKind::Info, "Plan submitted");

        assert_eq!(log.descriptions(), vec!["Created plan"]);
        assert_eq!(centre.active()[0].message, "Plan submitted");
    }

    #[test]
    fn test_sink_failures_are_swallowed() {
        let effects = Effects::new(Arc::new(FailingSink), Arc::new(FailingSink));
        effects.audit(&Actor::planner("Pat Planner"), "anything", Utc::now());
        effects.notify(NotificationKind::Error, "anything");
    }
}
