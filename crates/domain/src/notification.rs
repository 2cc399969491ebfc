//! User-facing notification sinks.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::audit::SinkError;
use crate::lock;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification shown to users until dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

/// Trait for notification sinks.
pub trait NotificationSink: Send + Sync {
    /// Publishes a notification.
    fn notify(&self, kind: NotificationKind, message: &str) -> Result<(), SinkError>;
}

/// Notification sink that writes to the `notification` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, kind: NotificationKind, message: &str) -> Result<(), SinkError> {
        match kind {
            NotificationKind::Error => {
                tracing::warn!(target: "notification", kind = %kind, "{message}")
            }
            NotificationKind::Success | NotificationKind::Info => {
                tracing::info!(target: "notification", kind = %kind, "{message}")
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct NotificationState {
    active: Vec<Notification>,
    next_id: u64,
}

/// In-memory notification centre keeping active notifications in arrival order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifications {
    state: Arc<RwLock<NotificationState>>,
}

impl InMemoryNotifications {
    /// Creates an empty notification centre.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notifications that have not been dismissed.
    pub fn active(&self) -> Vec<Notification> {
        lock::read(&self.state).active.clone()
    }

    /// Dismisses a notification. Returns false if it was not active.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = lock::write(&self.state);
        let before = state.active.len();
        state.active.retain(|n| n.id != id);
        state.active.len() != before
    }
}

impl NotificationSink for InMemoryNotifications {
    fn notify(&self, kind: NotificationKind, message: &str) -> Result<(), SinkError> {
        let mut state = lock::write(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.active.push(Notification {
            id,
            kind,
            message: message.to_string(),
        });
        Ok(())
    }
}
