//! Domain error types.

use common::{LineId, Version};
use thiserror::Error;

/// Coarse classification of a [`DomainError`].
///
/// Callers branch on the kind to decide whether to prompt for an override
/// reason (capacity), reload and retry (conflict), or reject outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    InvalidState,
    NotFound,
    CapacityExceeded,
    Conflict,
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input: empty name, zero quantity, blank required reason.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The record's status forbids the requested operation.
    #[error("Invalid state: cannot {action} {entity} {id} in {current} state")]
    InvalidState {
        entity: &'static str,
        id: String,
        current: String,
        action: &'static str,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Admitting the quantity would exceed the line's daily capacity.
    #[error(
        "Capacity exceeded on {line_name} ({line_id}): projected {projected} of {capacity}, over by {overage}"
    )]
    CapacityExceeded {
        line_id: LineId,
        line_name: String,
        capacity: u64,
        projected: u64,
        overage: u64,
    },

    /// The caller edited a stale copy of the record.
    #[error("Concurrency conflict for {entity} {id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        entity: &'static str,
        id: String,
        expected: Version,
        actual: Version,
    },
}

impl DomainError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_state(
        entity: &'static str,
        id: impl ToString,
        current: impl ToString,
        action: &'static str,
    ) -> Self {
        DomainError::InvalidState {
            entity,
            id: id.to_string(),
            current: current.to_string(),
            action,
        }
    }

    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation { .. } => ErrorKind::Validation,
            DomainError::InvalidState { .. } => ErrorKind::InvalidState,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            DomainError::ConcurrencyConflict { .. } => ErrorKind::Conflict,
        }
    }

    /// Returns the overage if this is a capacity rejection.
    pub fn overage(&self) -> Option<u64> {
        match self {
            DomainError::CapacityExceeded { overage, .. } => Some(*overage),
            _ => None,
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Fails with a validation error when `value` is empty or whitespace.
pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    Ok(())
}

/// Fails with a validation error when `quantity` is zero.
pub(crate) fn require_positive(field: &'static str, quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(DomainError::validation(
            field,
            format!("{quantity} (must be greater than 0)"),
        ));
    }
    Ok(())
}
