//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while building a report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// The filter's start date lies after its end date.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
