//! Application error type.

use std::path::PathBuf;

use domain::DomainError;
use projections::ReportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort a planner run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Failed to install log subscriber: {0}")]
    Logging(String),
}
