//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use domain::{LineRegistry, ProductionLine};
use thiserror::Error;

use crate::error::AppError;

/// Errors raised for malformed configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Output format of the log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "PLANNER_LOG_FORMAT",
                value: value.to_string(),
                reason: "expected text or json",
            }),
        }
    }
}

/// Runner configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `PLANNER_LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `PLANNER_LINES_FILE`: JSON array of `{id, name, dailyCapacity}`
///   (default: the three reference lines)
/// - `PLANNER_WINDOW_DAYS`: capacity window length (default: `14`)
/// - `PLANNER_START_DATE`: first window date, `YYYY-MM-DD` (default: today)
/// - `PLANNER_SEED`: load the reference scenario (default: `true`)
/// - `PLANNER_EMIT_METRICS`: print the Prometheus snapshot (default: `false`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub lines_file: Option<PathBuf>,
    pub window_days: u32,
    pub start_date: Option<NaiveDate>,
    pub seed: bool,
    pub emit_metrics: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("PLANNER_LOG_FORMAT")
                .map(|value| value.parse())
                .transpose()?
                .unwrap_or(defaults.log_format),
            lines_file: lookup("PLANNER_LINES_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            window_days: lookup("PLANNER_WINDOW_DAYS")
                .map(|value| parse_window(&value))
                .transpose()?
                .unwrap_or(defaults.window_days),
            start_date: lookup("PLANNER_START_DATE")
                .map(|value| parse_date(&value))
                .transpose()?,
            seed: lookup("PLANNER_SEED")
                .map(|value| parse_flag("PLANNER_SEED", &value))
                .transpose()?
                .unwrap_or(defaults.seed),
            emit_metrics: lookup("PLANNER_EMIT_METRICS")
                .map(|value| parse_flag("PLANNER_EMIT_METRICS", &value))
                .transpose()?
                .unwrap_or(defaults.emit_metrics),
        })
    }

    /// Returns the first date of the capacity window.
    pub fn window_start(&self, today: NaiveDate) -> NaiveDate {
        self.start_date.unwrap_or(today)
    }

    /// Loads the line registry from `lines_file`, or the reference lines.
    pub fn load_lines(&self) -> Result<LineRegistry, AppError> {
        let lines = match &self.lines_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| AppError::Io {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&raw)?
            }
            None => reference_lines(),
        };
        Ok(LineRegistry::new(lines)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            lines_file: None,
            window_days: 14,
            start_date: None,
            seed: true,
            emit_metrics: false,
        }
    }
}

/// The three reference production lines.
pub fn reference_lines() -> Vec<ProductionLine> {
    vec![
        ProductionLine::new("line1", "Assembly Line 1", 1000),
        ProductionLine::new("line2", "Component Line A", 500),
        ProductionLine::new("line3", "Finishing Line", 800),
    ]
}

fn parse_window(value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .ok()
        .filter(|days| *days > 0)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: "PLANNER_WINDOW_DAYS",
            value: value.to_string(),
            reason: "expected a positive number of days",
        })
}

fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidValue {
        key: "PLANNER_START_DATE",
        value: value.to_string(),
        reason: "expected YYYY-MM-DD",
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected true or false",
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.window_days, 14);
        assert!(config.seed);
        assert!(!config.emit_metrics);
        assert!(config.lines_file.is_none());
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        assert_eq!(config(&[]).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("RUST_LOG", "debug"),
            ("PLANNER_LOG_FORMAT", "JSON"),
            ("PLANNER_WINDOW_DAYS", "7"),
            ("PLANNER_START_DATE", "2024-08-01"),
            ("PLANNER_SEED", "false"),
            ("PLANNER_EMIT_METRICS", "1"),
            ("PLANNER_LINES_FILE", "/etc/planner/lines.json"),
        ])
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.window_days, 7);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 8, 1));
        assert!(!config.seed);
        assert!(config.emit_metrics);
        assert_eq!(
            config.lines_file,
            Some(PathBuf::from("/etc/planner/lines.json"))
        );
    }

    #[test]
    fn test_invalid_values_are_reported() {
        for (key, value) in [
            ("PLANNER_WINDOW_DAYS", "0"),
            ("PLANNER_WINDOW_DAYS", "soon"),
            ("PLANNER_START_DATE", "01/08/2024"),
            ("PLANNER_SEED", "maybe"),
            ("PLANNER_LOG_FORMAT", "xml"),
        ] {
            let err = config(&[(key, value)]).unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }

    #[test]
    fn test_window_start_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 9).unwrap();
        assert_eq!(Config::default().window_start(today), today);
    }

    #[test]
    fn test_reference_lines_load_without_file() {
        let lines = Config::default().load_lines().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.total_capacity(), 2300);
    }
}
