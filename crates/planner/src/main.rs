//! Planner entry point.

use std::process::ExitCode;

use chrono::Utc;
use planner::{AppError, Config};

fn main() -> ExitCode {
    // 1. Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("planner: {error}");
            return ExitCode::FAILURE;
        }
    };

    // 2. Initialize tracing
    if let Err(error) = planner::observability::init_tracing(&config) {
        eprintln!("planner: {error}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "planner run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), AppError> {
    // 3. Install Prometheus metrics recorder
    let metrics_handle = planner::observability::install_metrics()?;

    // 4. Build, seed and report
    let report = planner::run(config, Utc::now().date_naive())?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if config.emit_metrics {
        println!("{}", metrics_handle.render());
    }
    Ok(())
}
