use std::process::ExitCode;

use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use transit_graph::pipeline::{PipelineConfig, run};

fn init_logging() {
    let default_level = LevelFilter::INFO;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|err| {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            eprintln!(
                "invalid {}, falling back to level '{}' - {}",
                EnvFilter::DEFAULT_ENV,
                default_level,
                err
            );
        }
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(summary) => {
            println!(
                "{} stations, {} edges ({} updated, {} new), {} journeys",
                summary.stations, summary.edges, summary.updates, summary.inserts, summary.journeys
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Graph build failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
