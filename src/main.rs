//! Boardsync CLI entrypoint for board reconciliation.

use std::io::{self, Write};
use std::process::ExitCode;

use boardsync::github::rate_limit::RetryHint;
use boardsync::{
    BoardError, BoardsyncConfig, OctocrabGraphQlGateway, ReconciliationEngine, RunManifest,
    RunSummary,
};
use chrono::Utc;
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

/// Installs a stderr log subscriber filtered by `RUST_LOG`, default `info`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), BoardError> {
    let config = load_config()?;

    let token = config.resolve_token()?;
    let endpoint = config.graphql_endpoint()?;
    let manifest = RunManifest::load(config.require_manifest()?)?;
    let request = config.reconcile_request(manifest)?;

    let gateway = OctocrabGraphQlGateway::for_token(&token, endpoint)?;
    let engine = ReconciliationEngine::new(&gateway);

    tokio::select! {
        outcome = engine.run(&request) => write_summary(&outcome?),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|error| BoardError::Io {
                message: format!("failed to listen for Ctrl-C: {error}"),
            })?;
            tracing::warn!(title = %request.title, "run interrupted; applied changes are kept");
            Err(BoardError::Io {
                message: "interrupted before the run completed".to_owned(),
            })
        }
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`BoardError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<BoardsyncConfig, BoardError> {
    BoardsyncConfig::load().map_err(|error| BoardError::Configuration {
        message: error.to_string(),
    })
}

fn write_summary(summary: &RunSummary) -> Result<(), BoardError> {
    let mut stdout = io::stdout().lock();
    let to_io = |error: io::Error| BoardError::Io {
        message: error.to_string(),
    };

    write!(stdout, "{summary}").map_err(to_io)?;
    if let Some(issue) = summary.rate_limit_issue() {
        let hint = RetryHint::new(issue.error.retry_after(), Utc::now());
        writeln!(
            stdout,
            "Rate limited during {}: {}",
            issue.stage.as_str(),
            hint.describe()
        )
        .map_err(to_io)?;
    }
    Ok(())
}
