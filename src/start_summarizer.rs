//! Startup helpers for the summarizer server and CLI.
//!
//! Loading the model is the only fatal step: a missing or malformed artifact
//! aborts startup instead of surfacing per request.

use std::process::ExitCode;
use std::sync::Arc;

use crate::core::config::SummarizerConfig;
use crate::core::errors::SummarizerResult;
use crate::server::{self, AppState, DynEngine};
use crate::summarization::SummarizationService;

/// Install the global `tracing` subscriber (INFO unless `RUST_LOG` says otherwise).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the server (used by the `summarizer-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    tracing::info!("Starting text summarizer v{}", env!("CARGO_PKG_VERSION"));

    let config = match SummarizerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let state = match initialize(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to load summarization model: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl+C handler failed: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down");
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, config.server.port, shutdown)) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Load the model and build the summarization service.
///
/// # Errors
/// Returns an error if the configuration is invalid or the artifacts cannot be loaded.
pub fn load_service(config: &SummarizerConfig) -> SummarizerResult<SummarizationService<DynEngine>> {
    SummarizationService::from_config(config)
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if the model cannot be loaded.
pub fn initialize(config: &SummarizerConfig) -> SummarizerResult<Arc<AppState>> {
    Ok(AppState::new(load_service(config)?))
}
