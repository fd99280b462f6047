//! StrokeRisk Server
//!
//! Loads the fitted stroke pipeline once at startup and serves single and
//! batch risk predictions over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use strokerisk_model::{load_model, PredictionService};
use strokerisk_server::telemetry::{init_metrics, init_tracing};
use strokerisk_server::{build_app, AppState, Cli, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    info!("Starting StrokeRisk server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load(&cli)?;
    info!("Configuration loaded successfully");
    info!("Model path: {}", config.model_path.display());
    info!("Allowed origins: {}", config.cors.allowed_origins);
    info!("Max batch items: {}", config.max_batch_items);

    let metrics_handle = init_metrics()?;

    // Load failure is fatal; nothing is bound until the model is ready
    let model = load_model(&config.model_path)
        .with_context(|| format!("failed to load model from {}", config.model_path.display()))?;
    let service = PredictionService::new(model);
    if let Some(classifier) = service.classifier_name() {
        info!("Classifier: {}", classifier);
    }

    let addr = config.socket_addr()?;
    let state = AppState::new(service, config).with_metrics(metrics_handle);
    let app = build_app(state)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
