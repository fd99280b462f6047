//! Logging and Prometheus metrics
//!
//! Metric calls are no-ops until [`init_metrics`] installs a recorder, so
//! handlers record unconditionally and tests run without one.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use strokerisk_core::PredictionResult;
use tracing::info;

use crate::cli::LogFormat;

pub const REQUESTS_TOTAL: &str = "strokerisk_requests_total";
pub const PREDICTIONS_TOTAL: &str = "strokerisk_predictions_total";
pub const ERRORS_TOTAL: &str = "strokerisk_errors_total";
pub const MODEL_LATENCY_US: &str = "strokerisk_model_latency_us";

/// Initialize tracing/logging
pub fn init_tracing(verbose: bool, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("strokerisk=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("strokerisk=info,tower_http=info"))
    };

    let (json, text) = match format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Text => (None, Some(fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

/// Install the Prometheus recorder and return handle for rendering
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Total number of requests by endpoint");
    metrics::describe_counter!(
        PREDICTIONS_TOTAL,
        "Total number of scored items by outcome (positive/negative)"
    );
    metrics::describe_counter!(ERRORS_TOTAL, "Total number of error responses by type");
    metrics::describe_histogram!(
        MODEL_LATENCY_US,
        metrics::Unit::Microseconds,
        "Scoring latency in microseconds by endpoint"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}

pub fn record_request(endpoint: &'static str) {
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint).increment(1);
}

pub fn record_latency(endpoint: &'static str, elapsed: Duration) {
    metrics::histogram!(MODEL_LATENCY_US, "endpoint" => endpoint).record(elapsed.as_micros() as f64);
}

pub fn record_predictions(results: &[PredictionResult]) {
    let positive = results.iter().filter(|r| r.is_positive()).count() as u64;
    let negative = results.len() as u64 - positive;

    if positive > 0 {
        metrics::counter!(PREDICTIONS_TOTAL, "outcome" => "positive").increment(positive);
    }
    if negative > 0 {
        metrics::counter!(PREDICTIONS_TOTAL, "outcome" => "negative").increment(negative);
    }
}

pub fn record_error(kind: &'static str) {
    metrics::counter!(ERRORS_TOTAL, "kind" => kind).increment(1);
}
