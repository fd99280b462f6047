use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use strokerisk_model::PredictionService;

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Scoring over the model loaded at startup
    pub service: PredictionService,

    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Prometheus handle for rendering; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Batch size cap is taken from `config`
    pub fn new(service: PredictionService, config: ServerConfig) -> Self {
        Self {
            service: service.with_max_batch_items(config.max_batch_items),
            config: Arc::new(config),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
