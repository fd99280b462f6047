//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Uri},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::time::Instant;
use strokerisk_core::{BatchRequest, BatchResponse, PredictionRequest, PredictionResult};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{AppError, ErrorResponse};
use crate::state::AppState;
use crate::telemetry;

pub const ROOT_MESSAGE: &str = "Stroke API is running. Use /docs for API documentation.";

/// Body of `GET /meta`
#[derive(Debug, Serialize, ToSchema)]
pub struct MetaResponse {
    /// Feature columns in the order the model consumes them
    #[schema(value_type = Vec<String>)]
    pub expected_columns: &'static [&'static str],

    /// Class name of the final pipeline step, if the model reports one
    pub classifier: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Greeting pointing at the API docs", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

/// Column order and classifier name; never fails
#[utoipa::path(
    get,
    path = "/meta",
    tag = "service",
    responses((status = 200, description = "Model metadata", body = MetaResponse))
)]
pub async fn meta(State(state): State<AppState>) -> Json<MetaResponse> {
    telemetry::record_request("meta");

    Json(MetaResponse {
        expected_columns: state.service.expected_columns(),
        classifier: state.service.classifier_name(),
    })
}

/// Score one patient record
#[utoipa::path(
    post,
    path = "/predict",
    tag = "prediction",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Probability and thresholded prediction", body = PredictionResult),
        (status = 413, description = "Body larger than the configured limit"),
        (status = 422, description = "Malformed body or invalid fields", body = ErrorResponse),
        (status = 500, description = "The model could not score the record", body = ErrorResponse)
    )
)]
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>, AppError> {
    telemetry::record_request("predict");
    let Json(request) = payload?;

    let service = state.service.clone();
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(move || service.predict_one(&request)).await??;
    telemetry::record_latency("predict", start.elapsed());
    telemetry::record_predictions(std::slice::from_ref(&result));

    debug!(
        probability = result.probability,
        prediction = result.prediction,
        "prediction complete"
    );

    Ok(Json(result))
}

/// Score several records with one model call; results keep input order
#[utoipa::path(
    post,
    path = "/predict/batch",
    tag = "prediction",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "One result per item, in input order", body = BatchResponse),
        (status = 413, description = "Body larger than the configured limit"),
        (status = 422, description = "Malformed body, invalid item, empty or oversized batch", body = ErrorResponse),
        (status = 500, description = "The model could not score the batch", body = ErrorResponse)
    )
)]
pub async fn predict_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, AppError> {
    telemetry::record_request("predict_batch");
    let Json(batch) = payload?;
    let items = batch.len();

    let service = state.service.clone();
    let start = Instant::now();
    let results = tokio::task::spawn_blocking(move || service.predict_batch(&batch)).await??;
    let elapsed = start.elapsed();
    telemetry::record_latency("predict_batch", elapsed);
    telemetry::record_predictions(&results);

    info!(
        "Scored batch of {} items in {}us",
        items,
        elapsed.as_micros()
    );

    Ok(Json(BatchResponse { results }))
}

/// Prometheus text exposition; empty without a recorder
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

pub async fn fallback(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}
