use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AllowedOrigins, CorsConfig};
use crate::server::openapi::{ApiDoc, DOCS_PATH, OPENAPI_PATH};
use crate::server::routes;
use crate::state::AppState;

/// Build the Axum application
pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config.cors)?;
    let body_limit = state.config.body_limit_bytes;

    Ok(Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/meta", get(routes::meta))
        .route("/predict", post(routes::predict))
        .route("/predict/batch", post(routes::predict_batch))
        .route("/metrics", get(routes::metrics))
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        .fallback(routes::fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// `*` allows any origin without credentials; an explicit list allows credentials
pub fn cors_layer(cors: &CorsConfig) -> anyhow::Result<CorsLayer> {
    let layer = match cors.origins()? {
        AllowedOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        AllowedOrigins::List(origins) => CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    };

    Ok(layer)
}
