//! OpenAPI document for the HTTP surface, served at `/openapi.json` and
//! rendered by Swagger UI at `/docs`.

use strokerisk_core::{
    BatchRequest, BatchResponse, FieldError, FlagInput, PredictionRequest, PredictionResult,
};
use utoipa::OpenApi;

use crate::error::{ErrorDetail, ErrorResponse};
use crate::server::routes::{HealthResponse, MetaResponse, RootResponse};

/// Path of the generated document
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Mount point of the interactive docs
pub const DOCS_PATH: &str = "/docs";

/// StrokeRisk API documentation.
///
/// Only handlers annotated with `#[utoipa::path]` are listed; `/metrics`
/// is left out on purpose as it is scraped, not called.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::server::routes::root,
        crate::server::routes::health,
        crate::server::routes::meta,
        crate::server::routes::predict,
        crate::server::routes::predict_batch,
    ),
    components(schemas(
        PredictionRequest,
        FlagInput,
        BatchRequest,
        PredictionResult,
        BatchResponse,
        FieldError,
        MetaResponse,
        HealthResponse,
        RootResponse,
        ErrorResponse,
        ErrorDetail,
    )),
    tags(
        (name = "prediction", description = "Stroke risk scoring"),
        (name = "service", description = "Liveness and model metadata")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_covers_scoring_routes() {
        let doc = ApiDoc::openapi();

        for path in ["/", "/health", "/meta", "/predict", "/predict/batch"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(!doc.paths.paths.contains_key("/metrics"));
    }

    #[test]
    fn test_flag_fields_reference_flag_schema() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let request = &doc["components"]["schemas"]["PredictionRequest"];

        assert!(request["properties"]["hypertension"]
            .to_string()
            .contains("#/components/schemas/FlagInput"));
        let required: Vec<&str> = request["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"age"));
        assert!(!required.contains(&"threshold"));
        assert!(!required.contains(&"smoking_status"));
    }
}
