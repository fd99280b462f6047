//! HTTP error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use strokerisk_core::FieldError;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::telemetry;

/// Errors surfaced by request handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input fields failed validation
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// Body could not be read or decoded
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    /// The model could not score the request
    #[error("{0}")]
    Model(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// `validation_error`, `invalid_request_error`, `model_error`, `not_found` or `internal_error`
    #[serde(rename = "type")]
    pub kind: String,

    pub message: String,

    /// Present on validation errors only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidBody { status, .. } => *status,
            Self::Model(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Value of `error.type` in the response body
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::InvalidBody { .. } => "invalid_request_error",
            Self::Model(_) => "model_error",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<strokerisk_core::Error> for AppError {
    fn from(err: strokerisk_core::Error) -> Self {
        if err.is_client_error() {
            return AppError::Validation {
                fields: err.field_errors(),
                message: err.to_string(),
            };
        }

        match err {
            strokerisk_core::Error::Model(msg) => AppError::Model(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            other => other.status(),
        };

        AppError::InvalidBody {
            status,
            message: rejection.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("scoring task failed: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        if status.is_server_error() {
            error!("Request failed ({}): {}", kind, self);
        } else {
            warn!("Request rejected ({}): {}", kind, self);
        }
        telemetry::record_error(kind);

        let (message, fields) = match self {
            AppError::Validation { message, fields } => (message, Some(fields)),
            other => (other.to_string(), None),
        };
        let body = ErrorResponse {
            error: ErrorDetail {
                kind: kind.to_string(),
                message,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strokerisk_core::{Error, ValidationError};

    #[test]
    fn test_validation_maps_to_422() {
        let err: AppError = Error::from(ValidationError::single("age", "age must be at most 150")).into();

        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.kind(), "validation_error");
        assert!(matches!(&err, AppError::Validation { fields, .. } if fields[0].field == "age"));
    }

    #[test]
    fn test_invalid_flag_maps_to_422() {
        let err: AppError = Error::from(FieldError::new("heart_disease", "heart_disease must be 0/1 or boolean")).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_model_error_maps_to_500() {
        let err: AppError = Error::model("model does not support predict_proba (LinearSVC)").into();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "model_error");
        assert_eq!(err.to_string(), "model does not support predict_proba (LinearSVC)");
    }

    #[test]
    fn test_fields_only_serialized_for_validation() {
        let body = ErrorResponse {
            error: ErrorDetail {
                kind: "model_error".to_string(),
                message: "boom".to_string(),
                fields: None,
            },
        };

        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({ "error": { "type": "model_error", "message": "boom" } })
        );
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err: AppError = Error::internal("boom").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "internal_error");
    }
}
