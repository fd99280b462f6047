//! Error types for StrokeRisk

use crate::validation::{FieldError, ValidationError};

/// Result type alias using StrokeRisk's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for StrokeRisk operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more request fields failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A single field could not be coerced during normalization
    #[error("invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// The model capability could not score the rows
    #[error("model error: {0}")]
    Model(String),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller sent bad input (as opposed to a server-side fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidField { .. })
    }

    /// Field-level detail for client errors; empty for everything else
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            Self::Validation(err) => err.errors().to_vec(),
            Self::InvalidField { field, message } => vec![FieldError::new(field, message)],
            _ => Vec::new(),
        }
    }
}

impl From<FieldError> for Error {
    fn from(err: FieldError) -> Self {
        Self::InvalidField {
            field: err.field,
            message: err.message,
        }
    }
}
