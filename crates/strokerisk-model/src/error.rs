//! Error types for model loading and inference

use std::path::PathBuf;

/// Failure while scoring rows with a loaded model
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The estimator cannot perform the requested operation
    #[error("model does not support {operation} ({estimator})")]
    Unsupported {
        operation: &'static str,
        estimator: String,
    },

    /// The model returned a different number of scores than rows
    #[error("model returned {actual} probabilities for {expected} rows")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A probability outside [0, 1] or not finite
    #[error("model returned invalid probability {value} for row {row}")]
    InvalidProbability { row: usize, value: f64 },

    /// A row value did not have the type its column requires
    #[error("column '{column}' expected a {expected} value")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Tensor computation failed
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),
}

/// Failure while loading a model artifact at startup
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported model artifact format '{0}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    /// The artifact parsed but does not describe a usable pipeline
    #[error("invalid model pipeline: {0}")]
    Invalid(String),

    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),
}

impl LoadError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

impl From<ModelError> for strokerisk_core::Error {
    fn from(err: ModelError) -> Self {
        strokerisk_core::Error::model(err.to_string())
    }
}
