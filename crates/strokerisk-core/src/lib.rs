//! StrokeRisk Core
//!
//! Core types and the pure half of the request-to-prediction pipeline.
//!
//! This crate provides:
//! - The wire data model (prediction requests, batches, results)
//! - Field validation with per-field error reporting
//! - Tagged coercion for boolean-or-integer flags
//! - The feature normalizer that produces the fixed-order model row

pub mod error;
pub mod features;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use features::{normalize, FeatureRow, FeatureValue, EXPECTED_COLUMNS};
pub use types::{
    BatchRequest, BatchResponse, FlagInput, PredictionRequest, PredictionResult,
    DEFAULT_SMOKING_STATUS, DEFAULT_THRESHOLD,
};
pub use validation::{FieldError, ValidationError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::features::{normalize, FeatureRow, EXPECTED_COLUMNS};
    pub use crate::types::{BatchRequest, PredictionRequest, PredictionResult};
    pub use crate::validation::{FieldError, ValidationError};
}
