//! Field-level validation of prediction requests
//!
//! Validation collects every violation in a request instead of stopping at
//! the first one, so callers get the complete list back in one round trip.
//! It runs before normalization and before any model call.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::types::{BatchRequest, PredictionRequest};

/// Upper bound (inclusive) for `age`
pub const MAX_AGE: f64 = 150.0;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Field path, e.g. `age` or `items[2].threshold`
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn prefixed(self, prefix: &str) -> Self {
        Self {
            field: format!("{}.{}", prefix, self.field),
            message: self.message,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// All field violations found in one request or batch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summary(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Build from a non-empty error list
    pub fn new(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty(), "validation error without field errors");
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

impl From<FieldError> for ValidationError {
    fn from(err: FieldError) -> Self {
        Self::new(vec![err])
    }
}

impl PredictionRequest {
    /// Check every field constraint; `Ok` means the request can be normalized
    pub fn validate(&self) -> Result<(), ValidationError> {
        let errors = self.collect_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }

    fn collect_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        check_range(&mut errors, "age", self.age, Some(MAX_AGE));
        check_range(&mut errors, "avg_glucose_level", self.avg_glucose_level, None);
        check_range(&mut errors, "bmi", self.bmi, None);

        if let Err(err) = self.hypertension.coerce("hypertension") {
            errors.push(err);
        }
        if let Err(err) = self.heart_disease.coerce("heart_disease") {
            errors.push(err);
        }

        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            errors.push(FieldError::new(
                "threshold",
                format!(
                    "threshold must be greater than 0 and less than 1 (got {})",
                    self.threshold
                ),
            ));
        }

        errors
    }
}

/// `value` must be finite, >= 0 and (optionally) <= `max`
fn check_range(errors: &mut Vec<FieldError>, field: &str, value: f64, max: Option<f64>) {
    if !value.is_finite() {
        errors.push(FieldError::new(field, format!("{} must be a finite number", field)));
    } else if value < 0.0 {
        errors.push(FieldError::new(
            field,
            format!("{} must be greater than or equal to 0 (got {})", field, value),
        ));
    } else if let Some(max) = max.filter(|max| value > *max) {
        errors.push(FieldError::new(
            field,
            format!("{} must be less than or equal to {} (got {})", field, max, value),
        ));
    }
}

impl BatchRequest {
    /// Validate the batch shape and every item, reporting indexed field paths.
    ///
    /// `max_items` caps the batch size when set.
    pub fn validate(&self, max_items: Option<usize>) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::single("items", "items must not be empty"));
        }

        if let Some(max) = max_items.filter(|max| self.items.len() > *max) {
            return Err(ValidationError::single(
                "items",
                format!("batch of {} items exceeds the limit of {}", self.items.len(), max),
            ));
        }

        let errors: Vec<FieldError> = self
            .items
            .iter()
            .enumerate()
            .flat_map(|(index, item)| {
                let prefix = format!("items[{}]", index);
                item.collect_errors()
                    .into_iter()
                    .map(move |err| err.prefixed(&prefix))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }
}
