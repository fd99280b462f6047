//! Core types for StrokeRisk

use serde::{Deserialize, Serialize};
use utoipa::openapi::{ObjectBuilder, OneOfBuilder, RefOr, Schema, SchemaType};
use utoipa::ToSchema;

use crate::validation::FieldError;

/// Cutoff applied when a request does not carry its own threshold
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Feature value substituted for a missing smoking status
pub const DEFAULT_SMOKING_STATUS: &str = "Unknown";

/// A single patient record to be scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionRequest {
    pub gender: String,

    /// Age in years, 0..=150
    pub age: f64,

    /// Boolean-or-integer flag, absent means 0
    #[serde(default)]
    pub hypertension: FlagInput,

    /// Boolean-or-integer flag, absent means 0
    #[serde(default)]
    pub heart_disease: FlagInput,

    pub ever_married: String,

    pub work_type: String,

    #[serde(rename = "Residence_type", alias = "residence_type")]
    pub residence_type: String,

    /// Average glucose level (mg/dL), >= 0
    pub avg_glucose_level: f64,

    /// Body mass index, >= 0
    pub bmi: f64,

    /// Free-form smoking status; `None` normalizes to "Unknown"
    #[serde(default)]
    pub smoking_status: Option<String>,

    /// Decision cutoff, strictly between 0 and 1
    #[serde(default = "default_threshold")]
    #[schema(default = 0.5)]
    pub threshold: f64,
}

impl PredictionRequest {
    /// Set the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the smoking status
    pub fn with_smoking_status(mut self, status: impl Into<String>) -> Self {
        self.smoking_status = Some(status.into());
        self
    }

    /// Set the hypertension flag input
    pub fn with_hypertension(mut self, flag: impl Into<FlagInput>) -> Self {
        self.hypertension = flag.into();
        self
    }

    /// Set the heart disease flag input
    pub fn with_heart_disease(mut self, flag: impl Into<FlagInput>) -> Self {
        self.heart_disease = flag.into();
        self
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Accepted input shapes for the hypertension / heart_disease flags.
///
/// Every JSON value deserializes into one of these; [`FlagInput::coerce`]
/// maps the accepted shapes to 0/1 and rejects the rest with a named error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagInput {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// null, arrays, objects; always rejected
    Other(serde_json::Value),
}

impl FlagInput {
    /// Coerce to a 0/1 flag, naming `field` on failure
    pub fn coerce(&self, field: &str) -> Result<u8, FieldError> {
        let parsed = match self {
            Self::Bool(value) => return Ok(u8::from(*value)),
            Self::Int(value) => Some(*value),
            Self::Float(value) if value.is_finite() && value.fract() == 0.0 => Some(*value as i64),
            Self::Text(text) => text.trim().parse::<i64>().ok(),
            Self::Float(_) | Self::Other(_) => None,
        };

        match parsed {
            Some(0) => Ok(0),
            Some(1) => Ok(1),
            _ => Err(FieldError::new(
                field,
                format!("{} must be 0/1 or boolean", field),
            )),
        }
    }
}

impl<'s> ToSchema<'s> for FlagInput {
    fn schema() -> (&'s str, RefOr<Schema>) {
        let schema = OneOfBuilder::new()
            .item(ObjectBuilder::new().schema_type(SchemaType::Boolean))
            .item(ObjectBuilder::new().schema_type(SchemaType::Integer))
            .item(ObjectBuilder::new().schema_type(SchemaType::String))
            .description(Some("0, 1, a boolean, or \"0\"/\"1\" as a string"))
            .into();

        ("FlagInput", schema)
    }
}

impl Default for FlagInput {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<bool> for FlagInput {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FlagInput {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FlagInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Ordered batch of requests; results come back in the same order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchRequest {
    pub items: Vec<PredictionRequest>,
}

impl BatchRequest {
    pub fn new(items: Vec<PredictionRequest>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of scoring one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionResult {
    /// Positive-class probability in [0, 1]
    pub probability: f64,

    /// 1 iff `probability >= threshold`
    pub prediction: u8,

    /// The threshold that produced `prediction`
    pub threshold: f64,
}

impl PredictionResult {
    /// Apply `threshold` to `probability`; equality counts as positive
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            prediction: u8::from(probability >= threshold),
            threshold,
        }
    }

    /// Check if the prediction is positive
    pub fn is_positive(&self) -> bool {
        self.prediction == 1
    }
}

/// Response body of the batch endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchResponse {
    pub results: Vec<PredictionResult>,
}
