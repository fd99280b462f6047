//! Feature normalization
//!
//! Turns a validated [`PredictionRequest`] into the fixed-order row the model
//! was fitted on. No scaling or encoding happens here; that belongs to the
//! model's own preprocessing step.

use serde::Serialize;
use tracing::trace;

use crate::error::Result;
use crate::types::{PredictionRequest, DEFAULT_SMOKING_STATUS};

/// Column order the model was fitted with. Must never be reordered.
pub const EXPECTED_COLUMNS: [&str; 10] = [
    "age",
    "avg_glucose_level",
    "bmi",
    "hypertension",
    "heart_disease",
    "gender",
    "ever_married",
    "work_type",
    "Residence_type",
    "smoking_status",
];

/// One model input row, fields in [`EXPECTED_COLUMNS`] order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub age: f64,
    pub avg_glucose_level: f64,
    pub bmi: f64,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub gender: String,
    pub ever_married: String,
    pub work_type: String,
    #[serde(rename = "Residence_type")]
    pub residence_type: String,
    pub smoking_status: String,
}

/// A single cell of a [`FeatureRow`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Number(f64),
    Category(&'a str),
}

impl<'a> FeatureValue<'a> {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&'a str> {
        match self {
            Self::Category(value) => Some(value),
            Self::Number(_) => None,
        }
    }
}

impl FeatureRow {
    /// Cells in canonical column order
    pub fn values(&self) -> [FeatureValue<'_>; 10] {
        [
            FeatureValue::Number(self.age),
            FeatureValue::Number(self.avg_glucose_level),
            FeatureValue::Number(self.bmi),
            FeatureValue::Number(f64::from(self.hypertension)),
            FeatureValue::Number(f64::from(self.heart_disease)),
            FeatureValue::Category(&self.gender),
            FeatureValue::Category(&self.ever_married),
            FeatureValue::Category(&self.work_type),
            FeatureValue::Category(&self.residence_type),
            FeatureValue::Category(&self.smoking_status),
        ]
    }

    /// Look up a cell by column name
    pub fn get(&self, column: &str) -> Option<FeatureValue<'_>> {
        let index = EXPECTED_COLUMNS.iter().position(|c| *c == column)?;
        Some(self.values()[index])
    }
}

/// Normalize one request into a [`FeatureRow`].
///
/// Flags are coerced to 0/1 and a missing smoking status becomes
/// `"Unknown"`; every other value passes through untouched.
pub fn normalize(request: &PredictionRequest) -> Result<FeatureRow> {
    let hypertension = request.hypertension.coerce("hypertension")?;
    let heart_disease = request.heart_disease.coerce("heart_disease")?;

    let smoking_status = request
        .smoking_status
        .clone()
        .unwrap_or_else(|| DEFAULT_SMOKING_STATUS.to_string());

    trace!(age = request.age, smoking_status = %smoking_status, "normalized request");

    Ok(FeatureRow {
        age: request.age,
        avg_glucose_level: request.avg_glucose_level,
        bmi: request.bmi,
        hypertension,
        heart_disease,
        gender: request.gender.clone(),
        ever_married: request.ever_married.clone(),
        work_type: request.work_type.clone(),
        residence_type: request.residence_type.clone(),
        smoking_status,
    })
}
