//! Fitted preprocessing + classifier pipeline
//!
//! The artifact format mirrors how the training pipeline is laid out: a
//! `preprocess` column transformer (standard scaling, one-hot encoding,
//! passthrough) followed by a terminal classifier step. Inference encodes a
//! whole batch into one design matrix and runs a single tensor pass over it.

use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};
use strokerisk_core::{FeatureRow, EXPECTED_COLUMNS};
use tracing::debug;

use crate::capability::{ModelDescription, ProbabilityModel, StepDescription};
use crate::error::{LoadError, ModelError};
use crate::estimator::{Estimator, LinearHead};

/// Columns carrying numeric values in a [`FeatureRow`]
const NUMERIC_COLUMNS: [&str; 5] = [
    "age",
    "avg_glucose_level",
    "bmi",
    "hypertension",
    "heart_disease",
];

/// Serialized form of a fitted pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Artifact name, for logging
    #[serde(default)]
    pub name: Option<String>,

    /// Artifact version, for logging
    #[serde(default)]
    pub version: Option<String>,

    /// Ordered steps: one column transformer, then the classifier
    pub steps: Vec<StepSpec>,
}

/// One named pipeline step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    pub name: String,

    #[serde(flatten)]
    pub kind: StepKindSpec,
}

/// Step payload, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKindSpec {
    ColumnTransformer { transformers: Vec<Transformer> },
    LogisticRegression { coef: Vec<f64>, intercept: f64 },
    LinearSvc { coef: Vec<f64>, intercept: f64 },
}

/// A column group inside the column transformer; unlisted columns are dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transformer {
    /// `(x - mean) / scale` per numeric column
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },

    /// One indicator per known category; unknown categories encode as all zeros
    OneHotEncoder {
        columns: Vec<String>,
        categories: Vec<Vec<String>>,
    },

    /// Numeric columns copied unchanged
    Passthrough { columns: Vec<String> },
}

impl Transformer {
    fn columns(&self) -> &[String] {
        match self {
            Self::StandardScaler { columns, .. }
            | Self::OneHotEncoder { columns, .. }
            | Self::Passthrough { columns } => columns,
        }
    }

    /// Encoded width contributed by this transformer
    fn width(&self) -> usize {
        match self {
            Self::StandardScaler { columns, .. } | Self::Passthrough { columns } => columns.len(),
            Self::OneHotEncoder { categories, .. } => categories.iter().map(Vec::len).sum(),
        }
    }

    fn check(&self) -> Result<(), LoadError> {
        for column in self.columns() {
            if !EXPECTED_COLUMNS.contains(&column.as_str()) {
                return Err(LoadError::invalid(format!("unknown column '{}'", column)));
            }
            let numeric = NUMERIC_COLUMNS.contains(&column.as_str());
            let wants_numeric = !matches!(self, Self::OneHotEncoder { .. });
            if numeric != wants_numeric {
                return Err(LoadError::invalid(format!(
                    "column '{}' cannot be used by a {} transformer",
                    column,
                    if wants_numeric { "numeric" } else { "categorical" }
                )));
            }
        }

        match self {
            Self::StandardScaler { columns, mean, scale } => {
                if mean.len() != columns.len() || scale.len() != columns.len() {
                    return Err(LoadError::invalid(format!(
                        "standard_scaler has {} columns but {} means and {} scales",
                        columns.len(),
                        mean.len(),
                        scale.len()
                    )));
                }
                if mean.iter().chain(scale).any(|v| !v.is_finite()) {
                    return Err(LoadError::invalid("standard_scaler parameters must be finite"));
                }
            }
            Self::OneHotEncoder { columns, categories } => {
                if categories.len() != columns.len() {
                    return Err(LoadError::invalid(format!(
                        "one_hot_encoder has {} columns but {} category lists",
                        columns.len(),
                        categories.len()
                    )));
                }
            }
            Self::Passthrough { .. } => {}
        }

        Ok(())
    }

    /// Append this transformer's encoding of `row` to `out`
    fn encode(&self, row: &FeatureRow, out: &mut Vec<f64>) -> Result<(), ModelError> {
        match self {
            Self::StandardScaler { columns, mean, scale } => {
                for ((column, mean), scale) in columns.iter().zip(mean).zip(scale) {
                    let value = numeric(row, column)?;
                    // zero variance columns were left unscaled at fit time
                    let scale = if *scale == 0.0 { 1.0 } else { *scale };
                    out.push((value - mean) / scale);
                }
            }
            Self::OneHotEncoder { columns, categories } => {
                for (column, known) in columns.iter().zip(categories) {
                    let value = categorical(row, column)?;
                    out.extend(known.iter().map(|c| if c == value { 1.0 } else { 0.0 }));
                }
            }
            Self::Passthrough { columns } => {
                for column in columns {
                    out.push(numeric(row, column)?);
                }
            }
        }
        Ok(())
    }
}

fn numeric(row: &FeatureRow, column: &str) -> Result<f64, ModelError> {
    row.get(column)
        .and_then(|v| v.as_number())
        .ok_or_else(|| ModelError::ColumnType {
            column: column.to_string(),
            expected: "numeric",
        })
}

fn categorical<'a>(row: &'a FeatureRow, column: &str) -> Result<&'a str, ModelError> {
    row.get(column)
        .and_then(|v| v.as_category())
        .ok_or_else(|| ModelError::ColumnType {
            column: column.to_string(),
            expected: "categorical",
        })
}

/// Column transformer step with its name
#[derive(Debug, Clone)]
pub struct ColumnTransformer {
    name: String,
    transformers: Vec<Transformer>,
    width: usize,
}

impl ColumnTransformer {
    pub fn new(name: impl Into<String>, transformers: Vec<Transformer>) -> Result<Self, LoadError> {
        for transformer in &transformers {
            transformer.check()?;
        }
        let width = transformers.iter().map(Transformer::width).sum();
        if width == 0 {
            return Err(LoadError::invalid("column transformer produces no features"));
        }

        Ok(Self {
            name: name.into(),
            transformers,
            width,
        })
    }

    /// Encoded feature count per row
    pub fn width(&self) -> usize {
        self.width
    }

    /// Encode all rows into a row-major `(rows × width)` buffer
    pub fn transform(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        let mut out = Vec::with_capacity(rows.len() * self.width);
        for row in rows {
            for transformer in &self.transformers {
                transformer.encode(row, &mut out)?;
            }
        }
        Ok(out)
    }
}

/// A loaded, immutable preprocessing + classifier pipeline
#[derive(Debug, Clone)]
pub struct FittedPipeline {
    name: Option<String>,
    preprocess: ColumnTransformer,
    classifier_step: String,
    estimator: Estimator,
    device: Device,
}

impl FittedPipeline {
    /// Build from a parsed artifact, checking that the steps fit together
    pub fn from_spec(spec: PipelineSpec) -> Result<Self, LoadError> {
        let device = Device::Cpu;

        let [preprocess, classifier]: [StepSpec; 2] = spec.steps.try_into().map_err(
            |steps: Vec<StepSpec>| {
                LoadError::invalid(format!(
                    "expected a preprocessing step and a classifier step, found {} steps",
                    steps.len()
                ))
            },
        )?;

        let preprocess = match preprocess.kind {
            StepKindSpec::ColumnTransformer { transformers } => {
                ColumnTransformer::new(preprocess.name, transformers)?
            }
            _ => {
                return Err(LoadError::invalid(format!(
                    "first step '{}' must be a column_transformer",
                    preprocess.name
                )))
            }
        };

        let estimator = match classifier.kind {
            StepKindSpec::LogisticRegression { coef, intercept } => {
                check_head(&coef, intercept, preprocess.width())?;
                Estimator::LogisticRegression(LinearHead::new(&coef, intercept, &device)?)
            }
            StepKindSpec::LinearSvc { coef, intercept } => {
                check_head(&coef, intercept, preprocess.width())?;
                Estimator::LinearSvc(LinearHead::new(&coef, intercept, &device)?)
            }
            StepKindSpec::ColumnTransformer { .. } => {
                return Err(LoadError::invalid(format!(
                    "last step '{}' must be a classifier",
                    classifier.name
                )))
            }
        };

        Ok(Self {
            name: spec.name,
            preprocess,
            classifier_step: classifier.name,
            estimator,
            device,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Encode `rows` into a `(rows × width)` tensor
    fn design_matrix(&self, rows: &[FeatureRow]) -> Result<Tensor, ModelError> {
        let data = self.preprocess.transform(rows)?;
        Ok(Tensor::from_vec(data, (rows.len(), self.preprocess.width()), &self.device)?)
    }
}

fn check_head(coef: &[f64], intercept: f64, width: usize) -> Result<(), LoadError> {
    if coef.len() != width {
        return Err(LoadError::invalid(format!(
            "classifier has {} coefficients but preprocessing produces {} features",
            coef.len(),
            width
        )));
    }
    if !intercept.is_finite() || coef.iter().any(|c| !c.is_finite()) {
        return Err(LoadError::invalid("classifier parameters must be finite"));
    }
    Ok(())
}

impl ProbabilityModel for FittedPipeline {
    fn predict_probability(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let x = self.design_matrix(rows)?;
        let probabilities = self.estimator.predict_proba(&x)?;
        debug!(rows = rows.len(), width = self.preprocess.width(), "scored design matrix");

        Ok(probabilities)
    }

    fn describe(&self) -> Option<ModelDescription> {
        Some(ModelDescription::new(vec![
            StepDescription::new(&self.preprocess.name, "ColumnTransformer"),
            StepDescription::new(&self.classifier_step, self.estimator.class_name()),
        ]))
    }
}
