//! Model capability trait and introspection types

use serde::Serialize;
use strokerisk_core::FeatureRow;

use crate::error::ModelError;

/// Name of the step treated as the classifier when present
pub const CLASSIFIER_STEP: &str = "clf";

/// A pre-trained binary classifier.
///
/// Implementations are loaded once and shared read-only across requests,
/// so they must be safe for concurrent use.
pub trait ProbabilityModel: Send + Sync {
    /// Score `rows` in one call, returning one positive-class probability per
    /// row in input order
    fn predict_probability(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelError>;

    /// Best-effort description of the model's internal steps
    fn describe(&self) -> Option<ModelDescription> {
        None
    }
}

/// Ordered list of the steps making up a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescription {
    pub steps: Vec<StepDescription>,
}

/// One named step and its estimator class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDescription {
    /// Step name inside the pipeline, e.g. `preprocess` or `clf`
    pub name: String,

    /// Estimator class name, e.g. `LogisticRegression`
    pub kind: String,
}

impl StepDescription {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

impl ModelDescription {
    pub fn new(steps: Vec<StepDescription>) -> Self {
        Self { steps }
    }

    /// Class name of the classifier: the `clf` step if there is one,
    /// otherwise the terminal step
    pub fn classifier_name(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|step| step.name == CLASSIFIER_STEP)
            .or_else(|| self.steps.last())
            .map(|step| step.kind.as_str())
    }
}
