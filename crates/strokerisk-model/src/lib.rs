//! StrokeRisk Model
//!
//! The model side of the request-to-prediction pipeline.
//!
//! - [`ProbabilityModel`] is the capability the service depends on: rows in,
//!   one positive-class probability per row out.
//! - [`FittedPipeline`] is the concrete capability, loaded once from an
//!   exported preprocessing + classifier artifact and evaluated with Candle
//!   tensors on the CPU.
//! - [`PredictionService`] validates, normalizes, scores and thresholds
//!   single requests and batches.

pub mod capability;
pub mod error;
pub mod estimator;
pub mod loader;
pub mod pipeline;
pub mod service;

pub use capability::{ModelDescription, ProbabilityModel, StepDescription};
pub use error::{LoadError, ModelError};
pub use estimator::Estimator;
pub use loader::{load_model, load_pipeline, ArtifactFormat};
pub use pipeline::{ColumnTransformer, FittedPipeline, PipelineSpec, StepSpec, Transformer};
pub use service::PredictionService;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::capability::{ModelDescription, ProbabilityModel};
    pub use crate::error::{LoadError, ModelError};
    pub use crate::loader::load_model;
    pub use crate::pipeline::FittedPipeline;
    pub use crate::service::PredictionService;
}
