//! Loading model artifacts from disk

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::capability::ProbabilityModel;
use crate::error::LoadError;
use crate::pipeline::{FittedPipeline, PipelineSpec};

/// On-disk encoding of a pipeline artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Yaml,
}

impl ArtifactFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(LoadError::UnsupportedFormat(ext)),
        }
    }

    /// Parse artifact text in this format
    pub fn parse(self, content: &str) -> Result<PipelineSpec, String> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Load and check a fitted pipeline artifact
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<FittedPipeline, LoadError> {
    let path = path.as_ref();
    let format = ArtifactFormat::from_path(path)?;

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let spec = format.parse(&content).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    let steps: Vec<String> = spec.steps.iter().map(|s| s.name.clone()).collect();
    let version = spec.version.clone();
    let pipeline = FittedPipeline::from_spec(spec)?;

    info!(
        "Loaded model from {} (name: {}, version: {}, steps: [{}], classifier: {})",
        path.display(),
        pipeline.name().unwrap_or("unnamed"),
        version.as_deref().unwrap_or("unknown"),
        steps.join(", "),
        pipeline.estimator().class_name()
    );

    Ok(pipeline)
}

/// Load the model capability from `path` as a shared, read-only handle
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn ProbabilityModel>, LoadError> {
    Ok(Arc::new(load_pipeline(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    const YAML_ARTIFACT: &str = r#"
name: stroke_test
version: "1.0"
steps:
  - name: preprocess
    type: column_transformer
    transformers:
      - type: standard_scaler
        columns: [age, bmi]
        mean: [43.2, 28.9]
        scale: [22.6, 7.8]
      - type: one_hot_encoder
        columns: [ever_married]
        categories: [["No", "Yes"]]
  - name: clf
    type: logistic_regression
    coef: [1.6, 0.1, -0.3, 0.2]
    intercept: -4.1
"#;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ArtifactFormat::from_path(Path::new("m.json")).unwrap(), ArtifactFormat::Json);
        assert_eq!(ArtifactFormat::from_path(Path::new("m.YML")).unwrap(), ArtifactFormat::Yaml);
        assert!(matches!(
            ArtifactFormat::from_path(Path::new("stroke_best_pipeline.joblib")),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "joblib"
        ));
    }

    #[test]
    fn test_load_yaml_artifact() {
        let file = write_temp(".yaml", YAML_ARTIFACT);
        let pipeline = load_pipeline(file.path()).unwrap();

        assert_eq!(pipeline.name(), Some("stroke_test"));
        assert_eq!(pipeline.estimator().class_name(), "LogisticRegression");
    }

    #[test]
    fn test_load_json_artifact_as_model() {
        let spec: PipelineSpec = serde_yaml::from_str(YAML_ARTIFACT).unwrap();
        let file = write_temp(".json", &serde_json::to_string(&spec).unwrap());

        let model = load_model(file.path()).unwrap();
        assert_eq!(
            model.describe().unwrap().classifier_name(),
            Some("LogisticRegression")
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_pipeline(PathBuf::from("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_malformed_artifact() {
        let file = write_temp(".json", "{\"steps\": 3}");
        let err = load_pipeline(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_inconsistent_artifact() {
        let file = write_temp(".yaml", &YAML_ARTIFACT.replace("[1.6, 0.1, -0.3, 0.2]", "[1.6]"));
        let err = load_pipeline(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }
}
