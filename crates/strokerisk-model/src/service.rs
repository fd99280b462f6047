//! Prediction service: validation, normalization, scoring and thresholding

use std::sync::Arc;
use std::time::Instant;
use strokerisk_core::{
    normalize, BatchRequest, Error, FeatureRow, PredictionRequest, PredictionResult, Result,
    EXPECTED_COLUMNS,
};
use tracing::{debug, error};

use crate::capability::ProbabilityModel;
use crate::error::ModelError;

/// Scores requests against one shared, immutable model.
///
/// Cloning is cheap; every clone shares the same model handle.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn ProbabilityModel>,
    max_batch_items: Option<usize>,
}

impl PredictionService {
    /// Create a service around a loaded model
    pub fn new(model: Arc<dyn ProbabilityModel>) -> Self {
        Self {
            model,
            max_batch_items: None,
        }
    }

    /// Reject batches larger than `max` items
    pub fn with_max_batch_items(mut self, max: usize) -> Self {
        self.max_batch_items = Some(max);
        self
    }

    /// Column order the model expects
    pub fn expected_columns(&self) -> &'static [&'static str] {
        &EXPECTED_COLUMNS
    }

    /// Class name of the model's classifier step, if the model can tell
    pub fn classifier_name(&self) -> Option<String> {
        self.model
            .describe()
            .and_then(|d| d.classifier_name().map(str::to_string))
    }

    /// Score one request and apply its threshold
    pub fn predict_one(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        request.validate()?;

        let row = normalize(request)?;
        let probabilities = self.score(std::slice::from_ref(&row))?;

        Ok(PredictionResult::from_probability(
            probabilities[0],
            request.threshold,
        ))
    }

    /// Score a batch with one model call, applying each item's own threshold.
    ///
    /// Results are in input order. Any validation failure rejects the whole
    /// batch before the model runs; a model failure returns no partial results.
    pub fn predict_batch(&self, batch: &BatchRequest) -> Result<Vec<PredictionResult>> {
        batch.validate(self.max_batch_items)?;

        let rows = batch
            .items
            .iter()
            .map(normalize)
            .collect::<Result<Vec<FeatureRow>>>()?;

        let probabilities = self.score(&rows)?;

        Ok(probabilities
            .into_iter()
            .zip(&batch.items)
            .map(|(probability, item)| PredictionResult::from_probability(probability, item.threshold))
            .collect())
    }

    /// One model invocation over `rows`, with output checks
    fn score(&self, rows: &[FeatureRow]) -> Result<Vec<f64>> {
        let start = Instant::now();

        let probabilities = self
            .model
            .predict_probability(rows)
            .and_then(|probabilities| check_probabilities(rows.len(), probabilities))
            .map_err(|e| {
                error!("Model invocation failed for {} rows: {}", rows.len(), e);
                Error::from(e)
            })?;

        debug!(
            rows = rows.len(),
            latency_us = start.elapsed().as_micros() as u64,
            "model invocation complete"
        );

        Ok(probabilities)
    }
}

fn check_probabilities(expected: usize, probabilities: Vec<f64>) -> std::result::Result<Vec<f64>, ModelError> {
    if probabilities.len() != expected {
        return Err(ModelError::ShapeMismatch {
            expected,
            actual: probabilities.len(),
        });
    }

    if let Some((row, value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !(0.0..=1.0).contains(*p))
    {
        return Err(ModelError::InvalidProbability { row, value: *value });
    }

    Ok(probabilities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ModelDescription, StepDescription};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strokerisk_core::FlagInput;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts WARN and ERROR events
    struct LoudEvents(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for LoudEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() <= Level::WARN {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Returns a fixed list of probabilities regardless of input
    struct Fixed(Vec<f64>);

    impl ProbabilityModel for Fixed {
        fn predict_probability(&self, _rows: &[FeatureRow]) -> std::result::Result<Vec<f64>, ModelError> {
            Ok(self.0.clone())
        }
    }

    struct Described;

    impl ProbabilityModel for Described {
        fn predict_probability(&self, rows: &[FeatureRow]) -> std::result::Result<Vec<f64>, ModelError> {
            Ok(vec![0.5; rows.len()])
        }

        fn describe(&self) -> Option<ModelDescription> {
            Some(ModelDescription::new(vec![
                StepDescription::new("preprocess", "ColumnTransformer"),
                StepDescription::new("clf", "LogisticRegression"),
            ]))
        }
    }

    fn request(threshold: f64) -> PredictionRequest {
        PredictionRequest {
            gender: "Male".to_string(),
            age: 67.0,
            hypertension: FlagInput::Int(0),
            heart_disease: FlagInput::Int(1),
            ever_married: "Yes".to_string(),
            work_type: "Private".to_string(),
            residence_type: "Urban".to_string(),
            avg_glucose_level: 228.69,
            bmi: 36.6,
            smoking_status: Some("formerly smoked".to_string()),
            threshold,
        }
    }

    #[test]
    fn test_predict_one_example() {
        let service = PredictionService::new(Arc::new(Fixed(vec![0.42])));
        let result = service.predict_one(&request(0.3)).unwrap();

        assert_eq!(result, PredictionResult { probability: 0.42, prediction: 1, threshold: 0.3 });
    }

    #[test]
    fn test_batch_uses_per_item_thresholds() {
        let service = PredictionService::new(Arc::new(Fixed(vec![0.3, 0.3])));
        let batch = BatchRequest::new(vec![request(0.5), request(0.2)]);

        let results = service.predict_batch(&batch).unwrap();
        let predictions: Vec<u8> = results.iter().map(|r| r.prediction).collect();
        assert_eq!(predictions, vec![0, 1]);
        assert_eq!(results[1].threshold, 0.2);
    }

    #[test]
    fn test_shape_mismatch_is_model_error() {
        let service = PredictionService::new(Arc::new(Fixed(vec![0.3])));
        let batch = BatchRequest::new(vec![request(0.5), request(0.5)]);

        let err = service.predict_batch(&batch).unwrap_err();
        assert!(matches!(err, Error::Model(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_out_of_range_probability_is_model_error() {
        for bad in [1.5, -0.1, f64::NAN] {
            let service = PredictionService::new(Arc::new(Fixed(vec![bad])));
            let err = service.predict_one(&request(0.5)).unwrap_err();
            assert!(matches!(err, Error::Model(_)), "probability {}", bad);
        }
    }

    #[test]
    fn test_max_batch_items() {
        let service = PredictionService::new(Arc::new(Fixed(vec![0.1; 3]))).with_max_batch_items(2);
        let batch = BatchRequest::new(vec![request(0.5); 3]);

        let err = service.predict_batch(&batch).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_rejections_are_left_to_the_caller_to_log() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(LoudEvents(count.clone()));
        let service = PredictionService::new(Arc::new(Fixed(vec![0.5]))).with_max_batch_items(1);

        tracing::subscriber::with_default(subscriber, || {
            let mut bad = request(0.5);
            bad.age = 200.0;
            assert!(service.predict_one(&bad).unwrap_err().is_client_error());

            let batch = BatchRequest::new(vec![request(0.5); 2]);
            assert!(service.predict_batch(&batch).unwrap_err().is_client_error());
        });

        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_classifier_name() {
        assert_eq!(PredictionService::new(Arc::new(Fixed(vec![]))).classifier_name(), None);
        assert_eq!(
            PredictionService::new(Arc::new(Described)).classifier_name().as_deref(),
            Some("LogisticRegression")
        );
    }

    #[test]
    fn test_expected_columns() {
        let service = PredictionService::new(Arc::new(Described));
        assert_eq!(service.expected_columns().len(), 10);
        assert_eq!(service.expected_columns()[8], "Residence_type");
    }
}
