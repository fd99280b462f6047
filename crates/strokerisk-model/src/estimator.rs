//! Terminal estimators of a fitted pipeline

use candle_core::{Device, Tensor};

use crate::error::ModelError;

/// A fitted linear classifier over the encoded feature matrix
#[derive(Debug, Clone)]
pub enum Estimator {
    /// Logistic regression; probabilities via the logistic function
    LogisticRegression(LinearHead),

    /// Linear support vector classifier; no probability output
    LinearSvc(LinearHead),
}

impl Estimator {
    /// Class name as reported by model introspection
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "LogisticRegression",
            Self::LinearSvc(_) => "LinearSVC",
        }
    }

    /// Positive-class probability, one value per row of `x`
    pub fn predict_proba(&self, x: &Tensor) -> Result<Vec<f64>, ModelError> {
        match self {
            Self::LogisticRegression(head) => {
                let probs = candle_nn::ops::sigmoid(&head.logits(x)?)?;
                Ok(probs.squeeze(1)?.to_vec1::<f64>()?)
            }
            Self::LinearSvc(_) => Err(ModelError::Unsupported {
                operation: "predict_proba",
                estimator: self.class_name().to_string(),
            }),
        }
    }
}

/// Weight row and intercept of a binary linear model
#[derive(Debug, Clone)]
pub struct LinearHead {
    weight: Tensor,
    bias: Tensor,
}

impl LinearHead {
    pub fn new(coef: &[f64], intercept: f64, device: &Device) -> candle_core::Result<Self> {
        Ok(Self {
            weight: Tensor::from_slice(coef, (1, coef.len()), device)?,
            bias: Tensor::new(&[intercept], device)?,
        })
    }

    /// `x · coefᵀ + intercept`, shape `(rows, 1)`.
    ///
    /// Each row is reduced on its own, so a row's logit is bit-identical
    /// whether it is scored alone or inside a larger batch.
    fn logits(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        x.broadcast_mul(&self.weight)?
            .sum_keepdim(1)?
            .broadcast_add(&self.bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    fn matrix(rows: &[[f64; 2]]) -> Tensor {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Tensor::from_vec(flat, (rows.len(), 2), &Device::Cpu).unwrap()
    }

    #[test]
    fn test_logistic_regression_probabilities() {
        let head = LinearHead::new(&[0.5, -1.5], 0.25, &Device::Cpu).unwrap();
        let estimator = Estimator::LogisticRegression(head);

        let x = matrix(&[[1.0, 0.0], [0.0, 1.0], [2.0, 2.0]]);
        let probs = estimator.predict_proba(&x).unwrap();

        let expected = [sigmoid(0.75), sigmoid(-1.25), sigmoid(-1.75)];
        assert_eq!(probs.len(), 3);
        for (p, e) in probs.iter().zip(expected) {
            assert!((p - e).abs() < 1e-12, "{} != {}", p, e);
        }
    }

    #[test]
    fn test_extreme_logits_stay_in_unit_interval() {
        let head = LinearHead::new(&[1000.0, 0.0], 0.0, &Device::Cpu).unwrap();
        let estimator = Estimator::LogisticRegression(head);

        let probs = estimator
            .predict_proba(&matrix(&[[1.0, 0.0], [-1.0, 0.0]]))
            .unwrap();
        assert_eq!(probs, vec![1.0, 0.0]);
    }

    #[test]
    fn test_linear_svc_has_no_probabilities() {
        let head = LinearHead::new(&[1.0, 1.0], 0.0, &Device::Cpu).unwrap();
        let estimator = Estimator::LinearSvc(head);

        let err = estimator.predict_proba(&matrix(&[[1.0, 2.0]])).unwrap_err();
        assert!(matches!(err, ModelError::Unsupported { operation: "predict_proba", .. }));
        assert_eq!(err.to_string(), "model does not support predict_proba (LinearSVC)");
    }
}
