//! Class-balanced logistic regression.
//!
//! Fitted by full-batch gradient descent on the weighted log-loss with an L2
//! penalty on the coefficients (the intercept is not penalized). Every class
//! contributes the same total weight to the loss, so a feedback history that
//! is mostly "supported" does not push every team towards a high score.

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;

/// Identifier reported for scores produced by this model family
pub const MODEL_FAMILY: &str = "logistic_regression";

/// Hyper-parameters for [`LogisticModel::fit`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub max_iter: usize,
    /// Stop once every gradient component is below this magnitude
    pub tolerance: f64,
    /// Inverse L2 strength; larger means weaker regularization
    pub regularization: f64,
    /// Fraction of the largest provably stable step, in (0, 1]
    pub learning_rate: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-4,
            regularization: 1.0,
            learning_rate: 1.0,
        }
    }
}

/// Fitted linear binary classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Gradient steps taken during fitting
    pub iterations: usize,
}

impl LogisticModel {
    /// Fit on `features` (one row per example) and binary `labels`.
    ///
    /// Fails with `NoTrainingData` on an empty set and with
    /// `InsufficientLabelDiversity` when only one label value is present.
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[bool],
        params: &TrainingParams,
    ) -> Result<Self, EngineError> {
        if features.len() != labels.len() {
            return Err(EngineError::Validation(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(EngineError::NoTrainingData);
        }

        let dims = features[0].len();
        if let Some(row) = features.iter().find(|row| row.len() != dims) {
            return Err(EngineError::Validation(format!(
                "Ragged feature matrix: expected {} columns, found {}",
                dims,
                row.len()
            )));
        }

        let positives = labels.iter().filter(|l| **l).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(EngineError::InsufficientLabelDiversity);
        }
        if !(params.regularization > 0.0 && params.regularization.is_finite()) {
            return Err(EngineError::Validation(format!(
                "Regularization must be positive, got {}",
                params.regularization
            )));
        }

        let n = labels.len() as f64;
        // balanced: n / (classes * count_of_class)
        let positive_weight = n / (2.0 * positives as f64);
        let negative_weight = n / (2.0 * negatives as f64);
        let l2 = 1.0 / (params.regularization * n);

        // Sample weights average to 1, so the Hessian is bounded by
        // 0.25 * max ||[x, 1]||^2 + l2.
        let max_norm_sq = features
            .iter()
            .map(|row| row.iter().map(|v| v * v).sum::<f64>() + 1.0)
            .fold(1.0, f64::max);
        let lipschitz = 0.25 * max_norm_sq + l2;
        let step = params.learning_rate.clamp(f64::EPSILON, 1.0) / lipschitz;

        let mut coefficients = vec![0.0; dims];
        let mut intercept = 0.0;
        let mut grad = vec![0.0; dims];
        let mut iterations = 0;

        while iterations < params.max_iter {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_intercept = 0.0;

            for (row, &label) in features.iter().zip(labels) {
                let p = sigmoid(dot(&coefficients, row) + intercept);
                let (target, weight) = if label {
                    (1.0, positive_weight)
                } else {
                    (0.0, negative_weight)
                };
                let residual = weight * (p - target) / n;

                for (g, x) in grad.iter_mut().zip(row) {
                    *g += residual * x;
                }
                grad_intercept += residual;
            }

            for (g, w) in grad.iter_mut().zip(&coefficients) {
                *g += l2 * w;
            }

            let max_grad = grad
                .iter()
                .fold(grad_intercept.abs(), |acc, g| acc.max(g.abs()));
            if max_grad < params.tolerance {
                break;
            }

            for (w, g) in coefficients.iter_mut().zip(&grad) {
                *w -= step * g;
            }
            intercept -= step * grad_intercept;
            iterations += 1;
        }

        tracing::debug!(
            "Fitted logistic model: rows={}, features={}, iterations={}",
            labels.len(),
            dims,
            iterations
        );

        Ok(Self {
            coefficients,
            intercept,
            iterations,
        })
    }

    /// Probability of the positive class ("supported") for one feature vector
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, EngineError> {
        if features.len() != self.coefficients.len() {
            return Err(EngineError::Validation(format!(
                "Model expects {} features, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }
        Ok(sigmoid(dot(&self.coefficients, features) + self.intercept))
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Numerically stable logistic function
#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
