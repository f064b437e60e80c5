//! Binary logistic regression.
//!
//! The fitted model scores `z = w · x + b` and predicts `P(y = 1) = σ(z)`.
//! Training minimizes the L2-regularized, class-weighted log loss
//!
//! ```text
//! ½‖w‖² + ½b² + C · Σᵢ sᵢ · log(1 + exp(−yᵢ zᵢ)),   yᵢ ∈ {−1, +1}
//! ```
//!
//! with full-batch gradient descent and a backtracking (Armijo) line search.
//! The intercept is penalized like any other weight. The procedure is fully
//! deterministic.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentinelError};
use crate::ml::feature::FeatureVector;

const ARMIJO: f64 = 1e-4;
const MIN_STEP: f64 = 1e-12;

/// How training samples are weighted by class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every sample weighs 1.
    Uniform,
    /// Class `c` samples weigh `n / (2 · count(c))`.
    Balanced,
}

/// Solver and regularization settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticSettings {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    /// Stop when the gradient norm falls below `tolerance` times its initial value.
    pub tolerance: f64,
    pub class_weight: ClassWeight,
}

impl Default for LogisticSettings {
    fn default() -> Self {
        LogisticSettings {
            c: 0.5,
            max_iter: 1000,
            tolerance: 1e-4,
            class_weight: ClassWeight::Balanced,
        }
    }
}

/// What happened during fitting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    pub final_objective: f64,
}

/// A binary logistic regression model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    settings: LogisticSettings,
    coef: Vec<f64>,
    intercept: f64,
}

/// Numerically stable `log(1 + exp(-margin))`.
fn log_loss(margin: f64) -> f64 {
    if margin > 0.0 {
        (-margin).exp().ln_1p()
    } else {
        -margin + margin.exp().ln_1p()
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

struct Problem<'a> {
    samples: &'a [FeatureVector],
    signs: Vec<f64>,
    weights: Vec<f64>,
    c: f64,
}

impl Problem<'_> {
    fn objective(&self, coef: &[f64], intercept: f64) -> f64 {
        let penalty = 0.5 * (coef.iter().map(|w| w * w).sum::<f64>() + intercept * intercept);
        let loss: f64 = self
            .samples
            .iter()
            .zip(&self.signs)
            .zip(&self.weights)
            .map(|((x, &y), &s)| s * log_loss(y * (x.dot_unchecked(coef) + intercept)))
            .sum();
        penalty + self.c * loss
    }

    fn gradient(&self, coef: &[f64], intercept: f64) -> (Vec<f64>, f64) {
        let mut grad = coef.to_vec();
        let mut grad_b = intercept;
        for ((x, &y), &s) in self.samples.iter().zip(&self.signs).zip(&self.weights) {
            let z = x.dot_unchecked(coef) + intercept;
            let target = if y > 0.0 { 1.0 } else { 0.0 };
            let residual = self.c * s * (sigmoid(z) - target);
            for &(i, v) in x.entries() {
                grad[i] += residual * v;
            }
            grad_b += residual;
        }
        (grad, grad_b)
    }
}

impl LogisticRegression {
    /// An unfitted model of the given dimension with all-zero weights.
    pub fn new(dimension: usize, settings: LogisticSettings) -> Self {
        LogisticRegression {
            settings,
            coef: vec![0.0; dimension],
            intercept: 0.0,
        }
    }

    /// Rebuild a model from known weights.
    pub fn from_weights(coef: Vec<f64>, intercept: f64, settings: LogisticSettings) -> Result<Self> {
        if coef.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
            return Err(SentinelError::invalid_argument("weights must be finite"));
        }
        Ok(LogisticRegression {
            settings,
            coef,
            intercept,
        })
    }

    /// Fit on samples labelled 0 or 1.
    pub fn fit(&mut self, samples: &[FeatureVector], labels: &[u8]) -> Result<FitSummary> {
        if samples.len() != labels.len() {
            return Err(SentinelError::training(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&l| l > 1) {
            return Err(SentinelError::training(format!("label {bad} is not 0 or 1")));
        }
        if let Some(x) = samples.iter().find(|x| x.dimension() != self.coef.len()) {
            return Err(SentinelError::training(format!(
                "sample dimension {} does not match model dimension {}",
                x.dimension(),
                self.coef.len()
            )));
        }
        let positives = labels.iter().filter(|&&l| l == 1).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(SentinelError::training(
                "training data must contain both classes",
            ));
        }

        let n = labels.len() as f64;
        let (w_pos, w_neg) = match self.settings.class_weight {
            ClassWeight::Uniform => (1.0, 1.0),
            ClassWeight::Balanced => (n / (2.0 * positives as f64), n / (2.0 * negatives as f64)),
        };
        let problem = Problem {
            samples,
            signs: labels.iter().map(|&l| if l == 1 { 1.0 } else { -1.0 }).collect(),
            weights: labels
                .iter()
                .map(|&l| if l == 1 { w_pos } else { w_neg })
                .collect(),
            c: self.settings.c,
        };

        let mut coef = vec![0.0; self.coef.len()];
        let mut intercept = 0.0;
        let mut objective = problem.objective(&coef, intercept);
        let (mut grad, mut grad_b) = problem.gradient(&coef, intercept);
        let initial_norm = grad_norm(&grad, grad_b).max(f64::MIN_POSITIVE);
        let mut step = 1.0;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.settings.max_iter {
            let norm = grad_norm(&grad, grad_b);
            if norm <= self.settings.tolerance * initial_norm {
                converged = true;
                break;
            }
            iterations += 1;

            let norm_sq = norm * norm;
            let mut accepted = None;
            while step >= MIN_STEP {
                let candidate: Vec<f64> = coef.iter().zip(&grad).map(|(w, g)| w - step * g).collect();
                let candidate_b = intercept - step * grad_b;
                let value = problem.objective(&candidate, candidate_b);
                if value <= objective - ARMIJO * step * norm_sq {
                    accepted = Some((candidate, candidate_b, value));
                    break;
                }
                step *= 0.5;
            }

            let Some((next, next_b, value)) = accepted else {
                // no descent possible at machine precision
                converged = true;
                break;
            };

            coef = next;
            intercept = next_b;
            objective = value;
            (grad, grad_b) = problem.gradient(&coef, intercept);
            step = (step * 2.0).min(1.0);
        }

        if !objective.is_finite() {
            return Err(SentinelError::training("objective diverged"));
        }

        self.coef = coef;
        self.intercept = intercept;

        tracing::debug!(iterations, converged, objective, "logistic regression fitted");
        Ok(FitSummary {
            iterations,
            converged,
            final_objective: objective,
        })
    }

    /// Raw score `w · x + b`.
    pub fn decision_function(&self, x: &FeatureVector) -> Result<f64> {
        let z = x.dot(&self.coef)? + self.intercept;
        if !z.is_finite() {
            return Err(SentinelError::other("decision score is not finite"));
        }
        Ok(z)
    }

    /// Probability of class 1.
    pub fn predict_proba(&self, x: &FeatureVector) -> Result<f64> {
        Ok(sigmoid(self.decision_function(x)?))
    }

    /// Label (1 iff `P(1) > 0.5`) and the probability of class 1.
    pub fn classify(&self, x: &FeatureVector) -> Result<(u8, f64)> {
        let p = self.predict_proba(x)?;
        Ok((u8::from(p > 0.5), p))
    }

    pub fn dimension(&self) -> usize {
        self.coef.len()
    }

    pub fn coef(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn settings(&self) -> &LogisticSettings {
        &self.settings
    }
}

fn grad_norm(grad: &[f64], grad_b: f64) -> f64 {
    (grad.iter().map(|g| g * g).sum::<f64>() + grad_b * grad_b).sqrt()
}

/// Confidence of a binary decision: the probability of the chosen label.
pub fn confidence(p_positive: f64) -> f64 {
    p_positive.max(1.0 - p_positive)
}
