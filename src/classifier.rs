// 📈 Multinomial logistic regression over sparse TF-IDF vectors
//
// One weight row and one bias per class, softmax output, L2 penalty on the
// weights. Fitted with full-batch gradient descent from zero weights, so
// training is deterministic.

use crate::config::TrainingConfig;
use crate::vectorizer::SparseVector;
use ndarray::{Array1, Array2};

/// Outcome of a fit: how long it ran and where it stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
}

/// Softmax classifier: scores = W * x + b
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: Array2<f64>, // [n_classes, n_features]
    bias: Array1<f64>,    // [n_classes]
}

impl LogisticRegression {
    /// Fit on `samples` with class indices `labels` (each `< n_classes`).
    ///
    /// Minimises mean cross-entropy + `||W||^2 / (2 * C * n)` and stops
    /// once every gradient component is below `config.tolerance`, or after
    /// `config.max_iterations` updates.
    pub fn fit(
        samples: &[SparseVector],
        labels: &[usize],
        n_features: usize,
        n_classes: usize,
        config: &TrainingConfig,
    ) -> (Self, FitReport) {
        debug_assert_eq!(samples.len(), labels.len());

        let mut model = LogisticRegression {
            weights: Array2::zeros((n_classes, n_features)),
            bias: Array1::zeros(n_classes),
        };

        let n = samples.len().max(1) as f64;
        let penalty = 1.0 / (config.regularization * n);

        let mut report = FitReport {
            iterations: 0,
            converged: false,
            final_loss: f64::INFINITY,
        };

        while report.iterations < config.max_iterations {
            let mut grad_w = &model.weights * penalty;
            let mut grad_b = Array1::<f64>::zeros(n_classes);
            let mut loss = 0.5 * penalty * model.weights.iter().map(|w| w * w).sum::<f64>();

            for (x, &label) in samples.iter().zip(labels.iter()) {
                let probs = softmax(&model.scores(x));
                loss -= probs[label].max(f64::MIN_POSITIVE).ln() / n;

                for class in 0..n_classes {
                    let target = if class == label { 1.0 } else { 0.0 };
                    let g = (probs[class] - target) / n;
                    grad_b[class] += g;
                    for &(feature, value) in &x.entries {
                        grad_w[[class, feature]] += g * value;
                    }
                }
            }

            report.final_loss = loss;

            let largest = grad_w
                .iter()
                .chain(grad_b.iter())
                .fold(0.0f64, |acc, g| acc.max(g.abs()));
            if largest < config.tolerance {
                report.converged = true;
                break;
            }

            model.weights.scaled_add(-config.learning_rate, &grad_w);
            model.bias.scaled_add(-config.learning_rate, &grad_b);
            report.iterations += 1;
        }

        (model, report)
    }

    /// Raw class scores for one vector
    pub fn scores(&self, x: &SparseVector) -> Array1<f64> {
        let mut scores = self.bias.clone();
        for (class, score) in scores.iter_mut().enumerate() {
            for &(feature, value) in &x.entries {
                *score += self.weights[[class, feature]] * value;
            }
        }
        scores
    }

    pub fn probabilities(&self, x: &SparseVector) -> Array1<f64> {
        softmax(&self.scores(x))
    }

    /// Index of the highest-scoring class; ties go to the lowest index
    pub fn predict(&self, x: &SparseVector) -> usize {
        let scores = self.scores(x);
        let mut best = 0;
        for (class, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = class;
            }
        }
        best
    }
}

/// Numerically stable softmax
fn softmax(x: &Array1<f64>) -> Array1<f64> {
    let max = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp: Array1<f64> = x.mapv(|v| (v - max).exp());
    let sum: f64 = exp.sum();
    exp / sum
}
