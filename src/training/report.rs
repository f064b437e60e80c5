//! Held-out evaluation.

use std::fmt;

use serde::Serialize;

/// Precision, recall and F1 for one class (or one average).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus accuracy and averages over the test split.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Index 0 is the genuine class, index 1 the fake class.
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl ClassificationReport {
    /// Compare predictions against ground truth. Undefined ratios are 0.
    pub fn evaluate(names: [&str; 2], truth: &[u8], predicted: &[u8]) -> Self {
        let total = truth.len().min(predicted.len());
        let pairs = || truth.iter().zip(predicted.iter());

        let classes = [0u8, 1u8].map(|class| {
            let true_pos = pairs().filter(|&(&t, &p)| t == class && p == class).count();
            let predicted_pos = pairs().filter(|&(_, &p)| p == class).count();
            let support = pairs().filter(|&(&t, _)| t == class).count();
            let precision = ratio(true_pos, predicted_pos);
            let recall = ratio(true_pos, support);
            ClassMetrics {
                name: names[class as usize].to_string(),
                precision,
                recall,
                f1: f1(precision, recall),
                support,
            }
        });

        let correct = pairs().filter(|(t, p)| t == p).count();
        let average = |name: &str, weight: &dyn Fn(&ClassMetrics) -> f64| {
            let norm: f64 = classes.iter().map(weight).sum();
            let mean = |metric: fn(&ClassMetrics) -> f64| {
                if norm == 0.0 {
                    0.0
                } else {
                    classes.iter().map(|c| metric(c) * weight(c)).sum::<f64>() / norm
                }
            };
            ClassMetrics {
                name: name.to_string(),
                precision: mean(|c| c.precision),
                recall: mean(|c| c.recall),
                f1: mean(|c| c.f1),
                support: total,
            }
        };
        let macro_avg = average("macro avg", &|_| 1.0);
        let weighted_avg = average("weighted avg", &|c| c.support as f64);

        ClassificationReport {
            classes,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
        }
    }

    pub fn total(&self) -> usize {
        self.macro_avg.support
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.name, m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            row(f, class)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total()
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}
