//! Offline training: dataset to persisted model artifacts.
//!
//! The pipeline mirrors what the service does at inference time. Reviews
//! are cleaned by the same [`ReviewNormalizer`] and the resulting
//! artifact records that normalizer's fingerprint, so a model can only be
//! served next to the rules it was trained under.

pub mod dataset;
pub mod report;
pub mod split;

use std::path::Path;

use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::SentinelConfig;
use crate::error::{Result, SentinelError};
use crate::ml::{
    ArtifactMetadata, ClassWeight, FitSummary, LabelMapping, LogisticRegression, LogisticSettings,
    ModelArtifact, TfIdfVectorizer, VectorizerSettings,
};
use crate::normalize::ReviewNormalizer;
use crate::resources::LexiconResolver;

pub use dataset::{CleanedSample, DatasetStats, LabeledReview};
pub use report::{ClassMetrics, ClassificationReport};
pub use split::train_test_split;

/// Everything one training run produced.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub report: ClassificationReport,
    pub fit: FitSummary,
    pub dataset: DatasetStats,
    /// `(genuine, fake)` counts after cleaning.
    pub distribution: (usize, usize),
}

/// Serializable digest of a [`TrainingOutcome`].
#[derive(Debug, Serialize)]
pub struct TrainingSummary<'a> {
    pub dataset: &'a DatasetStats,
    pub genuine_samples: usize,
    pub fake_samples: usize,
    pub features: usize,
    pub fit: &'a FitSummary,
    pub report: &'a ClassificationReport,
}

impl TrainingOutcome {
    pub fn summary(&self) -> TrainingSummary<'_> {
        TrainingSummary {
            dataset: &self.dataset,
            genuine_samples: self.distribution.0,
            fake_samples: self.distribution.1,
            features: self.artifact.vectorizer().dimension(),
            fit: &self.fit,
            report: &self.report,
        }
    }
}

/// Clean, split, fit and evaluate in memory. Nothing is written to disk.
pub fn fit_reviews(
    config: &SentinelConfig,
    normalizer: &ReviewNormalizer,
    reviews: &[LabeledReview],
) -> Result<TrainingOutcome> {
    let training = &config.training;
    let samples = dataset::clean_reviews(normalizer, reviews, training.min_cleaned_chars);
    let distribution = dataset::class_distribution(&samples);
    tracing::info!(
        genuine = distribution.0,
        fake = distribution.1,
        dropped = reviews.len() - samples.len(),
        "class distribution after cleaning"
    );
    if distribution.0 == 0 || distribution.1 == 0 {
        return Err(SentinelError::training(format!(
            "both classes are required, got {} genuine and {} fake samples",
            distribution.0, distribution.1
        )));
    }

    let (train, test) = train_test_split(samples, training.test_size, training.seed)?;
    tracing::info!(train = train.len(), test = test.len(), "dataset split");

    let train_texts: Vec<String> = train.iter().map(|s| s.cleaned.clone()).collect();
    let train_labels: Vec<u8> = train.iter().map(|s| s.class).collect();

    let mut vectorizer = TfIdfVectorizer::new(VectorizerSettings::from_training(training))?;
    vectorizer.fit(&train_texts)?;

    let encode = |texts: &[CleanedSample]| -> Result<Vec<_>> {
        texts
            .par_iter()
            .map(|s| vectorizer.encode_str(&s.cleaned))
            .collect()
    };
    let train_features = encode(&train)?;
    let test_features = encode(&test)?;

    let mut classifier = LogisticRegression::new(
        vectorizer.dimension(),
        LogisticSettings {
            c: training.c,
            max_iter: training.max_iter,
            tolerance: training.tolerance,
            class_weight: ClassWeight::Balanced,
        },
    );
    let fit = classifier.fit(&train_features, &train_labels)?;
    if !fit.converged {
        tracing::warn!(iterations = fit.iterations, "solver stopped before converging");
    }

    let predicted = test_features
        .iter()
        .map(|x| classifier.classify(x).map(|(class, _)| class))
        .collect::<Result<Vec<u8>>>()?;
    let truth: Vec<u8> = test.iter().map(|s| s.class).collect();
    let report = ClassificationReport::evaluate(
        [
            config.labels.genuine_label.as_str(),
            config.labels.fake_label.as_str(),
        ],
        &truth,
        &predicted,
    );
    tracing::info!(accuracy = report.accuracy, "held-out evaluation finished");

    let metadata = ArtifactMetadata {
        trainer_version: crate::VERSION.to_string(),
        trained_at: Utc::now(),
        labels: LabelMapping::from(&config.labels),
        normalizer_fingerprint: normalizer.fingerprint(),
        train_samples: train.len(),
        test_samples: test.len(),
        iterations: fit.iterations,
        converged: fit.converged,
    };
    let artifact = ModelArtifact::new(vectorizer, classifier, metadata)?;

    Ok(TrainingOutcome {
        artifact,
        report,
        fit,
        dataset: DatasetStats {
            rows: reviews.len(),
            kept: reviews.len(),
            ..Default::default()
        },
        distribution,
    })
}

/// Train from a CSV file and write the artifacts to the configured model dir.
pub fn train(config: &SentinelConfig, data: &Path) -> Result<TrainingOutcome> {
    let acquisition = LexiconResolver::from_config(&config.resources).acquire()?;
    let normalizer = ReviewNormalizer::new(&config.normalizer, &acquisition.lexicon)?;

    let (reviews, stats) = dataset::load_dataset(data, &config.labels)?;
    if reviews.is_empty() {
        return Err(SentinelError::training(format!(
            "'{}' has no usable rows",
            data.display()
        )));
    }

    let mut outcome = fit_reviews(config, &normalizer, &reviews)?;
    outcome.dataset = stats;
    outcome.artifact.save(&config.model)?;
    Ok(outcome)
}
