//! The review classification service.
//!
//! A [`ServiceContext`] owns everything a prediction needs: the normalizer,
//! the fitted vectorizer and classifier. It is built once by
//! [`ServiceContext::bootstrap`] and is read-only afterwards, so one instance
//! is shared by every request without locking.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::SentinelConfig;
use crate::error::Result;
use crate::ml::artifact::ModelArtifact;
use crate::ml::logistic::confidence;
use crate::normalize::{CleanedText, Rejection, ReviewNormalizer};
use crate::resources::{AcquisitionAttempt, LexiconResolver, LexiconSource};

/// Maximum number of input characters written to logs.
pub const LOG_PREVIEW_CHARS: usize = 50;

/// The class of a review.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewLabel {
    /// Written by a person (class 0).
    #[serde(rename = "Real Review")]
    Genuine,
    /// Machine generated (class 1).
    #[serde(rename = "Fake Review")]
    Fake,
}

impl ReviewLabel {
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            ReviewLabel::Fake
        } else {
            ReviewLabel::Genuine
        }
    }

    pub fn class(self) -> u8 {
        match self {
            ReviewLabel::Genuine => 0,
            ReviewLabel::Fake => 1,
        }
    }

    /// The label string returned to API clients.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewLabel::Genuine => "Real Review",
            ReviewLabel::Fake => "Fake Review",
        }
    }
}

impl fmt::Display for ReviewLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful classification.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub label: ReviewLabel,
    /// Probability of the chosen label, in `[0.5, 1.0]`.
    pub confidence: f64,
    /// Probability of the fake class.
    pub fake_probability: f64,
    /// The normalized text that was classified.
    pub cleaned: CleanedText,
}

/// An unexpected failure while classifying an accepted review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InternalFailure {
    pub message: String,
}

impl fmt::Display for InternalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Everything [`ServiceContext::predict`] can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictOutcome {
    Classified(Prediction),
    Rejected(Rejection),
    Failed(InternalFailure),
}

/// Cut `text` to at most [`LOG_PREVIEW_CHARS`] characters for logging.
pub fn log_preview(text: &str) -> &str {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Read-only state shared by all predictions.
#[derive(Debug)]
pub struct ServiceContext {
    normalizer: ReviewNormalizer,
    artifact: ModelArtifact,
    lexicon_attempts: Vec<AcquisitionAttempt>,
    resource_paths: Vec<PathBuf>,
}

impl ServiceContext {
    /// Pair a normalizer with a model, refusing models trained under other rules.
    pub fn new(normalizer: ReviewNormalizer, artifact: ModelArtifact) -> Result<Self> {
        artifact.verify_normalizer(normalizer.fingerprint())?;
        Ok(ServiceContext {
            normalizer,
            artifact,
            lexicon_attempts: Vec::new(),
            resource_paths: Vec::new(),
        })
    }

    /// Acquire the lexicon, build the normalizer and load the model.
    ///
    /// Any error here is fatal for the serving process.
    pub fn bootstrap(config: &SentinelConfig) -> Result<Self> {
        let acquisition = LexiconResolver::from_config(&config.resources).acquire()?;
        let normalizer = ReviewNormalizer::new(&config.normalizer, &acquisition.lexicon)?;
        let artifact = ModelArtifact::load(&config.model)?;

        let mut context = ServiceContext::new(normalizer, artifact)?;
        context.lexicon_attempts = acquisition.attempts;
        context.resource_paths = config.resources.search_paths.clone();

        tracing::info!(
            lexicon = %context.normalizer.lexicon_source(),
            fingerprint = format_args!("{:08x}", context.normalizer.fingerprint()),
            features = context.artifact.vectorizer().dimension(),
            "service context ready"
        );
        Ok(context)
    }

    /// Classify one review.
    pub fn predict(&self, review: &str) -> PredictOutcome {
        let cleaned = match self.normalizer.normalize(review) {
            Ok(Ok(cleaned)) => cleaned,
            Ok(Err(rejection)) => {
                tracing::info!(
                    reason = rejection.kind(),
                    input = log_preview(review),
                    "review rejected"
                );
                return PredictOutcome::Rejected(rejection);
            }
            Err(err) => return self.failure(review, format!("normalization failed: {err}")),
        };

        let features = match self.artifact.vectorizer().encode(&cleaned) {
            Ok(features) => features,
            Err(err) => return self.failure(review, format!("feature encoding failed: {err}")),
        };

        let (class, fake_probability) = match self.artifact.classifier().classify(&features) {
            Ok(result) => result,
            Err(err) => return self.failure(review, format!("classification failed: {err}")),
        };

        let prediction = Prediction {
            label: ReviewLabel::from_class(class),
            confidence: confidence(fake_probability),
            fake_probability,
            cleaned,
        };
        tracing::info!(
            label = %prediction.label,
            confidence = prediction.confidence,
            input = log_preview(review),
            "review classified"
        );
        PredictOutcome::Classified(prediction)
    }

    fn failure(&self, review: &str, message: String) -> PredictOutcome {
        tracing::error!(input = log_preview(review), error = %message, "prediction failed");
        PredictOutcome::Failed(InternalFailure { message })
    }

    pub fn normalizer(&self) -> &ReviewNormalizer {
        &self.normalizer
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn lexicon_source(&self) -> &LexiconSource {
        self.normalizer.lexicon_source()
    }

    /// How the lexicon was found, in attempt order.
    pub fn lexicon_attempts(&self) -> &[AcquisitionAttempt] {
        &self.lexicon_attempts
    }

    pub fn resource_paths(&self) -> &[PathBuf] {
        &self.resource_paths
    }
}
