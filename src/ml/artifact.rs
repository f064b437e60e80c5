//! Persisted model artifacts.
//!
//! A model is two blob files in the model directory: the fitted vectorizer,
//! and the fitted classifier together with [`ArtifactMetadata`]. Both are
//! bincode payloads inside checksummed [`blob`](crate::storage::blob) frames.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{LabelsConfig, ModelConfig};
use crate::error::{Result, SentinelError};
use crate::ml::logistic::LogisticRegression;
use crate::ml::tfidf::TfIdfVectorizer;
use crate::storage::blob::{BlobKind, load_blob, save_blob};

/// Dataset label strings the two classes were trained from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMapping {
    /// Dataset label of class 1 (fake).
    pub fake: String,
    /// Dataset label of class 0 (genuine).
    pub genuine: String,
}

impl From<&LabelsConfig> for LabelMapping {
    fn from(config: &LabelsConfig) -> Self {
        LabelMapping {
            fake: config.fake_label.clone(),
            genuine: config.genuine_label.clone(),
        }
    }
}

/// Facts about how a model was produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Version of the crate that trained the model.
    pub trainer_version: String,
    pub trained_at: DateTime<Utc>,
    pub labels: LabelMapping,
    /// Fingerprint of the normalizer profile used to clean the corpus.
    pub normalizer_fingerprint: u32,
    pub train_samples: usize,
    pub test_samples: usize,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Serialize)]
struct ClassifierPayloadRef<'a> {
    metadata: &'a ArtifactMetadata,
    model: &'a LogisticRegression,
}

#[derive(Deserialize)]
struct ClassifierPayload {
    metadata: ArtifactMetadata,
    model: LogisticRegression,
}

/// A fitted vectorizer and classifier that agree on the feature dimension.
#[derive(Clone, Debug)]
pub struct ModelArtifact {
    vectorizer: TfIdfVectorizer,
    classifier: LogisticRegression,
    metadata: ArtifactMetadata,
}

impl ModelArtifact {
    pub fn new(
        vectorizer: TfIdfVectorizer,
        classifier: LogisticRegression,
        metadata: ArtifactMetadata,
    ) -> Result<Self> {
        if vectorizer.dimension() != classifier.dimension() {
            return Err(SentinelError::artifact_mismatch(format!(
                "classifier has {} weights but the vectorizer produces {} features",
                classifier.dimension(),
                vectorizer.dimension()
            )));
        }
        if !vectorizer.is_fitted() {
            return Err(SentinelError::artifact_mismatch("vectorizer is not fitted"));
        }
        Ok(ModelArtifact {
            vectorizer,
            classifier,
            metadata,
        })
    }

    /// Write both blobs into the model directory.
    pub fn save(&self, config: &ModelConfig) -> Result<()> {
        let vectorizer = bincode::serialize(&self.vectorizer)?;
        let classifier = bincode::serialize(&ClassifierPayloadRef {
            metadata: &self.metadata,
            model: &self.classifier,
        })?;

        save_blob(&config.vectorizer_path(), BlobKind::Vectorizer, &vectorizer)?;
        save_blob(&config.classifier_path(), BlobKind::Classifier, &classifier)?;

        tracing::info!(
            dir = %config.dir.display(),
            features = self.vectorizer.dimension(),
            "model artifacts saved"
        );
        Ok(())
    }

    /// Read both blobs from the model directory and check they agree.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let vectorizer_path = config.vectorizer_path();
        let classifier_path = config.classifier_path();

        let bytes = load_blob(&vectorizer_path, BlobKind::Vectorizer)?;
        let vectorizer: TfIdfVectorizer = bincode::deserialize(&bytes).map_err(|e| {
            SentinelError::artifact_corrupt(format!("{}: {e}", vectorizer_path.display()))
        })?;

        let bytes = load_blob(&classifier_path, BlobKind::Classifier)?;
        let payload: ClassifierPayload = bincode::deserialize(&bytes).map_err(|e| {
            SentinelError::artifact_corrupt(format!("{}: {e}", classifier_path.display()))
        })?;

        let artifact = ModelArtifact::new(vectorizer, payload.model, payload.metadata)?;
        tracing::info!(
            features = artifact.vectorizer.dimension(),
            trained_at = %artifact.metadata.trained_at,
            "model artifacts loaded"
        );
        Ok(artifact)
    }

    /// Fail unless the model was trained under the normalizer with `fingerprint`.
    pub fn verify_normalizer(&self, fingerprint: u32) -> Result<()> {
        if self.metadata.normalizer_fingerprint != fingerprint {
            return Err(SentinelError::artifact_mismatch(format!(
                "model was trained with normalizer profile {:08x}, the running normalizer is {:08x}",
                self.metadata.normalizer_fingerprint, fingerprint
            )));
        }
        Ok(())
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }
}
