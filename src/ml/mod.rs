//! Feature extraction and classification.
//!
//! - [`tfidf`]: cleaned review text to sparse TF-IDF vectors
//! - [`logistic`]: binary logistic regression over those vectors
//! - [`artifact`]: the fitted pair persisted as model files

pub mod artifact;
pub mod feature;
pub mod logistic;
pub mod tfidf;

pub use artifact::{ArtifactMetadata, LabelMapping, ModelArtifact};
pub use feature::FeatureVector;
pub use logistic::{ClassWeight, FitSummary, LogisticRegression, LogisticSettings};
pub use tfidf::{TfIdfVectorizer, VectorizerSettings};
