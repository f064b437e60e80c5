//! Error types for review-sentinel.
//!
//! All fallible operations return [`SentinelError`]. Validation failures of a
//! single review are *not* errors: they are modelled as
//! [`Rejection`](crate::normalize::Rejection) values so callers branch on the
//! kind instead of on a message string.
//!
//! # Examples
//!
//! ```
//! use review_sentinel::error::{Result, SentinelError};
//!
//! fn load() -> Result<()> {
//!     Err(SentinelError::resource_missing("lexicon package not found"))
//! }
//!
//! assert!(matches!(load(), Err(SentinelError::ResourceMissing(_))));
//! ```

use std::io;

use thiserror::Error;

/// The main error type for review-sentinel operations.
#[derive(Error, Debug)]
pub enum SentinelError {
    /// I/O errors (file operations, sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV dataset errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Binary (bincode) serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A startup resource (tokenizer lexicon, artifact file) could not be acquired
    #[error("Resource missing: {0}")]
    ResourceMissing(String),

    /// An artifact file exists but does not decode
    #[error("Corrupt artifact: {0}")]
    ArtifactCorrupt(String),

    /// Artifacts decode but disagree with each other or with the live normalizer
    #[error("Artifact mismatch: {0}")]
    ArtifactMismatch(String),

    /// Offline training failures
    #[error("Training error: {0}")]
    Training(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with SentinelError.
pub type Result<T> = std::result::Result<T, SentinelError>;

impl SentinelError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SentinelError::Analysis(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SentinelError::Config(msg.into())
    }

    /// Create a new resource missing error.
    pub fn resource_missing<S: Into<String>>(msg: S) -> Self {
        SentinelError::ResourceMissing(msg.into())
    }

    /// Create a new corrupt artifact error.
    pub fn artifact_corrupt<S: Into<String>>(msg: S) -> Self {
        SentinelError::ArtifactCorrupt(msg.into())
    }

    /// Create a new artifact mismatch error.
    pub fn artifact_mismatch<S: Into<String>>(msg: S) -> Self {
        SentinelError::ArtifactMismatch(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        SentinelError::Training(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SentinelError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SentinelError::Other(msg.into())
    }
}

impl From<bincode::Error> for SentinelError {
    fn from(err: bincode::Error) -> Self {
        SentinelError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SentinelError::analysis("Test analysis error");
        assert_eq!(error.to_string(), "Analysis error: Test analysis error");

        let error = SentinelError::resource_missing("stopwords/english");
        assert_eq!(error.to_string(), "Resource missing: stopwords/english");

        let error = SentinelError::artifact_corrupt("bad magic");
        assert_eq!(error.to_string(), "Corrupt artifact: bad magic");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = SentinelError::from(io_error);

        match error {
            SentinelError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
