//! Configuration for review-sentinel.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `SENTINEL_*` environment variables, then CLI flags (applied by the CLI).
//! Every section can be omitted from the TOML file.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//! request_timeout_ms = 5000
//!
//! [model]
//! dir = "/var/lib/review-sentinel/model"
//!
//! [labels]
//! fake_label = "CG"
//! genuine_label = "OR"
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentinelError};

/// Blacklisted whole words that mark a review as code-like.
pub const DEFAULT_CODE_KEYWORDS: &[&str] = &[
    "import", "def", "function", "class", "return", "print", "for", "if",
];

/// Blacklisted substrings that mark a review as code-like.
pub const DEFAULT_CODE_SUBSTRINGS: &[&str] = &[".py"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub resources: ResourcesConfig,
    pub normalizer: NormalizerConfig,
    pub labels: LabelsConfig,
    pub training: TrainingConfig,
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Per-request deadline; exceeded requests get HTTP 504.
    pub request_timeout_ms: u64,
    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
    /// Expose `GET /debug/resources`.
    pub enable_debug_endpoints: bool,
    /// Emit logs as JSON lines.
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0:5000".to_string(),
            request_timeout_ms: 10_000,
            max_body_bytes: 64 * 1024,
            enable_debug_endpoints: false,
            log_json: false,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Where the fitted artifacts live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub dir: PathBuf,
    pub vectorizer_file: String,
    pub classifier_file: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            dir: PathBuf::from("model"),
            vectorizer_file: "vectorizer.bin".to_string(),
            classifier_file: "classifier.bin".to_string(),
        }
    }
}

impl ModelConfig {
    /// Full path of the vectorizer artifact.
    pub fn vectorizer_path(&self) -> PathBuf {
        self.dir.join(&self.vectorizer_file)
    }

    /// Full path of the classifier artifact.
    pub fn classifier_path(&self) -> PathBuf {
        self.dir.join(&self.classifier_file)
    }
}

/// Tokenizer resource (lexicon package) lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Directories searched, in order, for a lexicon package.
    pub search_paths: Vec<PathBuf>,
    /// Fall back to the compiled-in lexicon when no package is found.
    pub allow_bundled: bool,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        ResourcesConfig {
            search_paths: vec![
                PathBuf::from("resources"),
                PathBuf::from("/usr/local/share/review-sentinel"),
                PathBuf::from("/usr/share/review-sentinel"),
            ],
            allow_bundled: true,
        }
    }
}

/// Review normalizer thresholds and blacklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Minimum trimmed length (in characters) of an acceptable review.
    pub min_chars: usize,
    /// Minimum length (in characters) of a kept token.
    pub min_token_chars: usize,
    /// Whole words that mark a review as code-like. Matched case-sensitively.
    pub code_keywords: Vec<String>,
    /// Substrings that mark a review as code-like.
    pub code_substrings: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            min_chars: 10,
            min_token_chars: 3,
            code_keywords: DEFAULT_CODE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            code_substrings: DEFAULT_CODE_SUBSTRINGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Dataset columns and the mapping from dataset labels to classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub text_column: String,
    pub label_column: String,
    /// Dataset label of computer-generated (fake) reviews; class 1.
    pub fake_label: String,
    /// Dataset label of original (genuine) reviews; class 0.
    pub genuine_label: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        LabelsConfig {
            text_column: "text_".to_string(),
            label_column: "label".to_string(),
            fake_label: "CG".to_string(),
            genuine_label: "OR".to_string(),
        }
    }
}

impl LabelsConfig {
    /// Map a dataset label to its class, or `None` for unknown labels.
    pub fn class_of(&self, label: &str) -> Option<u8> {
        let label = label.trim();
        if label == self.fake_label {
            Some(1)
        } else if label == self.genuine_label {
            Some(0)
        } else {
            None
        }
    }
}

/// Offline training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Inverse L2 regularization strength.
    pub c: f64,
    pub max_iter: usize,
    pub tolerance: f64,
    pub test_size: f64,
    pub seed: u64,
    /// Rows whose cleaned text is not longer than this are dropped.
    pub min_cleaned_chars: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 2,
            c: 0.5,
            max_iter: 1000,
            tolerance: 1e-4,
            test_size: 0.2,
            seed: 42,
            min_cleaned_chars: 10,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

impl SentinelConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SentinelError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SentinelError::config(e.to_string()))
    }

    /// Load from an optional file, apply environment overrides and validate.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `SENTINEL_*` process environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Values that fail to parse leave the setting unchanged.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("SENTINEL_BIND") {
            self.server.bind = bind;
        }
        if let Some(dir) = lookup("SENTINEL_MODEL_DIR") {
            self.model.dir = PathBuf::from(dir);
        }
        if let Some(paths) = lookup("SENTINEL_RESOURCE_PATHS") {
            self.resources.search_paths = parse_list(&paths);
        }
        if let Some(json) = lookup("SENTINEL_LOG_JSON").as_deref().and_then(parse_bool) {
            self.server.log_json = json;
        }
        if let Some(ms) = lookup("SENTINEL_REQUEST_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.server.request_timeout_ms = ms;
        }
        if let Some(bytes) = lookup("SENTINEL_MAX_BODY_BYTES").and_then(|v| v.parse().ok()) {
            self.server.max_body_bytes = bytes;
        }
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            return Err(SentinelError::config("server.bind must not be empty"));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(SentinelError::config(
                "server.request_timeout_ms must be positive",
            ));
        }
        if self.server.max_body_bytes == 0 {
            return Err(SentinelError::config("server.max_body_bytes must be positive"));
        }
        if self.model.vectorizer_file.is_empty() || self.model.classifier_file.is_empty() {
            return Err(SentinelError::config("model file names must not be empty"));
        }
        if self.model.vectorizer_file == self.model.classifier_file {
            return Err(SentinelError::config(
                "model.vectorizer_file and model.classifier_file must differ",
            ));
        }
        if self.resources.search_paths.is_empty() && !self.resources.allow_bundled {
            return Err(SentinelError::config(
                "no resource search paths and the bundled lexicon is disabled",
            ));
        }
        if self.normalizer.min_chars == 0 {
            return Err(SentinelError::config("normalizer.min_chars must be positive"));
        }
        if self.normalizer.code_keywords.iter().any(|k| k.trim().is_empty())
            || self.normalizer.code_substrings.iter().any(|s| s.is_empty())
        {
            return Err(SentinelError::config(
                "normalizer blacklist entries must not be empty",
            ));
        }
        if self.labels.fake_label == self.labels.genuine_label {
            return Err(SentinelError::config(
                "labels.fake_label and labels.genuine_label must differ",
            ));
        }
        let t = &self.training;
        if t.max_features == 0 {
            return Err(SentinelError::config("training.max_features must be positive"));
        }
        if t.ngram_min == 0 || t.ngram_min > t.ngram_max {
            return Err(SentinelError::config(format!(
                "invalid training n-gram range ({}, {})",
                t.ngram_min, t.ngram_max
            )));
        }
        if !(t.c.is_finite() && t.c > 0.0) {
            return Err(SentinelError::config("training.c must be a positive number"));
        }
        if t.max_iter == 0 || !(t.tolerance.is_finite() && t.tolerance > 0.0) {
            return Err(SentinelError::config(
                "training.max_iter and training.tolerance must be positive",
            ));
        }
        if !(t.test_size > 0.0 && t.test_size < 1.0) {
            return Err(SentinelError::config(
                "training.test_size must lie strictly between 0 and 1",
            ));
        }
        Ok(())
    }
}
