//! Review text normalization.
//!
//! [`ReviewNormalizer`] turns a raw review into a [`CleanedText`] or explains
//! why it refuses to: the text is too short, it looks like source code, or
//! nothing meaningful survives cleaning. The same normalizer runs at training
//! time and at serving time, and its [`NormalizerProfile`] fingerprint ties a
//! trained model to the exact cleaning rules it was fitted under.
//!
//! # Examples
//!
//! ```
//! use review_sentinel::config::NormalizerConfig;
//! use review_sentinel::normalize::{Rejection, ReviewNormalizer};
//! use review_sentinel::resources::{BundledStrategy, AcquisitionStrategy};
//!
//! let lexicon = BundledStrategy.acquire().unwrap();
//! let normalizer = ReviewNormalizer::new(&NormalizerConfig::default(), &lexicon).unwrap();
//!
//! let cleaned = normalizer.normalize("This is an AMAZING kettle, boils in seconds!").unwrap();
//! assert_eq!(cleaned.unwrap().as_str(), "amazing kettle boils seconds");
//!
//! let rejected = normalizer.normalize("ok").unwrap();
//! assert!(matches!(rejected, Err(Rejection::TooShort { .. })));
//! ```

pub mod guard;
pub mod profile;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::char_filter::PatternReplaceCharFilter;
use crate::analysis::token::token_texts;
use crate::analysis::token_filter::{LowercaseFilter, MinLengthFilter};
use crate::analysis::tokenizer::{Tokenizer, UnicodeWordTokenizer, WhitespaceTokenizer};
use crate::config::NormalizerConfig;
use crate::error::Result;
use crate::resources::{Lexicon, LexiconSource};

pub use guard::CodePatternGuard;
pub use profile::NormalizerProfile;

/// Why a review was refused before classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Fewer than `min` characters after trimming.
    TooShort { chars: usize, min: usize },
    /// Contains a blacklisted code keyword or substring.
    CodeLike { matched: String },
    /// Nothing survived cleaning.
    NoTokens,
}

impl Rejection {
    /// Human readable reason, suitable for API clients.
    pub fn message(&self) -> String {
        match self {
            Rejection::TooShort { min, .. } => format!(
                "Invalid input: review is too short (at least {min} characters are required)"
            ),
            Rejection::CodeLike { .. } => {
                "Invalid input: text looks like source code, not a product review".to_string()
            }
            Rejection::NoTokens => {
                "Invalid input: review has no meaningful words after cleaning".to_string()
            }
        }
    }

    /// Stable machine readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::TooShort { .. } => "too_short",
            Rejection::CodeLike { .. } => "code_like",
            Rejection::NoTokens => "no_tokens",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Normalized review text: lowercase tokens joined by single spaces.
///
/// Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CleanedText(String);

impl CleanedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn token_count(&self) -> usize {
        self.0.split(' ').count()
    }
}

impl fmt::Display for CleanedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CleanedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The outcome of normalizing one review.
pub type Normalized = std::result::Result<CleanedText, Rejection>;

/// Deterministic review cleaner.
#[derive(Clone, Debug)]
pub struct ReviewNormalizer {
    min_chars: usize,
    guard: CodePatternGuard,
    analyzer: PipelineAnalyzer,
    profile: NormalizerProfile,
    fingerprint: u32,
    lexicon_source: LexiconSource,
}

impl ReviewNormalizer {
    /// Build a normalizer with the Unicode word tokenizer and whitespace fallback.
    pub fn new(config: &NormalizerConfig, lexicon: &Lexicon) -> Result<Self> {
        Self::with_tokenizer(config, lexicon, Arc::new(UnicodeWordTokenizer::new()))
    }

    /// Build a normalizer around a custom primary tokenizer.
    pub fn with_tokenizer(
        config: &NormalizerConfig,
        lexicon: &Lexicon,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Result<Self> {
        let guard = CodePatternGuard::new(&config.code_keywords, &config.code_substrings)?;

        let profile = NormalizerProfile {
            min_chars: config.min_chars,
            min_token_chars: config.min_token_chars,
            code_keywords: config.code_keywords.clone(),
            code_substrings: config.code_substrings.clone(),
            tokenizer: tokenizer.name().to_string(),
            stop_words: lexicon.words().to_vec(),
        };
        let fingerprint = profile.fingerprint();

        let analyzer = PipelineAnalyzer::new(tokenizer)
            .with_fallback_tokenizer(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::strip_punctuation()?))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(lexicon.stop_filter()))
            .add_filter(Arc::new(MinLengthFilter::new(config.min_token_chars)))
            .with_name("review_normalizer");

        Ok(ReviewNormalizer {
            min_chars: config.min_chars,
            guard,
            analyzer,
            profile,
            fingerprint,
            lexicon_source: lexicon.source().clone(),
        })
    }

    /// Normalize one review.
    ///
    /// The outer `Result` carries internal failures only; refusals are the
    /// inner [`Rejection`].
    pub fn normalize(&self, raw: &str) -> Result<Normalized> {
        let chars = raw.trim().chars().count();
        if chars < self.min_chars {
            return Ok(Err(Rejection::TooShort {
                chars,
                min: self.min_chars,
            }));
        }

        if let Some(matched) = self.guard.find(raw) {
            return Ok(Err(Rejection::CodeLike {
                matched: matched.to_string(),
            }));
        }

        let tokens = token_texts(self.analyzer.analyze(raw)?);
        if tokens.is_empty() {
            return Ok(Err(Rejection::NoTokens));
        }

        Ok(Ok(CleanedText(tokens.join(" "))))
    }

    /// Cleaned text, or the empty string for any rejection or failure.
    ///
    /// This is the form used to build training corpora.
    pub fn clean_text(&self, raw: &str) -> String {
        match self.normalize(raw) {
            Ok(Ok(cleaned)) => cleaned.into_string(),
            Ok(Err(_)) => String::new(),
            Err(err) => {
                tracing::warn!(error = %err, "normalization failed");
                String::new()
            }
        }
    }

    pub fn profile(&self) -> &NormalizerProfile {
        &self.profile
    }

    /// CRC32 of [`NormalizerProfile`].
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    pub fn lexicon_source(&self) -> &LexiconSource {
        &self.lexicon_source
    }

    /// Name of the primary tokenizer.
    pub fn tokenizer_name(&self) -> &str {
        &self.profile.tokenizer
    }
}
