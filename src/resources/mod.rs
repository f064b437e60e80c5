//! Tokenizer resource acquisition.
//!
//! The normalizer depends on one external resource: an English stop-word
//! lexicon. It is resolved once at startup by trying an ordered list of
//! [`AcquisitionStrategy`] values. Every attempt is recorded and logged, and
//! exhausting the list is a [`SentinelError::ResourceMissing`] naming every
//! attempt.
//!
//! A lexicon package is a directory laid out as:
//!
//! ```text
//! <search path>/
//! └── stopwords/
//!     └── english      one word per line
//! ```

pub mod strategy;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::token_filter::stop::StopFilter;
use crate::config::ResourcesConfig;
use crate::error::{Result, SentinelError};

pub use strategy::{AcquisitionStrategy, BundledStrategy, DirectoryStrategy, LEXICON_RELATIVE_PATH};

/// Where a lexicon came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum LexiconSource {
    /// A lexicon package found under this search path.
    Directory(PathBuf),
    /// The compiled-in list.
    Bundled,
}

impl fmt::Display for LexiconSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexiconSource::Directory(path) => write!(f, "directory:{}", path.display()),
            LexiconSource::Bundled => write!(f, "bundled"),
        }
    }
}

/// A sorted, deduplicated stop-word list together with its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Lexicon {
    words: Vec<String>,
    source: LexiconSource,
}

impl Lexicon {
    pub fn new<I, S>(words: I, source: LexiconSource) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        words.sort();
        words.dedup();
        Lexicon { words, source }
    }

    /// The stop words in sorted order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn source(&self) -> &LexiconSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .binary_search_by(|probe| probe.as_str().cmp(word))
            .is_ok()
    }

    /// Whether the lexicon came from an installed package rather than the bundled list.
    pub fn is_packaged(&self) -> bool {
        matches!(self.source, LexiconSource::Directory(_))
    }

    /// A stop filter removing this lexicon's words.
    pub fn stop_filter(&self) -> StopFilter {
        StopFilter::from_words(self.words.iter().cloned())
    }
}

/// The outcome of one strategy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AcquisitionAttempt {
    pub strategy: String,
    pub succeeded: bool,
    /// Failure reason, if the strategy failed.
    pub error: Option<String>,
}

/// A resolved lexicon plus the attempts made to find it.
#[derive(Clone, Debug)]
pub struct Acquisition {
    pub lexicon: Lexicon,
    pub attempts: Vec<AcquisitionAttempt>,
}

/// Tries acquisition strategies in order.
pub struct LexiconResolver {
    strategies: Vec<Box<dyn AcquisitionStrategy>>,
}

impl LexiconResolver {
    pub fn new(strategies: Vec<Box<dyn AcquisitionStrategy>>) -> Self {
        LexiconResolver { strategies }
    }

    /// One directory strategy per search path, then the bundled list when allowed.
    pub fn from_config(config: &ResourcesConfig) -> Self {
        let mut strategies: Vec<Box<dyn AcquisitionStrategy>> = config
            .search_paths
            .iter()
            .map(|path| Box::new(DirectoryStrategy::new(path)) as Box<dyn AcquisitionStrategy>)
            .collect();
        if config.allow_bundled {
            strategies.push(Box::new(BundledStrategy));
        }
        LexiconResolver::new(strategies)
    }

    /// Descriptions of the configured strategies, in order.
    pub fn describe(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.describe()).collect()
    }

    /// Run the strategies until one succeeds.
    pub fn acquire(&self) -> Result<Acquisition> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let description = strategy.describe();
            match strategy.acquire() {
                Ok(lexicon) => {
                    tracing::info!(
                        strategy = %description,
                        words = lexicon.len(),
                        "lexicon acquired"
                    );
                    attempts.push(AcquisitionAttempt {
                        strategy: description,
                        succeeded: true,
                        error: None,
                    });
                    return Ok(Acquisition { lexicon, attempts });
                }
                Err(err) => {
                    tracing::debug!(strategy = %description, error = %err, "lexicon strategy failed");
                    attempts.push(AcquisitionAttempt {
                        strategy: description,
                        succeeded: false,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        let tried = attempts
            .iter()
            .map(|a| format!("{} ({})", a.strategy, a.error.as_deref().unwrap_or("failed")))
            .collect::<Vec<_>>()
            .join("; ");
        tracing::error!(attempts = attempts.len(), "no lexicon strategy succeeded");
        Err(SentinelError::resource_missing(format!(
            "stop-word lexicon not found; tried: {}",
            if tried.is_empty() { "nothing" } else { &tried }
        )))
    }
}

/// What a search path contains, for diagnostics.
#[derive(Clone, Debug, Serialize)]
pub struct SearchPathReport {
    pub path: PathBuf,
    pub exists: bool,
    pub has_lexicon: bool,
    /// Entry names directly under the path, sorted.
    pub entries: Vec<String>,
}

/// Describe every search path without acquiring anything.
pub fn inspect_search_paths(paths: &[PathBuf]) -> Vec<SearchPathReport> {
    paths.iter().map(|path| inspect_path(path)).collect()
}

fn inspect_path(path: &Path) -> SearchPathReport {
    let mut entries: Vec<String> = std::fs::read_dir(path)
        .map(|dir| {
            dir.filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    entries.sort();

    SearchPathReport {
        path: path.to_path_buf(),
        exists: path.is_dir(),
        has_lexicon: path.join(LEXICON_RELATIVE_PATH).is_file(),
        entries,
    }
}
