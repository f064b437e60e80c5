//! Strategies for acquiring the stop-word lexicon.

use std::path::{Path, PathBuf};

use crate::analysis::token_filter::stop::REVIEW_STOP_WORDS;
use crate::error::{Result, SentinelError};
use crate::resources::{Lexicon, LexiconSource};

/// Location of the stop-word list inside a lexicon package.
pub const LEXICON_RELATIVE_PATH: &str = "stopwords/english";

/// One way of obtaining a [`Lexicon`].
///
/// Strategies are tried in order by the
/// [`LexiconResolver`](crate::resources::LexiconResolver); each one either
/// yields a lexicon or explains why it could not.
pub trait AcquisitionStrategy: Send + Sync {
    /// Short human readable description used in logs and error messages.
    fn describe(&self) -> String;

    /// Try to obtain the lexicon.
    fn acquire(&self) -> Result<Lexicon>;
}

/// Reads a lexicon package from `<root>/stopwords/english`.
#[derive(Clone, Debug)]
pub struct DirectoryStrategy {
    root: PathBuf,
}

impl DirectoryStrategy {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirectoryStrategy { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the stop-word file this strategy reads.
    pub fn package_file(&self) -> PathBuf {
        self.root.join(LEXICON_RELATIVE_PATH)
    }
}

/// Parse a stop-word file: one word per line, `#` starts a comment line.
pub fn parse_lexicon(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
}

impl AcquisitionStrategy for DirectoryStrategy {
    fn describe(&self) -> String {
        format!("directory {}", self.package_file().display())
    }

    fn acquire(&self) -> Result<Lexicon> {
        let file = self.package_file();
        let content = std::fs::read_to_string(&file).map_err(|e| {
            SentinelError::resource_missing(format!("cannot read '{}': {e}", file.display()))
        })?;

        let words = parse_lexicon(&content);
        if words.is_empty() {
            return Err(SentinelError::resource_missing(format!(
                "lexicon package '{}' contains no words",
                file.display()
            )));
        }

        Ok(Lexicon::new(words, LexiconSource::Directory(self.root.clone())))
    }
}

/// Uses the compiled-in English list.
#[derive(Clone, Debug, Default)]
pub struct BundledStrategy;

impl AcquisitionStrategy for BundledStrategy {
    fn describe(&self) -> String {
        "bundled english lexicon".to_string()
    }

    fn acquire(&self) -> Result<Lexicon> {
        Ok(Lexicon::new(
            REVIEW_STOP_WORDS.iter().map(|w| w.to_string()),
            LexiconSource::Bundled,
        ))
    }
}
