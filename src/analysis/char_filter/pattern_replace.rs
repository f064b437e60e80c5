use regex::Regex;

use super::CharFilter;
use crate::error::{Result, SentinelError};

/// Pattern matching every character that is neither a word character nor whitespace.
pub const PUNCTUATION_PATTERN: &str = r"[^\w\s]";

/// A char filter that replaces every match of a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| SentinelError::analysis(format!("Invalid regex pattern: {e}")))?,
            replacement: replacement.to_string(),
        })
    }

    /// A filter deleting punctuation, keeping word characters and whitespace.
    pub fn strip_punctuation() -> Result<Self> {
        Self::new(PUNCTUATION_PATTERN, "")
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}
