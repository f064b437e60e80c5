//! Detection of code-like input.

use regex::Regex;

use crate::error::{Result, SentinelError};

/// Matches blacklisted whole words and substrings in raw review text.
///
/// Keywords match case-sensitively at word boundaries, so `import` is caught
/// but `Important` and `imports` are not. Substrings match anywhere.
#[derive(Clone, Debug)]
pub struct CodePatternGuard {
    pattern: Option<Regex>,
}

impl CodePatternGuard {
    pub fn new(keywords: &[String], substrings: &[String]) -> Result<Self> {
        let mut alternatives = Vec::new();
        if !keywords.is_empty() {
            let words = keywords
                .iter()
                .map(|k| regex::escape(k.trim()))
                .collect::<Vec<_>>()
                .join("|");
            alternatives.push(format!(r"\b(?:{words})\b"));
        }
        alternatives.extend(substrings.iter().map(|s| regex::escape(s)));

        if alternatives.is_empty() {
            return Ok(CodePatternGuard { pattern: None });
        }

        let pattern = Regex::new(&alternatives.join("|"))
            .map_err(|e| SentinelError::config(format!("invalid code blacklist: {e}")))?;
        Ok(CodePatternGuard {
            pattern: Some(pattern),
        })
    }

    /// The first blacklisted match in `text`, if any.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .as_ref()
            .and_then(|p| p.find(text))
            .map(|m| m.as_str())
    }

    pub fn is_code_like(&self, text: &str) -> bool {
        self.find(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;

    fn default_guard() -> CodePatternGuard {
        let config = NormalizerConfig::default();
        CodePatternGuard::new(&config.code_keywords, &config.code_substrings).unwrap()
    }

    #[test]
    fn test_whole_word_keywords() {
        let guard = default_guard();
        assert_eq!(guard.find("def foo(): return 1"), Some("def"));
        assert!(guard.is_code_like("I would return this blender"));
        assert!(guard.is_code_like("great for kids"));
    }

    #[test]
    fn test_keywords_need_word_boundaries() {
        let guard = default_guard();
        assert!(!guard.is_code_like("Important information about the defrost mode"));
        assert!(!guard.is_code_like("Classy design, printed manual included"));
    }

    #[test]
    fn test_case_sensitive() {
        let guard = default_guard();
        assert!(!guard.is_code_like("For the price it is wonderful"));
        assert!(!guard.is_code_like("IF only it came in blue"));
    }

    #[test]
    fn test_substring() {
        let guard = default_guard();
        assert_eq!(guard.find("see setup.py here"), Some(".py"));
        assert!(guard.is_code_like("open main.pyc please"));
    }

    #[test]
    fn test_empty_blacklist_never_matches() {
        let guard = CodePatternGuard::new(&[], &[]).unwrap();
        assert!(!guard.is_code_like("import os"));
    }
}
