//! Pipeline analyzer that combines char filters, tokenizers and filters.
//!
//! The PipelineAnalyzer applies processing in this order:
//! 1. Char Filters: rewrite the raw text
//! 2. Tokenizer: splits text into tokens (with an optional fallback tokenizer)
//! 3. Token Filters: applied sequentially in the order they were added
//!
//! # Examples
//!
//! ```
//! use review_sentinel::analysis::analyzer::analyzer::Analyzer;
//! use review_sentinel::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use review_sentinel::analysis::tokenizer::regex::RegexTokenizer;
//! use review_sentinel::analysis::token_filter::lowercase::LowercaseFilter;
//! use review_sentinel::analysis::token_filter::stop::StopFilter;
//! use std::sync::Arc;
//!
//! let tokenizer = Arc::new(RegexTokenizer::new().unwrap());
//! let analyzer = PipelineAnalyzer::new(tokenizer)
//!     .add_filter(Arc::new(LowercaseFilter::new()))
//!     .add_filter(Arc::new(StopFilter::from_words(vec!["the", "and"])));
//!
//! let tokens: Vec<_> = analyzer.analyze("Hello THE world AND test").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[2].text, "test");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A configurable analyzer that combines a tokenizer with a chain of filters.
///
/// When a fallback tokenizer is set, a failing primary tokenizer does not
/// fail the analysis: the failure is logged at `warn` and the fallback
/// tokenizes the same char-filtered text instead.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    fallback: Option<Arc<dyn Tokenizer>>,
    char_filters: Vec<Arc<dyn CharFilter>>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            fallback: None,
            char_filters: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Set the tokenizer used when the primary tokenizer fails.
    pub fn with_fallback_tokenizer(mut self, fallback: Arc<dyn Tokenizer>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Add a char filter to the pipeline.
    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        match (self.tokenizer.tokenize(text), &self.fallback) {
            (Ok(tokens), _) => Ok(tokens),
            (Err(err), Some(fallback)) => {
                tracing::warn!(
                    tokenizer = self.tokenizer.name(),
                    fallback = fallback.name(),
                    error = %err,
                    "primary tokenizer failed, using fallback"
                );
                fallback.tokenize(text)
            }
            (Err(err), None) => Err(err),
        }
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut filtered_text = text.to_string();
        for char_filter in &self.char_filters {
            filtered_text = char_filter.filter(&filtered_text);
        }

        let mut tokens = self.tokenize(&filtered_text)?;

        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field("fallback", &self.fallback.as_ref().map(|t| t.name()))
            .field(
                "char_filters",
                &self
                    .char_filters
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
    use crate::analysis::token::Token;
    use crate::analysis::token_filter::lowercase::LowercaseFilter;
    use crate::analysis::token_filter::stop::StopFilter;
    use crate::analysis::tokenizer::regex::RegexTokenizer;
    use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
    use crate::error::SentinelError;

    struct BrokenTokenizer;

    impl Tokenizer for BrokenTokenizer {
        fn tokenize(&self, _text: &str) -> Result<TokenStream> {
            Err(SentinelError::analysis("segmentation data unavailable"))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_pipeline_analyzer() {
        let tokenizer = Arc::new(RegexTokenizer::new().unwrap());
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::from_words(vec!["the", "and"])));

        let tokens: Vec<Token> = analyzer
            .analyze("Hello THE world AND test")
            .unwrap()
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[2].text, "test");
    }

    #[test]
    fn test_pipeline_with_pattern_replace() {
        let tokenizer = Arc::new(WhitespaceTokenizer::new());
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(r"-", "").unwrap()));

        let tokens: Vec<Token> = analyzer.analyze("123-456 789").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "123456");
        assert_eq!(tokens[1].text, "789");
    }

    #[test]
    fn test_fallback_tokenizer_is_used_on_failure() {
        let analyzer = PipelineAnalyzer::new(Arc::new(BrokenTokenizer))
            .with_fallback_tokenizer(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()));

        let tokens: Vec<Token> = analyzer.analyze("Sturdy Kettle").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "sturdy");
        assert_eq!(tokens[1].text, "kettle");
    }

    #[test]
    fn test_failure_without_fallback_propagates() {
        let analyzer = PipelineAnalyzer::new(Arc::new(BrokenTokenizer));
        assert!(analyzer.analyze("anything").is_err());
    }
}
