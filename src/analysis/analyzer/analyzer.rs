//! Core analyzer trait definition.
//!
//! Analyzers are the complete text processing pipeline:
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Filter 1 → ... → Filter N → Token Stream
//! ```
//!
//! # Examples
//!
//! ```
//! use review_sentinel::analysis::analyzer::analyzer::Analyzer;
//! use review_sentinel::analysis::token::TokenStream;
//! use review_sentinel::error::Result;
//!
//! struct NothingAnalyzer;
//!
//! impl Analyzer for NothingAnalyzer {
//!     fn analyze(&self, _text: &str) -> Result<TokenStream> {
//!         Ok(Box::new(std::iter::empty()))
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "nothing"
//!     }
//! }
//!
//! assert_eq!(NothingAnalyzer.analyze("anything").unwrap().count(), 0);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so one analyzer can be shared by the
/// request handlers and the training workers.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for logs and diagnostics).
    fn name(&self) -> &'static str;
}
