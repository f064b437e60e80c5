//! Unicode word tokenizer implementation.
//!
//! Splits text using the Unicode word boundary rules (UAX #29). This is the
//! language-aware tokenizer of the review normalizer: boundaries come from
//! the Unicode tables compiled into `unicode-segmentation`, so they are pinned
//! to the crate version and cannot drift between training and serving.
//!
//! # Examples
//!
//! ```
//! use review_sentinel::analysis::tokenizer::Tokenizer;
//! use review_sentinel::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
//!
//! let tokenizer = UnicodeWordTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("great  value café").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[2].text, "café");
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that splits text on Unicode word boundaries.
///
/// Whitespace segments are discarded. Any other segment becomes a token,
/// including runs of underscores, which `\w` treats as word characters.
#[derive(Clone, Debug, Default)]
pub struct UnicodeWordTokenizer;

impl UnicodeWordTokenizer {
    /// Create a new Unicode word tokenizer.
    pub fn new() -> Self {
        UnicodeWordTokenizer
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = text
            .split_word_bound_indices()
            .filter(|(_, segment)| segment.chars().any(|c| !c.is_whitespace()))
            .enumerate()
            .map(|(position, (start, segment))| {
                Token::with_offsets(segment, position, start, start + segment.len())
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "unicode_word"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_word_tokenizer() {
        let tokenizer = UnicodeWordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("hello world\tagain").unwrap().collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[1].start_offset, 6);
        assert_eq!(tokens[2].text, "again");
        assert_eq!(tokens[2].position, 2);
    }

    #[test]
    fn test_underscored_words_stay_whole() {
        let tokenizer = UnicodeWordTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("snake_case word").unwrap().collect();

        assert_eq!(tokens[0].text, "snake_case");
        assert_eq!(tokens[1].text, "word");
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(UnicodeWordTokenizer::new().name(), "unicode_word");
    }
}
