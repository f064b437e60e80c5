//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through the analysis pipeline: the
//! tokenizer produces them, token filters rewrite or drop them, and the
//! normalizer or vectorizer finally consumes their text.
//!
//! # Examples
//!
//! ```
//! use review_sentinel::analysis::token::Token;
//!
//! let token = Token::with_offsets("world", 1, 6, 11);
//! assert_eq!(token.text, "world");
//! assert_eq!(token.start_offset, 6);
//! assert!(!token.is_stopped());
//! ```

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the analyzed text
    pub start_offset: usize,

    /// The byte offset where this token ends in the analyzed text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped (removed) by a filter
    pub stopped: bool,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        let text = text.into();
        let end_offset = text.len();
        Token {
            text,
            position,
            start_offset: 0,
            end_offset,
            stopped: false,
        }
    }

    /// Create a new token with explicit byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
        }
    }

    /// Number of characters (Unicode scalar values) in the token text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Whether a filter marked this token as stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

/// A stream of tokens flowing through the pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Collect the surviving (non-stopped) token texts of a stream.
pub fn token_texts(tokens: TokenStream) -> Vec<String> {
    tokens
        .filter(|token| !token.is_stopped())
        .map(|token| token.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_scalars() {
        let token = Token::new("café", 0);
        assert_eq!(token.char_len(), 4);
        assert_eq!(token.end_offset, 5);
    }

    #[test]
    fn test_token_texts_skips_stopped() {
        let tokens = vec![Token::new("keep", 0), Token::new("drop", 1).stop()];
        let texts = token_texts(Box::new(tokens.into_iter()));
        assert_eq!(texts, vec!["keep".to_string()]);
    }
}
