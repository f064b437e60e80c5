//! Whitespace tokenizer implementation.
//!
//! The fallback tokenizer of the review normalizer. It never fails.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A tokenizer that splits text on whitespace.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        for (idx, c) in text.char_indices() {
            match (c.is_whitespace(), start) {
                (true, Some(begin)) => {
                    tokens.push(Token::with_offsets(&text[begin..idx], tokens.len(), begin, idx));
                    start = None;
                }
                (false, None) => start = Some(idx),
                _ => {}
            }
        }
        if let Some(begin) = start {
            tokens.push(Token::with_offsets(
                &text[begin..],
                tokens.len(),
                begin,
                text.len(),
            ));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}
