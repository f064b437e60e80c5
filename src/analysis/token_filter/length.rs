//! Minimum length filter implementation.

use super::Filter;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// A filter that drops tokens whose character count is below a minimum.
///
/// Lengths are counted in Unicode scalar values, not bytes.
#[derive(Clone, Debug)]
pub struct MinLengthFilter {
    min_chars: usize,
}

impl MinLengthFilter {
    /// Create a filter keeping tokens with at least `min_chars` characters.
    pub fn new(min_chars: usize) -> Self {
        MinLengthFilter { min_chars }
    }
}

impl Filter for MinLengthFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let kept: Vec<Token> = tokens
            .filter(|token| token.is_stopped() || token.char_len() >= self.min_chars)
            .collect();
        Ok(Box::new(kept.into_iter()))
    }

    fn name(&self) -> &'static str {
        "min_length"
    }
}
