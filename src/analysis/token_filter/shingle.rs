//! Word n-gram (shingle) filter implementation.
//!
//! Expands a token stream into every contiguous n-gram for `n` in
//! `min_size..=max_size`, joined with a single space. All n-grams of the
//! smallest size come first, then the next size, and so on.
//!
//! # Examples
//!
//! ```
//! use review_sentinel::analysis::token_filter::Filter;
//! use review_sentinel::analysis::token_filter::shingle::ShingleFilter;
//! use review_sentinel::analysis::token::Token;
//!
//! let filter = ShingleFilter::new(1, 2).unwrap();
//! let tokens = vec![Token::new("fast", 0), Token::new("shipping", 1)];
//! let grams: Vec<String> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(grams, vec!["fast", "shipping", "fast shipping"]);
//! ```

use super::Filter;

use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, SentinelError};

/// A filter producing word n-grams.
#[derive(Clone, Debug)]
pub struct ShingleFilter {
    min_size: usize,
    max_size: usize,
}

impl ShingleFilter {
    /// Create a shingle filter for n-gram sizes `min_size..=max_size`.
    pub fn new(min_size: usize, max_size: usize) -> Result<Self> {
        if min_size == 0 || min_size > max_size {
            return Err(SentinelError::analysis(format!(
                "invalid n-gram range ({min_size}, {max_size})"
            )));
        }
        Ok(ShingleFilter { min_size, max_size })
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let words: Vec<Token> = tokens.filter(|token| !token.is_stopped()).collect();
        let mut grams = Vec::new();

        for size in self.min_size..=self.max_size {
            if size > words.len() {
                break;
            }
            for window in words.windows(size) {
                let text = window
                    .iter()
                    .map(|token| token.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let first = &window[0];
                let last = &window[size - 1];
                grams.push(Token::with_offsets(
                    text,
                    grams.len(),
                    first.start_offset,
                    last.end_offset,
                ));
            }
        }

        Ok(Box::new(grams.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(filter: &ShingleFilter, words: &[&str]) -> Vec<String> {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(*w, i))
            .collect();
        filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_unigrams_then_bigrams() {
        let filter = ShingleFilter::new(1, 2).unwrap();
        assert_eq!(
            texts(&filter, &["very", "good", "price"]),
            vec!["very", "good", "price", "very good", "good price"]
        );
    }

    #[test]
    fn test_short_stream() {
        let filter = ShingleFilter::new(2, 3).unwrap();
        assert!(texts(&filter, &["lonely"]).is_empty());
    }

    #[test]
    fn test_invalid_range() {
        assert!(ShingleFilter::new(0, 2).is_err());
        assert!(ShingleFilter::new(3, 2).is_err());
    }
}
