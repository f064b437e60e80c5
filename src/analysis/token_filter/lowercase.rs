//! Case folding of review tokens.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Folds token text to lowercase. Stopped tokens pass through untouched.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    pub fn new() -> Self {
        LowercaseFilter
    }
}

fn fold(mut token: Token) -> Token {
    if token.is_stopped() {
        return token;
    }
    if token.text.is_ascii() {
        token.text.make_ascii_lowercase();
    } else {
        token.text = token.text.to_lowercase();
    }
    token
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        Ok(Box::new(tokens.map(fold)))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
