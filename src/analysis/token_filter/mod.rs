//! Token filter implementations for token transformation.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod length;
pub mod lowercase;
pub mod shingle;
pub mod stop;

pub use length::MinLengthFilter;
pub use lowercase::LowercaseFilter;
pub use shingle::ShingleFilter;
pub use stop::StopFilter;
