//! Text analysis for review normalization and feature extraction.
//!
//! This module provides tokenization, char and token filtering, and the
//! pipeline analyzer that chains them together.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{Analyzer, PipelineAnalyzer};
pub use char_filter::CharFilter;
pub use token::{Token, TokenStream};
pub use token_filter::Filter;
pub use tokenizer::Tokenizer;
