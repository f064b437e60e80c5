//! # review-sentinel
//!
//! Classifies free-text product reviews as genuine or computer generated.
//!
//! ## Layout
//!
//! - [`analysis`]: tokenizers, char filters and token filters composed into analyzers
//! - [`normalize`]: validation and cleaning of a raw review
//! - [`ml`]: TF-IDF vectorizer, logistic regression and the persisted model
//! - [`resources`]: tokenizer lexicon acquisition
//! - [`service`]: the prediction context shared by the CLI and the HTTP server
//! - [`server`]: `POST /predict` and `GET /health`
//! - [`training`]: offline training from a labelled CSV dataset
//!
//! ## Example
//!
//! ```
//! use review_sentinel::config::NormalizerConfig;
//! use review_sentinel::normalize::ReviewNormalizer;
//! use review_sentinel::resources::{AcquisitionStrategy, BundledStrategy};
//!
//! let lexicon = BundledStrategy.acquire().unwrap();
//! let normalizer = ReviewNormalizer::new(&NormalizerConfig::default(), &lexicon).unwrap();
//!
//! let cleaned = normalizer.clean_text("This blender is AMAZING, works perfectly!");
//! assert_eq!(cleaned, "blender amazing works perfectly");
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod ml;
pub mod normalize;
pub mod resources;
pub mod server;
pub mod service;
pub mod storage;
pub mod telemetry;
pub mod training;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
