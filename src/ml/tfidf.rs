//! TF-IDF vectorizer for review feature extraction.
//!
//! Fitting selects a vocabulary of word n-grams from a corpus of cleaned
//! reviews and learns one inverse document frequency per term. Encoding maps
//! a cleaned review to an L2-normalized sparse vector over that vocabulary.
//!
//! Term selection and weighting:
//!
//! - tokens match [`DEFAULT_TOKEN_PATTERN`] after lowercasing, and a
//!   vectorizer stop-word list is removed before n-grams are formed;
//! - the `max_features` terms with the highest corpus frequency are kept,
//!   ties broken alphabetically, and indices are assigned alphabetically;
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1`;
//! - a document's weights are raw term counts times idf, L2-normalized.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token::token_texts;
use crate::analysis::token_filter::stop::VECTORIZER_STOP_WORDS;
use crate::analysis::token_filter::{LowercaseFilter, ShingleFilter, StopFilter};
use crate::analysis::tokenizer::RegexTokenizer;
use crate::analysis::tokenizer::regex::DEFAULT_TOKEN_PATTERN;
use crate::config::TrainingConfig;
use crate::error::{Result, SentinelError};
use crate::ml::feature::FeatureVector;
use crate::normalize::CleanedText;

/// Settings that fully determine how text becomes terms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorizerSettings {
    pub token_pattern: String,
    /// Inclusive `(min, max)` n-gram sizes.
    pub ngram_range: (usize, usize),
    pub max_features: usize,
    /// Sorted stop words removed before n-grams are formed.
    pub stop_words: Vec<String>,
}

impl Default for VectorizerSettings {
    fn default() -> Self {
        let mut stop_words: Vec<String> =
            VECTORIZER_STOP_WORDS.iter().map(|w| w.to_string()).collect();
        stop_words.sort();
        VectorizerSettings {
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            ngram_range: (1, 2),
            max_features: 5000,
            stop_words,
        }
    }
}

impl VectorizerSettings {
    pub fn from_training(config: &TrainingConfig) -> Self {
        VectorizerSettings {
            ngram_range: (config.ngram_min, config.ngram_max),
            max_features: config.max_features,
            ..Default::default()
        }
    }

    fn build_analyzer(&self) -> Result<PipelineAnalyzer> {
        let (min_n, max_n) = self.ngram_range;
        Ok(
            PipelineAnalyzer::new(Arc::new(RegexTokenizer::with_pattern(&self.token_pattern)?))
                .add_filter(Arc::new(LowercaseFilter::new()))
                .add_filter(Arc::new(StopFilter::from_words(self.stop_words.iter().cloned())))
                .add_filter(Arc::new(ShingleFilter::new(min_n, max_n)?))
                .with_name("tfidf_terms"),
        )
    }
}

/// Serialized form of a vectorizer; the analyzer is rebuilt from settings.
#[derive(Serialize, Deserialize)]
struct VectorizerState {
    settings: VectorizerSettings,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    n_documents: usize,
}

/// TF-IDF vectorizer over word n-grams.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorizerState", into = "VectorizerState")]
pub struct TfIdfVectorizer {
    settings: VectorizerSettings,
    /// Term -> column index.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per column.
    idf: Vec<f64>,
    /// Number of documents seen while fitting.
    n_documents: usize,
    analyzer: PipelineAnalyzer,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("ngram_range", &self.settings.ngram_range)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(settings: VectorizerSettings) -> Result<Self> {
        if settings.max_features == 0 {
            return Err(SentinelError::invalid_argument("max_features must be positive"));
        }
        let analyzer = settings.build_analyzer()?;
        Ok(TfIdfVectorizer {
            settings,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            analyzer,
        })
    }

    /// Fit the vocabulary and idf weights on cleaned documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(SentinelError::training("cannot fit a vectorizer on no documents"));
        }

        let terms: Vec<Vec<String>> = documents
            .par_iter()
            .map(|doc| self.terms(doc))
            .collect::<Result<_>>()?;

        let mut term_frequency: AHashMap<&str, usize> = AHashMap::new();
        let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();
        for doc_terms in &terms {
            let mut seen = AHashSet::new();
            for term in doc_terms {
                *term_frequency.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        if term_frequency.is_empty() {
            return Err(SentinelError::training(
                "empty vocabulary; documents contain only stop words",
            ));
        }

        let mut ranked: Vec<(&str, usize)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.settings.max_features);

        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n = documents.len() as f64;
        let idf = kept
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary = kept
            .iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = documents.len();

        tracing::debug!(
            vocabulary = self.vocabulary.len(),
            documents = self.n_documents,
            "vectorizer fitted"
        );
        Ok(())
    }

    /// Encode a cleaned review.
    pub fn encode(&self, text: &CleanedText) -> Result<FeatureVector> {
        self.encode_str(text.as_str())
    }

    /// Encode arbitrary text. Terms outside the vocabulary are ignored.
    pub fn encode_str(&self, text: &str) -> Result<FeatureVector> {
        if !self.is_fitted() {
            return Err(SentinelError::invalid_argument("vectorizer is not fitted"));
        }

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.terms(text)? {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let norm = entries.iter().map(|&(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in &mut entries {
                *value /= norm;
            }
        }

        FeatureVector::new(self.dimension(), entries)
    }

    /// The n-gram terms of `text`, in order of appearance grouped by size.
    pub fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(token_texts(self.analyzer.analyze(text)?))
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Size of the vocabulary, which is the dimension of encoded vectors.
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn settings(&self) -> &VectorizerSettings {
        &self.settings
    }

    /// Terms in column order.
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names = vec![""; self.vocabulary.len()];
        for (term, &index) in &self.vocabulary {
            names[index] = term.as_str();
        }
        names
    }
}

impl TryFrom<VectorizerState> for TfIdfVectorizer {
    type Error = SentinelError;

    fn try_from(state: VectorizerState) -> Result<Self> {
        let size = state.vocabulary.len();
        if state.idf.len() != size {
            return Err(SentinelError::artifact_corrupt(format!(
                "vectorizer has {} idf weights for {size} terms",
                state.idf.len()
            )));
        }
        let mut used = vec![false; size];
        for &index in state.vocabulary.values() {
            match used.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(SentinelError::artifact_corrupt(format!(
                        "vectorizer vocabulary index {index} is out of range or repeated"
                    )));
                }
            }
        }
        if state.idf.iter().any(|w| !w.is_finite()) {
            return Err(SentinelError::artifact_corrupt("vectorizer idf is not finite"));
        }

        let analyzer = state.settings.build_analyzer()?;
        Ok(TfIdfVectorizer {
            settings: state.settings,
            vocabulary: state.vocabulary,
            idf: state.idf,
            n_documents: state.n_documents,
            analyzer,
        })
    }
}

impl From<TfIdfVectorizer> for VectorizerState {
    fn from(vectorizer: TfIdfVectorizer) -> Self {
        VectorizerState {
            settings: vectorizer.settings,
            vocabulary: vectorizer.vocabulary,
            idf: vectorizer.idf,
            n_documents: vectorizer.n_documents,
        }
    }
}
