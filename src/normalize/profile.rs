//! Normalizer profile and its fingerprint.

use serde::{Deserialize, Serialize};

/// Everything that determines what the normalizer produces for a given input.
///
/// Training stores the profile's fingerprint next to the model; serving
/// refuses to load a model trained under a different profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerProfile {
    pub min_chars: usize,
    pub min_token_chars: usize,
    pub code_keywords: Vec<String>,
    pub code_substrings: Vec<String>,
    pub tokenizer: String,
    /// Sorted stop words.
    pub stop_words: Vec<String>,
}

impl NormalizerProfile {
    /// CRC32 over every field, with unambiguous separators.
    pub fn fingerprint(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        let mut feed = |section: &str, values: &[String]| {
            hasher.update(section.as_bytes());
            hasher.update(&[0xff]);
            for value in values {
                hasher.update(&(value.len() as u64).to_le_bytes());
                hasher.update(value.as_bytes());
            }
        };

        feed(
            "thresholds",
            &[self.min_chars.to_string(), self.min_token_chars.to_string()],
        );
        feed("keywords", &self.code_keywords);
        feed("substrings", &self.code_substrings);
        feed("tokenizer", std::slice::from_ref(&self.tokenizer));
        feed("stop_words", &self.stop_words);

        hasher.finalize()
    }
}
