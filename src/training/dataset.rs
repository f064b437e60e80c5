//! Labelled review datasets.

use std::io::Read;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::LabelsConfig;
use crate::error::{Result, SentinelError};
use crate::normalize::ReviewNormalizer;

/// One raw review with its class (1 = fake, 0 = genuine).
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledReview {
    pub text: String,
    pub class: u8,
}

/// One cleaned review ready for feature extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanedSample {
    pub cleaned: String,
    pub class: u8,
}

/// Counts of what happened while loading or cleaning.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DatasetStats {
    pub rows: usize,
    pub missing_values: usize,
    pub unknown_labels: usize,
    pub kept: usize,
}

/// Read a CSV file with a header row.
pub fn load_dataset(path: &Path, labels: &LabelsConfig) -> Result<(Vec<LabeledReview>, DatasetStats)> {
    let file = std::fs::File::open(path).map_err(|e| {
        SentinelError::training(format!("cannot open dataset '{}': {e}", path.display()))
    })?;
    read_dataset(file, labels)
}

/// Read CSV records, mapping labels through `labels` and dropping rows with
/// empty fields or unknown labels.
pub fn read_dataset<R: Read>(reader: R, labels: &LabelsConfig) -> Result<(Vec<LabeledReview>, DatasetStats)> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv.headers()?.clone();
    let column = |name: &str| {
        headers.iter().position(|h| h.trim() == name).ok_or_else(|| {
            SentinelError::training(format!("dataset has no '{name}' column"))
        })
    };
    let text_idx = column(&labels.text_column)?;
    let label_idx = column(&labels.label_column)?;

    let mut stats = DatasetStats::default();
    let mut reviews = Vec::new();
    for record in csv.records() {
        let record = record?;
        stats.rows += 1;

        let (Some(text), Some(label)) = (record.get(text_idx), record.get(label_idx)) else {
            stats.missing_values += 1;
            continue;
        };
        if text.trim().is_empty() || label.trim().is_empty() {
            stats.missing_values += 1;
            continue;
        }
        let Some(class) = labels.class_of(label) else {
            stats.unknown_labels += 1;
            continue;
        };
        reviews.push(LabeledReview {
            text: text.to_string(),
            class,
        });
    }
    stats.kept = reviews.len();

    tracing::info!(
        rows = stats.rows,
        kept = stats.kept,
        missing = stats.missing_values,
        unknown_labels = stats.unknown_labels,
        "dataset loaded"
    );
    Ok((reviews, stats))
}

/// Clean every review in parallel, keeping those whose cleaned text is
/// longer than `min_cleaned_chars`. Input order is preserved.
pub fn clean_reviews(
    normalizer: &ReviewNormalizer,
    reviews: &[LabeledReview],
    min_cleaned_chars: usize,
) -> Vec<CleanedSample> {
    reviews
        .par_iter()
        .filter_map(|review| {
            let cleaned = normalizer.clean_text(&review.text);
            (cleaned.chars().count() > min_cleaned_chars).then_some(CleanedSample {
                cleaned,
                class: review.class,
            })
        })
        .collect()
}

/// Number of `(genuine, fake)` samples.
pub fn class_distribution(samples: &[CleanedSample]) -> (usize, usize) {
    let fake = samples.iter().filter(|s| s.class == 1).count();
    (samples.len() - fake, fake)
}
