//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use review_sentinel::config::SentinelConfig;
use review_sentinel::training::LabeledReview;

const FAKE: &[&str] = &[
    "Absolutely amazing product, best purchase ever, highly recommend to everyone",
    "Love love love this item, perfect quality and amazing value overall",
    "Best product ever made, exceeded every expectation, five stars amazing",
    "Perfect gift, everyone loved it, amazing quality, highly recommend buying",
    "Incredible value, amazing design, perfect everywhere, best ever",
    "Fast shipping, amazing seller, highly recommend, wonderful product",
];

const GENUINE: &[&str] = &[
    "The zipper broke after three weeks and customer support never replied",
    "Sizing runs small so order one size larger, fabric feels thin though",
    "Battery lasts about four hours which is shorter than advertised",
    "Arrived with a dented corner but the kettle works fine otherwise",
    "Instructions were confusing, assembly took two hours with missing screws",
    "Color faded after washing twice, stitching started coming loose",
];

/// A small separable corpus, repeated to give the split something to work with.
pub fn corpus() -> Vec<LabeledReview> {
    let mut reviews = Vec::new();
    for round in 0..5 {
        for text in FAKE {
            reviews.push(LabeledReview {
                text: format!("{text} batch{round}"),
                class: 1,
            });
        }
        for text in GENUINE {
            reviews.push(LabeledReview {
                text: format!("{text} batch{round}"),
                class: 0,
            });
        }
    }
    reviews
}

/// The lexicon package shipped in the repository.
pub fn repo_resources() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")
}

/// Default configuration with artifacts under `model_dir` and the repository lexicon.
pub fn config_in(model_dir: &Path) -> SentinelConfig {
    let mut config = SentinelConfig::default();
    config.model.dir = model_dir.to_path_buf();
    config.resources.search_paths = vec![repo_resources()];
    config
}

/// Write the corpus as a CSV dataset with the default column names.
pub fn write_csv(path: &Path) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer
        .write_record(["category", "rating", "label", "text_"])
        .unwrap();
    for review in corpus() {
        let label = if review.class == 1 { "CG" } else { "OR" };
        writer
            .write_record(["Home_and_Kitchen", "5.0", label, review.text.as_str()])
            .unwrap();
    }
    writer.flush().unwrap();
}
