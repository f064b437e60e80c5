//! End-to-end tests: CSV dataset to trained artifacts to predictions.

mod common;

use review_sentinel::error::SentinelError;
use review_sentinel::ml::ModelArtifact;
use review_sentinel::normalize::Rejection;
use review_sentinel::service::{PredictOutcome, ServiceContext};
use review_sentinel::training;
use tempfile::TempDir;

const REVIEWS: &[&str] = &[
    "This product is absolutely amazing, fast shipping, highly recommend!",
    "The zipper broke after a month and the seller never answered",
    "Perfect quality, amazing value, everyone should buy one",
    "Battery died quickly and the charger feels cheap",
];

fn trained() -> (TempDir, review_sentinel::config::SentinelConfig, training::TrainingOutcome) {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("reviews.csv");
    common::write_csv(&csv_path);

    let config = common::config_in(&dir.path().join("model"));
    let outcome = training::train(&config, &csv_path).unwrap();
    (dir, config, outcome)
}

#[test]
fn test_train_writes_loadable_artifacts() {
    let (_dir, config, outcome) = trained();

    assert!(config.model.vectorizer_path().exists());
    assert!(config.model.classifier_path().exists());
    assert_eq!(outcome.distribution, (30, 30));
    assert_eq!(outcome.dataset.rows, 60);
    assert_eq!(outcome.report.total(), 12);

    let loaded = ModelArtifact::load(&config.model).unwrap();
    assert_eq!(loaded.metadata(), outcome.artifact.metadata());
    assert_eq!(
        loaded.vectorizer().dimension(),
        outcome.artifact.vectorizer().dimension()
    );
}

#[test]
fn test_loaded_model_predicts_like_trained_model() {
    let (_dir, config, outcome) = trained();
    let loaded = ModelArtifact::load(&config.model).unwrap();

    for review in ["amazing product highly recommend", "zipper broke after three weeks"] {
        let a = outcome.artifact.vectorizer().encode_str(review).unwrap();
        let b = loaded.vectorizer().encode_str(review).unwrap();
        assert_eq!(a, b);

        let pa = outcome.artifact.classifier().predict_proba(&a).unwrap();
        let pb = loaded.classifier().predict_proba(&b).unwrap();
        assert_eq!(pa, pb);
    }
}

#[test]
fn test_scenarios() {
    let (_dir, config, _) = trained();
    let context = ServiceContext::bootstrap(&config).unwrap();

    match context.predict(REVIEWS[0]) {
        PredictOutcome::Classified(prediction) => {
            assert!(!prediction.cleaned.as_str().is_empty());
            assert!(prediction.confidence >= 0.5);
        }
        other => panic!("expected a classification, got {other:?}"),
    }

    match context.predict("def foo(): return 1") {
        PredictOutcome::Rejected(Rejection::CodeLike { .. }) => {}
        other => panic!("expected a code-like rejection, got {other:?}"),
    }

    match context.predict("ok") {
        PredictOutcome::Rejected(Rejection::TooShort { chars: 2, .. }) => {}
        other => panic!("expected a too-short rejection, got {other:?}"),
    }
}

#[test]
fn test_confidence_bounds_and_idempotence() {
    let (_dir, config, _) = trained();
    let context = ServiceContext::bootstrap(&config).unwrap();

    for review in REVIEWS {
        let first = context.predict(review);
        let second = context.predict(review);
        assert_eq!(first, second);

        if let PredictOutcome::Classified(prediction) = first {
            assert!((0.5..=1.0).contains(&prediction.confidence));
            let expected_fake = prediction.fake_probability > 0.5;
            assert_eq!(prediction.label.class() == 1, expected_fake);
        } else {
            panic!("expected '{review}' to be classified");
        }
    }
}

#[test]
fn test_missing_artifacts_are_fatal() {
    let dir = TempDir::new().unwrap();
    let config = common::config_in(&dir.path().join("empty"));

    let err = ServiceContext::bootstrap(&config).unwrap_err();
    assert!(matches!(err, SentinelError::ResourceMissing(_)), "{err}");
}

#[test]
fn test_missing_lexicon_without_fallback_is_fatal() {
    let (dir, mut config, _) = trained();
    let empty = dir.path().join("no-lexicon");
    std::fs::create_dir(&empty).unwrap();
    config.resources.search_paths = vec![empty];

    let context = ServiceContext::bootstrap(&config).unwrap();
    assert_eq!(context.lexicon_source().to_string(), "bundled");

    config.resources.allow_bundled = false;
    let err = ServiceContext::bootstrap(&config).unwrap_err();
    assert!(matches!(err, SentinelError::ResourceMissing(_)), "{err}");
}

#[test]
fn test_corrupt_artifact_is_rejected() {
    let (_dir, config, _) = trained();
    let path = config.model.classifier_path();
    let mut bytes = std::fs::read(&path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xff;
    std::fs::write(&path, bytes).unwrap();

    let err = ServiceContext::bootstrap(&config).unwrap_err();
    assert!(matches!(err, SentinelError::ArtifactCorrupt(_)), "{err}");
}

#[test]
fn test_normalizer_fingerprint_mismatch_is_fatal() {
    let (_dir, mut config, _) = trained();
    config.normalizer.min_token_chars = 4;

    let err = ServiceContext::bootstrap(&config).unwrap_err();
    assert!(matches!(err, SentinelError::ArtifactMismatch(_)), "{err}");
}

#[test]
fn test_swapped_artifact_files_are_rejected() {
    let (_dir, config, _) = trained();
    std::fs::copy(config.model.vectorizer_path(), config.model.classifier_path()).unwrap();

    let err = ModelArtifact::load(&config.model).unwrap_err();
    assert!(matches!(err, SentinelError::ArtifactCorrupt(_)), "{err}");
}
