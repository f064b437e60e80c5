//! Criterion benchmarks for review-sentinel.
//!
//! Covers the per-request path: normalization, TF-IDF encoding and the
//! full prediction through a service context.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use review_sentinel::config::SentinelConfig;
use review_sentinel::normalize::ReviewNormalizer;
use review_sentinel::resources::{AcquisitionStrategy, BundledStrategy};
use review_sentinel::service::ServiceContext;
use review_sentinel::training::{LabeledReview, fit_reviews};
use std::hint::black_box;

/// Generate labelled reviews for benchmarking.
fn generate_reviews(count: usize) -> Vec<LabeledReview> {
    let praise = [
        "amazing", "perfect", "love", "best", "wonderful", "excellent", "recommend", "incredible",
    ];
    let complaints = [
        "broke", "returned", "refund", "cheap", "flimsy", "leaking", "cracked", "disappointed",
    ];
    let nouns = [
        "blender", "kettle", "jacket", "charger", "lamp", "backpack", "headphones", "mattress",
    ];

    (0..count)
        .map(|i| {
            let fake = i % 2 == 0;
            let words = if fake { &praise } else { &complaints };
            let length = 12 + (i % 20);
            let text = (0..length)
                .map(|j| {
                    if j % 3 == 0 {
                        nouns[(i * 7 + j) % nouns.len()]
                    } else {
                        words[(i * 13 + j * 5) % words.len()]
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            LabeledReview {
                text,
                class: u8::from(fake),
            }
        })
        .collect()
}

fn normalizer(config: &SentinelConfig) -> ReviewNormalizer {
    let lexicon = BundledStrategy.acquire().unwrap();
    ReviewNormalizer::new(&config.normalizer, &lexicon).unwrap()
}

/// Benchmark review normalization.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let config = SentinelConfig::default();
    let normalizer = normalizer(&config);
    let reviews = generate_reviews(100);

    group.bench_function("normalize_single_review", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&reviews[0].text))))
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("normalize_batch", |b| {
        b.iter(|| {
            for review in &reviews {
                let _ = black_box(normalizer.normalize(black_box(&review.text)));
            }
        })
    });

    group.finish();
}

/// Benchmark feature encoding and full prediction.
fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");
    group.sample_size(50);

    let config = SentinelConfig::default();
    let reviews = generate_reviews(1000);
    let cleaner = normalizer(&config);
    let outcome = fit_reviews(&config, &cleaner, &reviews).unwrap();
    let cleaned: Vec<String> = reviews
        .iter()
        .take(100)
        .map(|r| cleaner.clean_text(&r.text))
        .collect();

    group.throughput(Throughput::Elements(100));
    group.bench_function("encode_batch", |b| {
        let vectorizer = outcome.artifact.vectorizer();
        b.iter(|| {
            for text in &cleaned {
                let _ = black_box(vectorizer.encode_str(black_box(text)));
            }
        })
    });

    let context = ServiceContext::new(cleaner, outcome.artifact).unwrap();
    group.throughput(Throughput::Elements(1));
    group.bench_function("predict_single_review", |b| {
        b.iter(|| black_box(context.predict(black_box(&reviews[1].text))))
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_predict);
criterion_main!(benches);
