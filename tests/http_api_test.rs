//! HTTP API tests against the router, without binding a socket.

mod common;

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum::routing::get as get_route;
use review_sentinel::config::{SentinelConfig, ServerConfig};
use review_sentinel::ml::{LogisticRegression, LogisticSettings, ModelArtifact};
use review_sentinel::normalize::ReviewNormalizer;
use review_sentinel::resources::LexiconResolver;
use review_sentinel::server::middleware::timeout_middleware;
use review_sentinel::server::{AppState, build_router};
use review_sentinel::service::ServiceContext;
use review_sentinel::training;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn trained_context(config: &SentinelConfig) -> ServiceContext {
    let acquisition = LexiconResolver::from_config(&config.resources)
        .acquire()
        .unwrap();
    let normalizer = ReviewNormalizer::new(&config.normalizer, &acquisition.lexicon).unwrap();
    let outcome = training::fit_reviews(config, &normalizer, &common::corpus()).unwrap();
    ServiceContext::new(normalizer, outcome.artifact).unwrap()
}

fn state_with(server: ServerConfig) -> (AppState, SentinelConfig) {
    let dir = std::env::temp_dir().join("review-sentinel-http-tests");
    let config = common::config_in(&dir);
    let state = AppState::new(server, config.resources.search_paths.clone());
    (state, config)
}

fn ready_state(server: ServerConfig) -> AppState {
    let (state, config) = state_with(server);
    state.install(trained_context(&config)).unwrap();
    state
}

fn predict_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, request_id, body)
}

#[tokio::test]
async fn test_health_before_and_after_model_load() {
    let (state, config) = state_with(ServerConfig::default());

    let (status, _, body) = send(build_router(state.clone()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["tokenizer_status"], "Not Available");
    assert_eq!(body["lifecycle"], "initializing");
    assert_eq!(body["lexicon_source"], Value::Null);

    state.install(trained_context(&config)).unwrap();

    let (status, _, body) = send(build_router(state), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["tokenizer_status"], "Available");
    assert_eq!(body["lifecycle"], "ready");
    assert!(
        body["lexicon_source"]
            .as_str()
            .unwrap()
            .starts_with("directory:")
    );
    assert_eq!(body["resource_paths"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_predict_before_ready_is_unavailable() {
    let (state, _) = state_with(ServerConfig::default());

    let (status, request_id, body) = send(
        build_router(state),
        predict_request(r#"{"review": "A perfectly reasonable kettle review"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(request_id.is_some());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_predict_success() {
    let router = build_router(ready_state(ServerConfig::default()));
    let review = "This product is absolutely amazing, fast shipping, highly recommend!";

    let (status, request_id, body) = send(
        router,
        predict_request(&serde_json::json!({ "review": review }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(request_id.is_some());
    assert_eq!(body["input"], review);
    let prediction = body["prediction"].as_str().unwrap();
    assert!(prediction == "Fake Review" || prediction == "Real Review");
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.5..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_predict_rejections_are_bad_requests() {
    let state = ready_state(ServerConfig::default());

    for body in [
        r#"{"review": "ok"}"#,
        r#"{"review": "def foo(): return 1"}"#,
        r#"{"review": 42}"#,
        r#"{"text": "missing review field"}"#,
        "this is not json",
    ] {
        let (status, _, response) = send(build_router(state.clone()), predict_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(
            response["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid input"),
            "{body}: {response}"
        );
    }
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let router = build_router(ready_state(ServerConfig::default()));
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-req-42")
        .body(Body::empty())
        .unwrap();

    let (_, request_id, _) = send(router, request).await;
    assert_eq!(request_id.as_deref(), Some("client-req-42"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let router = build_router(ready_state(ServerConfig {
        max_body_bytes: 64,
        ..Default::default()
    }));
    let review = "great ".repeat(100);

    let (status, _, body) = send(
        router,
        predict_request(&serde_json::json!({ "review": review }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_debug_endpoint_is_opt_in() {
    let (status, _, _) = send(
        build_router(ready_state(ServerConfig::default())),
        get("/debug/resources"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let state = ready_state(ServerConfig {
        enable_debug_endpoints: true,
        ..Default::default()
    });
    let (status, _, body) = send(build_router(state), get("/debug/resources")).await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["search_paths"].as_array().unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0]["has_lexicon"], true);
}

#[tokio::test]
async fn test_context_installs_once() {
    let (state, config) = state_with(ServerConfig::default());

    state.install(trained_context(&config)).unwrap();
    assert!(state.install(trained_context(&config)).is_err());
}

#[tokio::test]
async fn test_bundled_lexicon_reports_tokenizer_available() {
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("reviews.csv");
    common::write_csv(&csv_path);
    let mut config = common::config_in(&dir.path().join("model"));
    training::train(&config, &csv_path).unwrap();

    let empty = dir.path().join("no-lexicon");
    std::fs::create_dir(&empty).unwrap();
    config.resources.search_paths = vec![empty];

    let state = AppState::new(
        ServerConfig::default(),
        config.resources.search_paths.clone(),
    );
    state
        .install(ServiceContext::bootstrap(&config).unwrap())
        .unwrap();

    let (status, _, body) = send(build_router(state), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lifecycle"], "ready");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["lexicon_source"], "bundled");
    assert_eq!(body["tokenizer_status"], "Available");
}

#[tokio::test]
async fn test_classifier_failure_is_internal_error() {
    let (state, config) = state_with(ServerConfig::default());
    let trained = trained_context(&config);
    let artifact = trained.artifact();

    // Finite weights whose dot product overflows to infinity.
    let dimension = artifact.vectorizer().dimension();
    let classifier =
        LogisticRegression::from_weights(vec![1e308; dimension], 1e308, LogisticSettings::default())
            .unwrap();
    let overflowing = ModelArtifact::new(
        artifact.vectorizer().clone(),
        classifier,
        artifact.metadata().clone(),
    )
    .unwrap();
    let normalizer = trained.normalizer().clone();
    state
        .install(ServiceContext::new(normalizer, overflowing).unwrap())
        .unwrap();

    let (status, request_id, body) = send(
        build_router(state),
        predict_request(r#"{"review": "Absolutely amazing product, highly recommend it"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(body["request_id"].is_string());
    assert_eq!(body["request_id"].as_str(), request_id.as_deref());
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let (state, _) = state_with(ServerConfig {
        request_timeout_ms: 1,
        ..Default::default()
    });
    let router = Router::new()
        .route(
            "/slow",
            get_route(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                "done"
            }),
        )
        .layer(from_fn_with_state(state.clone(), timeout_middleware))
        .with_state(state);

    let (status, _, body) = send(router, get("/slow")).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "request timed out");
}
