use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::resources::inspect_search_paths;
use crate::server::middleware::RequestId;
use crate::server::state::{AppState, Lifecycle};
use crate::service::{PredictOutcome, ReviewLabel};

/// `{"error": message}` with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub input: String,
    pub prediction: ReviewLabel,
    pub confidence: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub tokenizer_status: &'static str,
    pub lifecycle: Lifecycle,
    pub resource_paths: Vec<String>,
    pub lexicon_source: Option<String>,
    pub version: &'static str,
}

fn parse_review(body: &[u8]) -> Result<String, &'static str> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| "Invalid input: request body must be a JSON object")?;
    match value.get("review") {
        Some(Value::String(review)) => Ok(review.clone()),
        Some(_) => Err("Invalid input: 'review' must be a string"),
        None => Err("Invalid input: 'review' field is required"),
    }
}

pub async fn predict_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let Some(context) = state.context().cloned() else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "model is not loaded yet");
    };

    let body = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };
    let review = match parse_review(&body) {
        Ok(review) => review,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let joined = tokio::task::spawn_blocking(move || {
        let outcome = context.predict(&review);
        (review, outcome)
    })
    .await;

    let request_id = request_id.map(|Extension(RequestId(id))| id);
    match joined {
        Ok((input, PredictOutcome::Classified(prediction))) => Json(PredictResponse {
            input,
            prediction: prediction.label,
            confidence: prediction.confidence,
        })
        .into_response(),
        Ok((_, PredictOutcome::Rejected(rejection))) => {
            error_response(StatusCode::BAD_REQUEST, rejection.message())
        }
        Ok((_, PredictOutcome::Failed(_))) => internal_error(request_id),
        Err(err) => {
            tracing::error!(error = %err, "prediction task aborted");
            internal_error(request_id)
        }
    }
}

fn internal_error(request_id: Option<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal error while classifying the review",
            "request_id": request_id,
        })),
    )
        .into_response()
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    // A context only exists once a lexicon was acquired, bundled or not.
    let context = state.context();

    Json(HealthResponse {
        status: "OK",
        model_loaded: context.is_some(),
        tokenizer_status: if context.is_some() {
            "Available"
        } else {
            "Not Available"
        },
        lifecycle: state.lifecycle(),
        resource_paths: state
            .resource_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        lexicon_source: context.map(|c| c.lexicon_source().to_string()),
        version: crate::VERSION,
    })
}

pub async fn debug_resources_handler(State(state): State<AppState>) -> Json<Value> {
    let attempts = state
        .context()
        .map(|c| c.lexicon_attempts().to_vec())
        .unwrap_or_default();
    Json(json!({
        "search_paths": inspect_search_paths(&state.resource_paths),
        "lexicon_source": state.context().map(|c| c.lexicon_source().to_string()),
        "attempts": attempts,
    }))
}
