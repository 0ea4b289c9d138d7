//! Request handlers for the decision endpoint.

use axum::extract::{Json, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{info, warn};

use crate::limit::{Gate, LimiterBackend, Subject, SubjectKind};

/// Body of a `POST /v1/check` request.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CheckRequest {
    /// The scope the attempt belongs to (e.g. `subscribe`)
    pub scope: String,
    /// The subjects to count the attempt against
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

/// Body of an allowed decision.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckResponse {
    /// Always `true` for a 200 response
    pub allowed: bool,
    /// Per-subject budget information, in request order
    pub checks: Vec<CheckStatus>,
}

/// Budget information for one subject.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckStatus {
    /// The subject kind
    pub kind: SubjectKind,
    /// Attempts left in the current window
    pub remaining: u32,
    /// Milliseconds until the window resets
    pub reset_in: u64,
}

/// Body of a denied decision, mirrored into the `Retry-After` header.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottledResponse {
    /// Human-readable denial message
    pub error: String,
    /// Seconds until a retry may succeed
    pub retry_after: u64,
}

#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Decide whether a request described by `scope` and `subjects` may proceed.
///
/// Malformed input is a caller bug and is rejected with `400` before any
/// counter is touched. Denials carry the throttling contract: `429`, a
/// `Retry-After` header, and a JSON body with the same hint in seconds.
pub async fn check<B: LimiterBackend + 'static>(
    State(gate): State<Arc<Gate<B>>>,
    Json(request): Json<CheckRequest>,
) -> Response {
    if request.scope.trim().is_empty() {
        warn!("Received check request with empty scope");
        return bad_request("scope is required");
    }
    if request.subjects.is_empty() {
        warn!(scope = %request.scope, "Received check request with no subjects");
        return bad_request("at least one subject is required");
    }
    if request
        .subjects
        .iter()
        .any(|s| s.normalized_value().is_empty())
    {
        warn!(scope = %request.scope, "Received check request with an empty subject value");
        return bad_request("subject values must be non-empty");
    }

    let verdict = gate.evaluate(&request.scope, &request.subjects).await;

    info!(
        scope = %request.scope,
        subject_count = request.subjects.len(),
        allowed = verdict.allowed,
        "Rate limit decision made"
    );

    if verdict.allowed {
        let checks = verdict
            .checks
            .iter()
            .map(|c| CheckStatus {
                kind: c.kind,
                remaining: c.decision.remaining,
                reset_in: c.decision.reset_in.as_millis() as u64,
            })
            .collect();

        (
            StatusCode::OK,
            Json(CheckResponse {
                allowed: true,
                checks,
            }),
        )
            .into_response()
    } else {
        let retry_after = verdict.retry_after_secs();
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after.to_string())],
            Json(ThrottledResponse {
                error: "rate limit exceeded".to_string(),
                retry_after,
            }),
        )
            .into_response()
    }
}

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}
