//! HTTP route handlers for the summarizer API.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::summarization::{CompressionStats, SummarizationRequest, SummarizationResponse};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/summarize", post(summarize))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "text-summarizer",
        "version": env!("CARGO_PKG_VERSION"),
        "device": state.service.device(),
    }))
}

/// Summarization response with optional compression statistics.
#[derive(Debug, Serialize)]
pub struct SummarizeReply {
    /// The service response (`summary` and `status`).
    #[serde(flatten)]
    pub response: SummarizationResponse,
    /// Word counts and ratio, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CompressionStats>,
}

/// Handle summarization requests.
///
/// Every outcome uses the response shape; clients branch on `status`.
async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizationRequest>, JsonRejection>,
) -> (StatusCode, Json<SummarizeReply>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("malformed summarization request: {}", rejection.body_text());
            return reply(
                rejection.status(),
                SummarizationResponse::error(format!("invalid request: {}", rejection.body_text())),
                None,
            );
        }
    };

    let joined = tokio::task::spawn_blocking(move || {
        let response = state.service.summarize(&request);
        let stats = response
            .is_success()
            .then(|| CompressionStats::compute(&request.text, response.summary()));
        (response, stats)
    })
    .await;

    match joined {
        Ok((response, stats)) => reply(StatusCode::OK, response, stats),
        Err(e) => {
            tracing::error!("summarization task failed: {e}");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                SummarizationResponse::error(format!("summarization task failed: {e}")),
                None,
            )
        }
    }
}

fn reply(
    status: StatusCode,
    response: SummarizationResponse,
    stats: Option<CompressionStats>,
) -> (StatusCode, Json<SummarizeReply>) {
    (status, Json(SummarizeReply { response, stats }))
}
