//! Geography tutor routes.
//!
//! `ask` and `seed` need a caller identity; `history` answers anonymous
//! callers with an empty list and `topics` is open to everyone.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::middleware::auth::CallerIdentity;
use crate::schemas::v1::geography::{
    AskRequest, AskResponse, ExchangeResponse, SeedResponse, TopicResponse,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(ask_question, chat_history, list_topics, seed_topics),
    components(schemas(
        AskRequest,
        AskResponse,
        ExchangeResponse,
        TopicResponse,
        SeedResponse
    ))
)]
pub struct GeographyApi;

/// Register geography routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/geography/ask", post(ask_question))
        .route("/geography/history", get(chat_history))
        .route("/geography/topics", get(list_topics))
        .route("/geography/topics/seed", post(seed_topics))
}

/// Ask the tutor a question (`POST /v1/geography/ask`).
///
/// Every successful call costs one completion request and stores one
/// exchange; repeated submissions are not deduplicated.
#[utoipa::path(
    post,
    path = "/v1/geography/ask",
    tag = "geography",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Question answered", body = AskResponse),
        (status = 400, description = "Empty or oversized question"),
        (status = 401, description = "Caller not authenticated"),
        (status = 502, description = "Completion endpoint failed"),
    )
)]
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ServerError> {
    debug!(
        question_len = req.question.len(),
        topic = ?req.topic,
        difficulty = ?req.difficulty,
        "ask request"
    );
    let answer = state.tutor.ask(caller.user(), req.into()).await?;
    Ok(Json(AskResponse { answer }))
}

/// The caller's most recent exchanges, newest first (`GET /v1/geography/history`).
#[utoipa::path(
    get,
    path = "/v1/geography/history",
    tag = "geography",
    responses(
        (status = 200, description = "Up to 20 exchanges; empty for anonymous callers", body = Vec<ExchangeResponse>),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<Vec<ExchangeResponse>>, ServerError> {
    let history = state.tutor.history(caller.user()).await?;
    Ok(Json(history.into_iter().map(ExchangeResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/geography/topics",
    tag = "geography",
    responses(
        (status = 200, description = "Topic catalog", body = Vec<TopicResponse>),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TopicResponse>>, ServerError> {
    let topics = state.tutor.topics().await?;
    Ok(Json(topics.into_iter().map(TopicResponse::from).collect()))
}

/// Load the fixed topic catalog if it is empty (`POST /v1/geography/topics/seed`).
#[utoipa::path(
    post,
    path = "/v1/geography/topics/seed",
    tag = "geography",
    responses(
        (status = 200, description = "Catalog seeded, or already present", body = SeedResponse),
        (status = 401, description = "Caller not authenticated"),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn seed_topics(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<SeedResponse>, ServerError> {
    let user = caller.require()?;
    let outcome = state.tutor.seed_topics().await?;
    info!(user = %user, outcome = ?outcome, "seed requested");
    Ok(Json(outcome.into()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
