//! Sentiment history handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::api::AppState;
use crate::config::DEFAULT_SENTIMENT_HISTORY;
use crate::domain::{SentimentPoint, SentimentReport};
use crate::errors::AppResult;
use crate::services::SentimentCapture;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_SENTIMENT_HISTORY
}

/// Create sentiment routes
pub fn sentiment_routes() -> Router<AppState> {
    Router::new()
        .route("/:company", get(history))
        .route("/:company/summary", get(summary))
        .route("/:company/capture", post(capture))
}

/// Recorded sentiment points, oldest first
#[utoipa::path(
    get,
    path = "/sentiment/{company}",
    tag = "Sentiment",
    params(
        ("company" = String, Path, description = "Company name"),
        ("limit" = Option<u64>, Query, description = "Most recent points to return")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Sentiment history", body = [SentimentPoint]))
)]
pub async fn history(
    State(state): State<AppState>,
    Path(company): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<SentimentPoint>>> {
    Ok(Json(state.sentiment_service.history(&company, query.limit).await?))
}

/// Statistics and trend chart over the recorded points
#[utoipa::path(
    get,
    path = "/sentiment/{company}/summary",
    tag = "Sentiment",
    params(
        ("company" = String, Path, description = "Company name"),
        ("limit" = Option<u64>, Query, description = "Most recent points to summarize")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Sentiment summary", body = SentimentReport))
)]
pub async fn summary(
    State(state): State<AppState>,
    Path(company): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<SentimentReport>> {
    Ok(Json(state.sentiment_service.summary(&company, query.limit).await?))
}

/// Capture a sentiment observation now
#[utoipa::path(
    post,
    path = "/sentiment/{company}/capture",
    tag = "Sentiment",
    params(("company" = String, Path, description = "Company name")),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Observation recorded", body = SentimentCapture),
        (status = 502, description = "No LinkedIn mentions or model failure")
    )
)]
pub async fn capture(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> AppResult<(StatusCode, Json<SentimentCapture>)> {
    let captured = state.sentiment_service.capture(&company).await?;
    Ok((StatusCode::CREATED, Json(captured)))
}
