//! Comparison handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_owner_or_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{ComparisonResult, ComparisonSummary};
use crate::errors::AppResult;
use crate::types::{Paginated, PaginationParams};

/// Comparison request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompareRequest {
    /// Two to five distinct company names
    #[validate(length(min = 2, message = "At least two companies are required"))]
    #[schema(example = json!(["Acme Corp", "Globex"]))]
    pub companies: Vec<String>,
}

/// Create comparison routes
pub fn comparison_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_comparisons).post(compare))
        .route("/:id", get(get_comparison))
}

/// Compare companies side by side
#[utoipa::path(
    post,
    path = "/comparisons",
    tag = "Comparisons",
    request_body = CompareRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Comparison created", body = ComparisonResult),
        (status = 400, description = "Fewer than 2 or more than 5 distinct companies"),
        (status = 502, description = "A company could not be analyzed")
    )
)]
pub async fn compare(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CompareRequest>,
) -> AppResult<(StatusCode, Json<ComparisonResult>)> {
    let result = state
        .comparison_service
        .compare(user.id, payload.companies)
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// List the caller's comparisons, newest first
#[utoipa::path(
    get,
    path = "/comparisons",
    tag = "Comparisons",
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("per_page" = Option<u64>, Query, description = "Page size, at most 100")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paginated comparison summaries", body = [ComparisonSummary])
    )
)]
pub async fn list_comparisons(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<ComparisonSummary>>> {
    let (results, total) = state.comparison_service.list(user.id, &params).await?;
    let summaries = results.into_iter().map(ComparisonSummary::from).collect();

    Ok(Json(Paginated::new(summaries, &params, total)))
}

/// Get one comparison
#[utoipa::path(
    get,
    path = "/comparisons/{id}",
    tag = "Comparisons",
    params(("id" = Uuid, Path, description = "Comparison ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Comparison", body = ComparisonResult),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comparison not found")
    )
)]
pub async fn get_comparison(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ComparisonResult>> {
    let result = state.comparison_service.get(id).await?;
    require_owner_or_admin(&user, result.user_id)?;
    Ok(Json(result))
}
