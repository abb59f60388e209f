//! Analysis handlers.
//!
//! Company research, document uploads and the caller's analysis history.
//! Fetched analyses are read through the Redis cache; a cache failure only
//! costs a database round trip.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_owner_or_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{AnalysisSummary, UploadedDocument, UserAnalysis};
use crate::errors::{AppError, AppResult};
use crate::types::{NoContent, Paginated, PaginationParams};

/// Company analysis request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AnalyzeCompanyRequest {
    #[validate(length(min = 1, max = 200, message = "Company name must be 1 to 200 characters"))]
    #[schema(example = "Acme Corp")]
    pub company_name: String,
}

/// Multipart body for document uploads (documentation only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct DocumentUpload {
    /// Plain text, Markdown, CSV, HTML or JSON document
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Defaults to the file name without extension
    pub company_name: Option<String>,
}

/// Create analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_analyses))
        .route("/company", post(analyze_company))
        .route("/document", post(analyze_document))
        .route("/:id", get(get_analysis).delete(delete_analysis))
}

/// Content type implied by a file extension, for clients that send none.
fn guess_content_type(filename: &str) -> Option<&'static str> {
    let extension = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "txt" | "text" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(content_type)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

/// Pull the `file` and `company_name` fields out of an upload.
async fn read_document(mut multipart: Multipart) -> AppResult<UploadedDocument> {
    let mut document: Option<UploadedDocument> = None;
    let mut company_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("document").to_string();
                let declared = field
                    .content_type()
                    .filter(|ct| !ct.starts_with("application/octet-stream"))
                    .map(str::to_string);
                let content_type = declared
                    .or_else(|| guess_content_type(&filename).map(str::to_string))
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await.map_err(multipart_error)?;

                document = Some(UploadedDocument {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                    company_name: None,
                });
            }
            Some("company_name") => {
                let value = field.text().await.map_err(multipart_error)?;
                let value = value.trim();
                if !value.is_empty() {
                    company_name = Some(value.to_string());
                }
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unknown upload field");
            }
        }
    }

    let mut document = document.ok_or_else(|| AppError::validation("A file field is required"))?;
    document.company_name = company_name;
    Ok(document)
}

async fn cache_analysis(state: &AppState, analysis: &UserAnalysis) {
    if let Err(e) = state.cache.set_analysis(analysis).await {
        tracing::warn!(analysis_id = %analysis.id, error = %e, "Failed to cache analysis");
    }
}

/// Read-through lookup: cache first, then the database.
async fn load_analysis(state: &AppState, id: Uuid) -> AppResult<UserAnalysis> {
    match state.cache.get_analysis(&id).await {
        Ok(Some(analysis)) => return Ok(analysis),
        Ok(None) => {}
        Err(e) => tracing::warn!(analysis_id = %id, error = %e, "Analysis cache read failed"),
    }

    let analysis = state.analysis_service.get(id).await?;
    cache_analysis(state, &analysis).await;
    Ok(analysis)
}

/// Research a company and run every framework over it
#[utoipa::path(
    post,
    path = "/analyses/company",
    tag = "Analyses",
    request_body = AnalyzeCompanyRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Analysis created", body = UserAnalysis),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Every framework failed")
    )
)]
pub async fn analyze_company(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AnalyzeCompanyRequest>,
) -> AppResult<(StatusCode, Json<UserAnalysis>)> {
    let analysis = state
        .analysis_service
        .analyze_company(user.id, &payload.company_name)
        .await?;
    cache_analysis(&state, &analysis).await;

    Ok((StatusCode::CREATED, Json(analysis)))
}

/// Analyze an uploaded document
#[utoipa::path(
    post,
    path = "/analyses/document",
    tag = "Analyses",
    request_body(content = DocumentUpload, content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Analysis created", body = UserAnalysis),
        (status = 400, description = "Missing, empty or oversized file"),
        (status = 415, description = "Unsupported document type"),
        (status = 502, description = "Every framework failed")
    )
)]
pub async fn analyze_document(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<UserAnalysis>)> {
    let document = read_document(multipart).await?;
    tracing::info!(
        user_id = %user.id,
        filename = %document.filename,
        content_type = %document.content_type,
        bytes = document.bytes.len(),
        "Document uploaded"
    );

    let analysis = state
        .analysis_service
        .analyze_document(user.id, document)
        .await?;
    cache_analysis(&state, &analysis).await;

    Ok((StatusCode::CREATED, Json(analysis)))
}

/// List the caller's analyses, newest first
#[utoipa::path(
    get,
    path = "/analyses",
    tag = "Analyses",
    params(
        ("page" = Option<u64>, Query, description = "Page number, from 1"),
        ("per_page" = Option<u64>, Query, description = "Page size, at most 100")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paginated analysis summaries", body = [AnalysisSummary])
    )
)]
pub async fn list_analyses(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<AnalysisSummary>>> {
    let (analyses, total) = state.analysis_service.list(user.id, &params).await?;
    let summaries = analyses.into_iter().map(AnalysisSummary::from).collect();

    Ok(Json(Paginated::new(summaries, &params, total)))
}

/// Get one analysis with its report and charts
#[utoipa::path(
    get,
    path = "/analyses/{id}",
    tag = "Analyses",
    params(("id" = Uuid, Path, description = "Analysis ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Analysis", body = UserAnalysis),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Analysis not found")
    )
)]
pub async fn get_analysis(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserAnalysis>> {
    let analysis = load_analysis(&state, id).await?;
    require_owner_or_admin(&user, analysis.user_id)?;
    Ok(Json(analysis))
}

/// Delete an analysis
#[utoipa::path(
    delete,
    path = "/analyses/{id}",
    tag = "Analyses",
    params(("id" = Uuid, Path, description = "Analysis ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Analysis deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Analysis not found")
    )
)]
pub async fn delete_analysis(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    let analysis = state.analysis_service.get(id).await?;
    require_owner_or_admin(&user, analysis.user_id)?;

    state.analysis_service.delete(id).await?;
    if let Err(e) = state.cache.invalidate_analysis(&id).await {
        tracing::warn!(analysis_id = %id, error = %e, "Failed to invalidate cached analysis");
    }

    tracing::info!(analysis_id = %id, user_id = %user.id, "Analysis deleted");
    Ok(NoContent)
}
