//! Monitored company handlers.
//!
//! Any user may add a company to the sentiment sweep. Removing companies,
//! editing the skip list and forcing a sweep are admin operations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CompanyName, MonitoredCompany, SweepReport};
use crate::errors::{AppError, AppResult};
use crate::types::{MessageResponse, NoContent};

/// Request to start monitoring a company
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddCompanyRequest {
    #[validate(length(min = 1, max = 200, message = "Company name must be 1 to 200 characters"))]
    #[schema(example = "Acme Corp")]
    pub name: String,
}

/// Create monitoring routes
pub fn monitoring_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(add_company))
        .route("/companies/:name", delete(remove_company))
        .route("/companies/:name/skip", post(skip_company).delete(unskip_company))
        .route("/skipped", get(list_skipped))
        .route("/sweep", post(sweep))
}

/// List monitored companies
#[utoipa::path(
    get,
    path = "/monitoring/companies",
    tag = "Monitoring",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Monitored companies", body = [MonitoredCompany]))
)]
pub async fn list_companies(State(state): State<AppState>) -> AppResult<Json<Vec<MonitoredCompany>>> {
    Ok(Json(state.monitoring_service.list().await?))
}

/// Start monitoring a company
#[utoipa::path(
    post,
    path = "/monitoring/companies",
    tag = "Monitoring",
    request_body = AddCompanyRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Company added", body = MonitoredCompany),
        (status = 409, description = "Company already monitored")
    )
)]
pub async fn add_company(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AddCompanyRequest>,
) -> AppResult<(StatusCode, Json<MonitoredCompany>)> {
    let company = state
        .monitoring_service
        .add(&payload.name, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Stop monitoring a company
#[utoipa::path(
    delete,
    path = "/monitoring/companies/{name}",
    tag = "Monitoring",
    params(("name" = String, Path, description = "Company name")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Company removed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Company not monitored")
    )
)]
pub async fn remove_company(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.monitoring_service.remove(&name).await?;
    state.monitor.forget(&name).await;
    Ok(NoContent)
}

/// List skipped company keys
#[utoipa::path(
    get,
    path = "/monitoring/skipped",
    tag = "Monitoring",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Skipped company keys, sorted", body = [String]))
)]
pub async fn list_skipped(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.monitor.skip_list().list().await)
}

/// Put a company on the skip list
#[utoipa::path(
    post,
    path = "/monitoring/companies/{name}/skip",
    tag = "Monitoring",
    params(("name" = String, Path, description = "Company name")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Company skipped", body = MessageResponse),
        (status = 403, description = "Admin only")
    )
)]
pub async fn skip_company(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    require_admin(&user)?;
    let company = CompanyName::parse(&name)?;

    let message = if state.monitor.skip_list().skip(company.as_str()).await {
        tracing::info!(company = %company, admin = %user.id, "Company skipped");
        format!("{} is now skipped", company)
    } else {
        format!("{} was already skipped", company)
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Take a company off the skip list
#[utoipa::path(
    delete,
    path = "/monitoring/companies/{name}/skip",
    tag = "Monitoring",
    params(("name" = String, Path, description = "Company name")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Company no longer skipped"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Company was not skipped")
    )
)]
pub async fn unskip_company(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(name): Path<String>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    if !state.monitor.skip_list().unskip(&name).await {
        return Err(AppError::NotFound);
    }
    tracing::info!(company = %name, admin = %user.id, "Company unskipped");
    Ok(NoContent)
}

/// Run one sentiment sweep now
#[utoipa::path(
    post,
    path = "/monitoring/sweep",
    tag = "Monitoring",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep outcome", body = SweepReport),
        (status = 403, description = "Admin only")
    )
)]
pub async fn sweep(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<SweepReport>> {
    require_admin(&user)?;
    Ok(Json(state.monitor.run_once().await?))
}
