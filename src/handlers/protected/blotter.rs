use axum::extract::Path;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::blotter::{BlotterReport, BlotterStatus, Priority};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

const COLUMNS: &str = "id, filed_by, complainant_name, respondent_name, incident_type, \
                       incident_date, incident_time, location, description, status, priority, \
                       created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct CreateBlotterRequest {
    pub complainant_name: String,
    pub respondent_name: String,
    pub incident_type: String,
    pub incident_date: NaiveDate,
    pub incident_time: String,
    pub location: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBlotterRequest {
    pub complainant_name: Option<String>,
    pub respondent_name: Option<String>,
    pub incident_type: Option<String>,
    pub incident_date: Option<NaiveDate>,
    pub incident_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<BlotterStatus>,
    pub priority: Option<Priority>,
}

/// GET /api/blotter - The caller's blotter reports, newest first
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<BlotterReport>> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let reports: Vec<BlotterReport> = sqlx::query_as(&format!(
        "SELECT {} FROM blotter_reports WHERE filed_by = $1 ORDER BY created_at DESC",
        COLUMNS
    ))
    .bind(auth.account_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(reports))
}

/// POST /api/blotter - File a blotter report owned by the caller
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateBlotterRequest>,
) -> ApiResult<BlotterReport> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let report: BlotterReport = sqlx::query_as(&format!(
        "INSERT INTO blotter_reports
             (filed_by, complainant_name, respondent_name, incident_type, incident_date,
              incident_time, location, description, priority)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        COLUMNS
    ))
    .bind(auth.account_id)
    .bind(&payload.complainant_name)
    .bind(&payload.respondent_name)
    .bind(&payload.incident_type)
    .bind(payload.incident_date)
    .bind(&payload.incident_time)
    .bind(&payload.location)
    .bind(&payload.description)
    .bind(payload.priority.unwrap_or(Priority::Medium))
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(report))
}

/// GET /api/blotter/:id - Retrieve one of the caller's reports
///
/// Queries are owner-filtered, so someone else's report is a 404.
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<BlotterReport> {
    let report = fetch_owned(auth.account_id, id).await?;
    Ok(ApiResponse::success(report))
}

/// PUT /api/blotter/:id - Partial update of one of the caller's reports
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlotterRequest>,
) -> ApiResult<BlotterReport> {
    let current = fetch_owned(auth.account_id, id).await?;
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let report: BlotterReport = sqlx::query_as(&format!(
        "UPDATE blotter_reports
         SET complainant_name = $3, respondent_name = $4, incident_type = $5, incident_date = $6,
             incident_time = $7, location = $8, description = $9, status = $10, priority = $11,
             updated_at = now()
         WHERE id = $1 AND filed_by = $2
         RETURNING {}",
        COLUMNS
    ))
    .bind(id)
    .bind(auth.account_id)
    .bind(payload.complainant_name.unwrap_or(current.complainant_name))
    .bind(payload.respondent_name.unwrap_or(current.respondent_name))
    .bind(payload.incident_type.unwrap_or(current.incident_type))
    .bind(payload.incident_date.unwrap_or(current.incident_date))
    .bind(payload.incident_time.unwrap_or(current.incident_time))
    .bind(payload.location.unwrap_or(current.location))
    .bind(payload.description.unwrap_or(current.description))
    .bind(payload.status.unwrap_or(current.status))
    .bind(payload.priority.unwrap_or(current.priority))
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::success(report))
}

/// DELETE /api/blotter/:id - Delete one of the caller's reports
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let result = sqlx::query("DELETE FROM blotter_reports WHERE id = $1 AND filed_by = $2")
        .bind(id)
        .bind(auth.account_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Blotter report not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}

async fn fetch_owned(account_id: Uuid, id: Uuid) -> Result<BlotterReport, ApiError> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let report: Option<BlotterReport> = sqlx::query_as(&format!(
        "SELECT {} FROM blotter_reports WHERE id = $1 AND filed_by = $2",
        COLUMNS
    ))
    .bind(id)
    .bind(account_id)
    .fetch_optional(&pool)
    .await?;

    report.ok_or_else(|| ApiError::not_found("Blotter report not found"))
}
