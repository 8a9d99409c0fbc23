use axum::extract::{Multipart, Path};
use axum::Extension;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::emergency::{EmergencyReport, EmergencyStatus, IncidentType};
use crate::error::ApiError;
use crate::handlers::multipart::FormData;
use crate::handlers::public::emergency::EmergencyReportResponse;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::storage;

const COLUMNS: &str = "id, name, incident_type, description, latitude, longitude, media_path, \
                       status, location_text, contact_number, submitted_at, updated_at";

/// GET /api/emergency - All emergency reports, newest first
///
/// Filing is public, but reading and managing reports requires a staff
/// login; the original system left this surface wide open.
pub async fn list(Extension(_auth): Extension<AuthUser>) -> ApiResult<Vec<EmergencyReportResponse>> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let reports: Vec<EmergencyReport> = sqlx::query_as(&format!(
        "SELECT {} FROM emergency_reports ORDER BY submitted_at DESC",
        COLUMNS
    ))
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(reports.into_iter().map(Into::into).collect()))
}

/// GET /api/emergency/:id - One emergency report
pub async fn get(
    Extension(_auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<EmergencyReportResponse> {
    let report = fetch(id).await?;
    Ok(ApiResponse::success(report.into()))
}

/// PUT /api/emergency/:id - Partial update; a new media_file replaces the old
pub async fn update(
    Extension(_auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<EmergencyReportResponse> {
    let form = FormData::collect(multipart).await?;
    let current = fetch(id).await?;

    let status = form.parsed_enum::<EmergencyStatus>("status")?.unwrap_or(current.status);
    let incident_type = form
        .parsed_enum::<IncidentType>("incident_type")?
        .unwrap_or(current.incident_type);

    let media_path = match form.file("media_file") {
        Some(upload) => {
            let rel = storage::save_upload("emergency_media", &upload.file_name, &upload.data).await?;
            if let Some(old) = &current.media_path {
                storage::delete_file(old).await;
            }
            Some(rel)
        }
        None => current.media_path.clone(),
    };

    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let report: EmergencyReport = sqlx::query_as(&format!(
        "UPDATE emergency_reports
         SET name = $2, incident_type = $3, description = $4, latitude = $5, longitude = $6,
             media_path = $7, status = $8, location_text = $9, contact_number = $10,
             updated_at = now()
         WHERE id = $1
         RETURNING {}",
        COLUMNS
    ))
    .bind(id)
    .bind(form.text("name").unwrap_or(&current.name))
    .bind(incident_type)
    .bind(form.text("description").unwrap_or(&current.description))
    .bind(form.parsed::<f64>("latitude")?.unwrap_or(current.latitude))
    .bind(form.parsed::<f64>("longitude")?.unwrap_or(current.longitude))
    .bind(&media_path)
    .bind(status)
    .bind(form.text("location_text").unwrap_or(&current.location_text))
    .bind(form.text("contact_number").or(current.contact_number.as_deref()))
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::success(report.into()))
}

/// DELETE /api/emergency/:id - Remove a report and its media file
pub async fn delete(
    Extension(_auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let report = fetch(id).await?;

    if let Some(path) = &report.media_path {
        storage::delete_file(path).await;
    }

    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;
    sqlx::query("DELETE FROM emergency_reports WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::<()>::no_content())
}

async fn fetch(id: Uuid) -> Result<EmergencyReport, ApiError> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let report: Option<EmergencyReport> = sqlx::query_as(&format!(
        "SELECT {} FROM emergency_reports WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?;

    report.ok_or_else(|| ApiError::not_found("Emergency report not found"))
}
