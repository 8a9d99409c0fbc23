use axum::extract::Multipart;
use serde::Serialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::emergency::{EmergencyReport, EmergencyStatus, IncidentType};
use crate::error::ApiError;
use crate::handlers::multipart::FormData;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::storage;

#[derive(Debug, Serialize)]
pub struct EmergencyReportResponse {
    pub id: Uuid,
    pub name: String,
    pub incident_type: IncidentType,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub media_file: Option<String>,
    pub status: EmergencyStatus,
    pub location_text: String,
    pub contact_number: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<EmergencyReport> for EmergencyReportResponse {
    fn from(report: EmergencyReport) -> Self {
        Self {
            id: report.id,
            name: report.name,
            incident_type: report.incident_type,
            description: report.description,
            latitude: report.latitude,
            longitude: report.longitude,
            media_file: report.media_path.as_deref().map(storage::media_url),
            status: report.status,
            location_text: report.location_text,
            contact_number: report.contact_number,
            submitted_at: report.submitted_at,
            updated_at: report.updated_at,
        }
    }
}

/// POST /emergency - File an emergency report
///
/// Deliberately unauthenticated: callers may be unregistered or in
/// distress. Multipart form with an optional `media_file` part
/// (image/audio/video). Everything else about emergency reports lives
/// behind authentication.
pub async fn create(multipart: Multipart) -> ApiResult<EmergencyReportResponse> {
    let form = FormData::collect(multipart).await?;

    let name = form.require("name")?;
    let description = form.require("description")?;
    let location_text = form.require("location_text")?;
    let incident_type = form
        .parsed_enum::<IncidentType>("incident_type")?
        .unwrap_or(IncidentType::Other);
    let latitude = form.parsed::<f64>("latitude")?.unwrap_or(0.0);
    let longitude = form.parsed::<f64>("longitude")?.unwrap_or(0.0);
    let contact_number = form.text("contact_number").map(|s| s.to_string());

    let media_path = match form.file("media_file") {
        Some(upload) => Some(storage::save_upload("emergency_media", &upload.file_name, &upload.data).await?),
        None => None,
    };

    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let report: EmergencyReport = sqlx::query_as(
        "INSERT INTO emergency_reports
             (name, incident_type, description, latitude, longitude, media_path, location_text, contact_number)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, name, incident_type, description, latitude, longitude, media_path,
                   status, location_text, contact_number, submitted_at, updated_at",
    )
    .bind(&name)
    .bind(incident_type)
    .bind(&description)
    .bind(latitude)
    .bind(longitude)
    .bind(&media_path)
    .bind(&location_text)
    .bind(&contact_number)
    .fetch_one(&pool)
    .await?;

    tracing::info!(id = %report.id, incident = ?report.incident_type, "emergency report filed");

    Ok(ApiResponse::created(report.into()))
}
