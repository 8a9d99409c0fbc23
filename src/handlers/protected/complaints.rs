use axum::extract::{Multipart, Path};
use axum::Extension;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::blotter::Priority;
use crate::database::models::complaint::{Complaint, ComplaintEvidence, ComplaintStatus};
use crate::error::{is_unique_violation, ApiError};
use crate::handlers::multipart::FormData;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::identifiers;
use crate::storage;

const COLUMNS: &str = "id, account_id, reference_number, category, fullname, contact_number, \
                       address, email_address, subject, detailed_description, respondent_name, \
                       respondent_address, latitude, longitude, status, priority, date_filed";

#[derive(Debug, Serialize)]
pub struct EvidenceResponse {
    pub id: Uuid,
    pub file_url: String,
}

#[derive(Debug, Serialize)]
pub struct ComplaintResponse {
    pub id: Uuid,
    pub reference_number: String,
    pub category: String,
    pub fullname: String,
    pub contact_number: String,
    pub address: String,
    pub email_address: String,
    pub subject: String,
    pub detailed_description: String,
    pub respondent_name: String,
    pub respondent_address: String,
    pub location: serde_json::Value,
    pub status: ComplaintStatus,
    pub priority: Priority,
    pub date_filed: chrono::DateTime<chrono::Utc>,
    pub evidence: Vec<EvidenceResponse>,
}

impl ComplaintResponse {
    fn new(complaint: Complaint, evidence: Vec<ComplaintEvidence>) -> Self {
        Self {
            id: complaint.id,
            reference_number: complaint.reference_number,
            category: complaint.category,
            fullname: complaint.fullname,
            contact_number: complaint.contact_number,
            address: complaint.address,
            email_address: complaint.email_address,
            subject: complaint.subject,
            detailed_description: complaint.detailed_description,
            respondent_name: complaint.respondent_name,
            respondent_address: complaint.respondent_address,
            location: json!({ "lat": complaint.latitude, "lng": complaint.longitude }),
            status: complaint.status,
            priority: complaint.priority,
            date_filed: complaint.date_filed,
            evidence: evidence
                .into_iter()
                .map(|e| EvidenceResponse {
                    id: e.id,
                    file_url: storage::media_url(&e.file_path),
                })
                .collect(),
        }
    }
}

/// GET /api/complaints - The caller's complaints, newest first
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<ComplaintResponse>> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let complaints: Vec<Complaint> = sqlx::query_as(&format!(
        "SELECT {} FROM complaints WHERE account_id = $1 ORDER BY date_filed DESC",
        COLUMNS
    ))
    .bind(auth.account_id)
    .fetch_all(&pool)
    .await?;

    with_evidence(&pool, complaints).await
}

/// GET /api/complaints/all - Every complaint, newest first (staff view)
pub async fn list_all(Extension(_auth): Extension<AuthUser>) -> ApiResult<Vec<ComplaintResponse>> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let complaints: Vec<Complaint> = sqlx::query_as(&format!(
        "SELECT {} FROM complaints ORDER BY date_filed DESC",
        COLUMNS
    ))
    .fetch_all(&pool)
    .await?;

    with_evidence(&pool, complaints).await
}

/// POST /api/complaints - File a complaint with optional evidence uploads
///
/// Multipart form; any number of `evidence` file parts become attachment
/// rows. The generated reference number is retried against the unique
/// constraint until a collision-free value lands.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<ComplaintResponse> {
    let form = FormData::collect(multipart).await?;

    let category = form.require("type")?;
    let fullname = form.require("fullname")?;
    let contact_number = form.require("contact_number")?;
    let address = form.require("address")?;
    let email_address = form.require("email_address")?;
    let subject = form.require("subject")?;
    let detailed_description = form.require("detailed_description")?;
    let respondent_name = form.require("respondent_name")?;
    let respondent_address = form.require("respondent_address")?;
    let latitude = form.parsed::<f64>("latitude")?.unwrap_or(0.0);
    let longitude = form.parsed::<f64>("longitude")?.unwrap_or(0.0);

    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let mut complaint: Option<Complaint> = None;
    for _ in 0..identifiers::REFERENCE_NUMBER_ATTEMPTS {
        let reference_number = identifiers::new_reference_number();

        let inserted: Result<Complaint, sqlx::Error> = sqlx::query_as(&format!(
            "INSERT INTO complaints
                 (account_id, reference_number, category, fullname, contact_number, address,
                  email_address, subject, detailed_description, respondent_name,
                  respondent_address, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {}",
            COLUMNS
        ))
        .bind(auth.account_id)
        .bind(&reference_number)
        .bind(&category)
        .bind(&fullname)
        .bind(&contact_number)
        .bind(&address)
        .bind(&email_address)
        .bind(&subject)
        .bind(&detailed_description)
        .bind(&respondent_name)
        .bind(&respondent_address)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(&pool)
        .await;

        match inserted {
            Ok(row) => {
                complaint = Some(row);
                break;
            }
            Err(e) if is_unique_violation(&e, "complaints_reference_number_key") => {
                tracing::debug!(reference = %reference_number, "reference number collision, retrying");
                continue;
            }
            Err(e) => return Err(ApiError::from(e)),
        }
    }

    let complaint = complaint.ok_or_else(|| {
        ApiError::internal_server_error("Could not allocate a unique reference number")
    })?;

    let evidence = store_evidence(&pool, complaint.id, &form).await?;

    tracing::info!(reference = %complaint.reference_number, "complaint filed");

    Ok(ApiResponse::created(ComplaintResponse::new(complaint, evidence)))
}

/// GET /api/complaints/:id - Retrieve a complaint
///
/// The row is fetched first, then ownership-checked: someone else's
/// complaint is a 403, a missing one a 404.
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<ComplaintResponse> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;
    let complaint = fetch_checked(&pool, auth.account_id, id).await?;
    let evidence = evidence_of(&pool, complaint.id).await?;
    Ok(ApiResponse::success(ComplaintResponse::new(complaint, evidence)))
}

/// PUT /api/complaints/:id - Partial update, optionally appending evidence
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<ComplaintResponse> {
    let form = FormData::collect(multipart).await?;

    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;
    let current = fetch_checked(&pool, auth.account_id, id).await?;

    let status = form.parsed_enum::<ComplaintStatus>("status")?.unwrap_or(current.status);
    let priority = form.parsed_enum::<Priority>("priority")?.unwrap_or(current.priority);

    let complaint: Complaint = sqlx::query_as(&format!(
        "UPDATE complaints
         SET category = $2, fullname = $3, contact_number = $4, address = $5, email_address = $6,
             subject = $7, detailed_description = $8, respondent_name = $9,
             respondent_address = $10, latitude = $11, longitude = $12, status = $13,
             priority = $14
         WHERE id = $1
         RETURNING {}",
        COLUMNS
    ))
    .bind(id)
    .bind(form.text("type").unwrap_or(&current.category))
    .bind(form.text("fullname").unwrap_or(&current.fullname))
    .bind(form.text("contact_number").unwrap_or(&current.contact_number))
    .bind(form.text("address").unwrap_or(&current.address))
    .bind(form.text("email_address").unwrap_or(&current.email_address))
    .bind(form.text("subject").unwrap_or(&current.subject))
    .bind(form.text("detailed_description").unwrap_or(&current.detailed_description))
    .bind(form.text("respondent_name").unwrap_or(&current.respondent_name))
    .bind(form.text("respondent_address").unwrap_or(&current.respondent_address))
    .bind(form.parsed::<f64>("latitude")?.unwrap_or(current.latitude))
    .bind(form.parsed::<f64>("longitude")?.unwrap_or(current.longitude))
    .bind(status)
    .bind(priority)
    .fetch_one(&pool)
    .await?;

    store_evidence(&pool, complaint.id, &form).await?;
    let evidence = evidence_of(&pool, complaint.id).await?;

    Ok(ApiResponse::success(ComplaintResponse::new(complaint, evidence)))
}

/// DELETE /api/complaints/:id - Delete a complaint and its evidence files
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;
    let complaint = fetch_checked(&pool, auth.account_id, id).await?;

    // Remove the stored files before the rows; the cascade takes the
    // evidence rows with the complaint.
    let evidence = evidence_of(&pool, complaint.id).await?;
    for item in &evidence {
        storage::delete_file(&item.file_path).await;
    }

    sqlx::query("DELETE FROM complaints WHERE id = $1")
        .bind(complaint.id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::<()>::no_content())
}

async fn fetch_checked(pool: &PgPool, account_id: Uuid, id: Uuid) -> Result<Complaint, ApiError> {
    let complaint: Option<Complaint> = sqlx::query_as(&format!(
        "SELECT {} FROM complaints WHERE id = $1",
        COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let complaint = complaint.ok_or_else(|| ApiError::not_found("Complaint not found"))?;

    if complaint.account_id != account_id {
        return Err(ApiError::forbidden(
            "You do not have permission to view this complaint.",
        ));
    }

    Ok(complaint)
}

async fn evidence_of(pool: &PgPool, complaint_id: Uuid) -> Result<Vec<ComplaintEvidence>, ApiError> {
    let evidence: Vec<ComplaintEvidence> = sqlx::query_as(
        "SELECT id, complaint_id, file_path, uploaded_at FROM complaint_evidence
         WHERE complaint_id = $1 ORDER BY uploaded_at",
    )
    .bind(complaint_id)
    .fetch_all(pool)
    .await?;

    Ok(evidence)
}

/// Save every `evidence` file part and insert the attachment rows
async fn store_evidence(
    pool: &PgPool,
    complaint_id: Uuid,
    form: &FormData,
) -> Result<Vec<ComplaintEvidence>, ApiError> {
    let mut stored = Vec::new();

    for upload in form.files_named("evidence") {
        let rel = storage::save_upload("evidence", &upload.file_name, &upload.data).await?;

        let row: ComplaintEvidence = sqlx::query_as(
            "INSERT INTO complaint_evidence (complaint_id, file_path) VALUES ($1, $2)
             RETURNING id, complaint_id, file_path, uploaded_at",
        )
        .bind(complaint_id)
        .bind(&rel)
        .fetch_one(pool)
        .await?;

        stored.push(row);
    }

    Ok(stored)
}

async fn with_evidence(
    pool: &PgPool,
    complaints: Vec<Complaint>,
) -> ApiResult<Vec<ComplaintResponse>> {
    let mut responses = Vec::with_capacity(complaints.len());
    for complaint in complaints {
        let evidence = evidence_of(pool, complaint.id).await?;
        responses.push(ComplaintResponse::new(complaint, evidence));
    }
    Ok(ApiResponse::success(responses))
}
