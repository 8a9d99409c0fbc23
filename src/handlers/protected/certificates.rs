use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::certificate::{CertificateRequest, RequestStatus};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::identifiers;

const COLUMNS: &str = "id, account_id, certificate_type, request_number, first_name, last_name, \
                       middle_name, complete_address, contact_number, email_address, purpose, \
                       agree_terms, status, created_at";

#[derive(Debug, Deserialize)]
pub struct CreateCertificateRequest {
    pub certificate_type: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub complete_address: String,
    pub contact_number: String,
    pub email_address: String,
    pub purpose: String,
    #[serde(default)]
    pub agree_terms: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCertificateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub complete_address: Option<String>,
    pub contact_number: Option<String>,
    pub email_address: Option<String>,
    pub purpose: Option<String>,
    pub status: Option<RequestStatus>,
}

/// GET /api/certificates - The caller's certificate requests, newest first
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<CertificateRequest>> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let requests: Vec<CertificateRequest> = sqlx::query_as(&format!(
        "SELECT {} FROM certificate_requests WHERE account_id = $1 ORDER BY created_at DESC",
        COLUMNS
    ))
    .bind(auth.account_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(requests))
}

/// POST /api/certificates - File a certificate request
///
/// The request number is allocated from the per-type counter inside the
/// same transaction as the insert, so concurrent filings of the same type
/// get distinct, increasing sequence numbers.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateCertificateRequest>,
) -> ApiResult<CertificateRequest> {
    if !payload.agree_terms {
        return Err(ApiError::field_error(
            "agree_terms",
            "You must agree to the terms and conditions.",
        ));
    }
    if payload.certificate_type.trim().is_empty() {
        return Err(ApiError::field_error("certificate_type", "This field is required"));
    }

    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;
    let mut tx = pool.begin().await?;

    let request_number = identifiers::next_request_number(&mut tx, &payload.certificate_type)
        .await
        .map_err(ApiError::from)?;

    let request: CertificateRequest = sqlx::query_as(&format!(
        "INSERT INTO certificate_requests
             (account_id, certificate_type, request_number, first_name, last_name, middle_name,
              complete_address, contact_number, email_address, purpose, agree_terms)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {}",
        COLUMNS
    ))
    .bind(auth.account_id)
    .bind(&payload.certificate_type)
    .bind(&request_number)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.middle_name)
    .bind(&payload.complete_address)
    .bind(&payload.contact_number)
    .bind(&payload.email_address)
    .bind(&payload.purpose)
    .bind(payload.agree_terms)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(request_number = %request.request_number, "certificate request filed");

    Ok(ApiResponse::created(request))
}

/// GET /api/certificates/:id - Retrieve one of the caller's requests
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<CertificateRequest> {
    let request = fetch_owned(auth.account_id, id).await?;
    Ok(ApiResponse::success(request))
}

/// PUT /api/certificates/:id - Partial update of one of the caller's requests
///
/// The request number is immutable once assigned.
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCertificateRequest>,
) -> ApiResult<CertificateRequest> {
    let current = fetch_owned(auth.account_id, id).await?;
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let request: CertificateRequest = sqlx::query_as(&format!(
        "UPDATE certificate_requests
         SET first_name = $3, last_name = $4, middle_name = $5, complete_address = $6,
             contact_number = $7, email_address = $8, purpose = $9, status = $10
         WHERE id = $1 AND account_id = $2
         RETURNING {}",
        COLUMNS
    ))
    .bind(id)
    .bind(auth.account_id)
    .bind(payload.first_name.unwrap_or(current.first_name))
    .bind(payload.last_name.unwrap_or(current.last_name))
    .bind(payload.middle_name.or(current.middle_name))
    .bind(payload.complete_address.unwrap_or(current.complete_address))
    .bind(payload.contact_number.unwrap_or(current.contact_number))
    .bind(payload.email_address.unwrap_or(current.email_address))
    .bind(payload.purpose.unwrap_or(current.purpose))
    .bind(payload.status.unwrap_or(current.status))
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::success(request))
}

/// DELETE /api/certificates/:id - Delete one of the caller's requests
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let result = sqlx::query("DELETE FROM certificate_requests WHERE id = $1 AND account_id = $2")
        .bind(id)
        .bind(auth.account_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Certificate request not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}

async fn fetch_owned(account_id: Uuid, id: Uuid) -> Result<CertificateRequest, ApiError> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let request: Option<CertificateRequest> = sqlx::query_as(&format!(
        "SELECT {} FROM certificate_requests WHERE id = $1 AND account_id = $2",
        COLUMNS
    ))
    .bind(id)
    .bind(account_id)
    .fetch_optional(&pool)
    .await?;

    request.ok_or_else(|| ApiError::not_found("Certificate request not found"))
}
