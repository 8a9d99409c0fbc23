use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::certificate::RequestStatus;
use crate::database::models::permit::BusinessPermit;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

const COLUMNS: &str = "id, account_id, business_name, business_type, owner_name, business_address, \
                       contact_number, owner_address, business_description, is_renewal, status, \
                       created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct CreatePermitRequest {
    pub business_name: String,
    pub business_type: String,
    pub owner_name: String,
    pub business_address: String,
    pub contact_number: String,
    pub owner_address: String,
    #[serde(default)]
    pub business_description: String,
    #[serde(default)]
    pub is_renewal: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePermitRequest {
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub owner_name: Option<String>,
    pub business_address: Option<String>,
    pub contact_number: Option<String>,
    pub owner_address: Option<String>,
    pub business_description: Option<String>,
    pub is_renewal: Option<bool>,
    pub status: Option<RequestStatus>,
}

/// GET /api/permits - The caller's business permits, newest first
pub async fn list(Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<BusinessPermit>> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let permits: Vec<BusinessPermit> = sqlx::query_as(&format!(
        "SELECT {} FROM business_permits WHERE account_id = $1 ORDER BY created_at DESC",
        COLUMNS
    ))
    .bind(auth.account_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::success(permits))
}

/// POST /api/permits - Apply for (or renew) a business permit
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreatePermitRequest>,
) -> ApiResult<BusinessPermit> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let permit: BusinessPermit = sqlx::query_as(&format!(
        "INSERT INTO business_permits
             (account_id, business_name, business_type, owner_name, business_address,
              contact_number, owner_address, business_description, is_renewal)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        COLUMNS
    ))
    .bind(auth.account_id)
    .bind(&payload.business_name)
    .bind(&payload.business_type)
    .bind(&payload.owner_name)
    .bind(&payload.business_address)
    .bind(&payload.contact_number)
    .bind(&payload.owner_address)
    .bind(&payload.business_description)
    .bind(payload.is_renewal)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(permit))
}

/// GET /api/permits/:id - Retrieve one of the caller's permits
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<BusinessPermit> {
    let permit = fetch_owned(auth.account_id, id).await?;
    Ok(ApiResponse::success(permit))
}

/// PUT /api/permits/:id - Partial update of one of the caller's permits
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePermitRequest>,
) -> ApiResult<BusinessPermit> {
    let current = fetch_owned(auth.account_id, id).await?;
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let permit: BusinessPermit = sqlx::query_as(&format!(
        "UPDATE business_permits
         SET business_name = $3, business_type = $4, owner_name = $5, business_address = $6,
             contact_number = $7, owner_address = $8, business_description = $9, is_renewal = $10,
             status = $11, updated_at = now()
         WHERE id = $1 AND account_id = $2
         RETURNING {}",
        COLUMNS
    ))
    .bind(id)
    .bind(auth.account_id)
    .bind(payload.business_name.unwrap_or(current.business_name))
    .bind(payload.business_type.unwrap_or(current.business_type))
    .bind(payload.owner_name.unwrap_or(current.owner_name))
    .bind(payload.business_address.unwrap_or(current.business_address))
    .bind(payload.contact_number.unwrap_or(current.contact_number))
    .bind(payload.owner_address.unwrap_or(current.owner_address))
    .bind(payload.business_description.unwrap_or(current.business_description))
    .bind(payload.is_renewal.unwrap_or(current.is_renewal))
    .bind(payload.status.unwrap_or(current.status))
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::success(permit))
}

/// DELETE /api/permits/:id - Delete one of the caller's permits
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let result = sqlx::query("DELETE FROM business_permits WHERE id = $1 AND account_id = $2")
        .bind(id)
        .bind(auth.account_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Business permit not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}

async fn fetch_owned(account_id: Uuid, id: Uuid) -> Result<BusinessPermit, ApiError> {
    let pool = DatabaseManager::pool().await.map_err(ApiError::from)?;

    let permit: Option<BusinessPermit> = sqlx::query_as(&format!(
        "SELECT {} FROM business_permits WHERE id = $1 AND account_id = $2",
        COLUMNS
    ))
    .bind(id)
    .bind(account_id)
    .fetch_optional(&pool)
    .await?;

    permit.ok_or_else(|| ApiError::not_found("Business permit not found"))
}
