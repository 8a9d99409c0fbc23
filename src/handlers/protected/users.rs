use axum::extract::{Multipart, Path};
use axum::Extension;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::multipart::FormData;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::account_service::{AccountService, UpdateUserInput, UserSummary};
use crate::storage;

/// GET /api/users - All accounts with their profiles
pub async fn list(Extension(_auth): Extension<AuthUser>) -> ApiResult<Vec<UserSummary>> {
    let service = AccountService::new().await.map_err(ApiError::from)?;
    let users = service.list().await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/users/:id - One account with profile
pub async fn get(
    Extension(_auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<UserSummary> {
    let service = AccountService::new().await.map_err(ApiError::from)?;
    let (account, profile) = service.get(user_id).await?;
    Ok(ApiResponse::success(UserSummary::new(account, profile)))
}

/// PUT /api/users/:id - Partial update of account/profile fields
///
/// Multipart form; absent fields keep their values. An `image` part
/// replaces the stored profile image and deletes the old file.
pub async fn update(
    Extension(_auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Value> {
    let form = FormData::collect(multipart).await?;

    let input = UpdateUserInput {
        username: form.text("username").map(str::to_string),
        email: form.text("email").map(str::to_string),
        name: form.text("name").map(str::to_string),
        contact_number: form.text("contact_number").map(str::to_string),
        address: form.text("address").map(str::to_string),
        civil_status: form.text("civil_status").map(str::to_string),
        birthdate: form.parsed("birthdate")?,
        role: form.parsed_enum("role")?,
    };

    let service = AccountService::new().await.map_err(ApiError::from)?;
    let mut user = service.update(user_id, input).await?;

    if let Some(upload) = form.file("image") {
        let rel = storage::save_upload("profile_pics", &upload.file_name, &upload.data).await?;
        let previous = service.set_profile_image(user_id, &rel).await?;
        if let Some(old) = previous {
            storage::delete_file(&old).await;
        }
        user.profile.image = Some(storage::media_url(&rel));
    }

    Ok(ApiResponse::success(json!({
        "message": "User updated successfully",
        "user": user,
    })))
}

/// DELETE /api/users/:id - Remove the account, its profile and image file
pub async fn delete(
    Extension(_auth): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<()> {
    let service = AccountService::new().await.map_err(ApiError::from)?;
    let image_path = service.delete(user_id).await?;

    if let Some(path) = image_path {
        storage::delete_file(&path).await;
    }

    Ok(ApiResponse::<()>::no_content())
}
