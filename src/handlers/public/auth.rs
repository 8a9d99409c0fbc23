use axum::extract::Multipart;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, validate_jwt, Claims, TokenUse, REFRESH_TOKEN_COOKIE};
use crate::error::ApiError;
use crate::handlers::multipart::FormData;
use crate::middleware::cookie::{access_token_cookie, refresh_token_cookie};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::account_service::{AccountService, RegisterInput, UserSummary};
use crate::services::session_service::SessionService;
use crate::storage;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register - Create a resident account with its profile
///
/// Multipart form: username, email, password, confirm_password, name,
/// contact_number, address, civil_status, birthdate, optional role and
/// optional `image` file part. Account and profile are created in one
/// transaction; the image is stored after the rows commit.
pub async fn register(multipart: Multipart) -> ApiResult<Value> {
    let form = FormData::collect(multipart).await?;

    let input = RegisterInput {
        username: form.require("username")?,
        email: form.require("email")?,
        password: form.require("password")?,
        confirm_password: form.require("confirm_password")?,
        name: form.require("name")?,
        contact_number: form.require("contact_number")?,
        address: form.require("address")?,
        civil_status: form.require("civil_status")?,
        birthdate: form.require_parsed("birthdate")?,
        role: form.parsed_enum("role")?,
    };

    // Input validation happens before any pool access
    crate::services::account_service::validate_registration(&input)
        .map_err(ApiError::from)?;

    let service = AccountService::new().await.map_err(ApiError::from)?;
    let mut user = service.register(input).await?;

    if let Some(upload) = form.file("image") {
        let rel = storage::save_upload("profile_pics", &upload.file_name, &upload.data).await?;
        service.set_profile_image(user.id, &rel).await?;
        user.profile.image = Some(storage::media_url(&rel));
    }

    tracing::info!(username = %user.username, "registered new account");

    Ok(ApiResponse::created(json!({
        "message": "User created successfully",
        "user": user,
    })))
}

/// POST /auth/login - Authenticate with email + password
///
/// On success sets the access/refresh token pair as httponly cookies and
/// returns the user/profile summary.
pub async fn login(
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let service = AccountService::new().await.map_err(ApiError::from)?;
    let (account, profile) = service.authenticate(&payload.email, &payload.password).await?;

    let access = generate_jwt(&Claims::access(account.id, &account.username, profile.role))?;
    let refresh = generate_jwt(&Claims::refresh(account.id, &account.username, profile.role))?;

    let jar = jar
        .add(access_token_cookie(access))
        .add(refresh_token_cookie(refresh));

    tracing::info!(username = %account.username, "login successful");

    let user = UserSummary::new(account, profile);

    Ok((
        jar,
        ApiResponse::success(json!({
            "message": "Login successful",
            "user": user,
        })),
    ))
}

/// POST /auth/refresh - Mint a new access token from the refresh cookie
///
/// 401 when the cookie is missing, expired, malformed or revoked. Only
/// token-validation failures map to 401; a datastore failure while
/// consulting the blacklist is a 500.
pub async fn refresh(jar: CookieJar) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    let cookie = jar
        .get(REFRESH_TOKEN_COOKIE)
        .ok_or_else(|| ApiError::unauthorized("Refresh token missing"))?;

    let claims = validate_jwt(cookie.value(), TokenUse::Refresh)
        .map_err(|_| ApiError::unauthorized("Invalid refresh token"))?;

    let sessions = SessionService::new().await.map_err(ApiError::from)?;
    if sessions.is_revoked(claims.jti).await.map_err(ApiError::from)? {
        return Err(ApiError::unauthorized("Invalid refresh token"));
    }

    let access = generate_jwt(&Claims::access(claims.sub, &claims.username, claims.role))?;
    let jar = jar.add(access_token_cookie(access));

    Ok((jar, ApiResponse::message("Token refreshed")))
}
