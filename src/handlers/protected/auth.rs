use axum::Extension;
use axum_extra::extract::CookieJar;
use serde_json::Value;

use crate::auth::{validate_jwt, TokenUse, REFRESH_TOKEN_COOKIE};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::cookie::{expired_access_cookie, expired_refresh_cookie};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::account_service::{AccountService, UserSummary};
use crate::services::session_service::SessionService;

/// GET /api/auth/whoami - Current authenticated user with profile
pub async fn whoami(Extension(auth): Extension<AuthUser>) -> ApiResult<UserSummary> {
    let service = AccountService::new().await.map_err(ApiError::from)?;
    let (account, profile) = service.get(auth.account_id).await?;
    Ok(ApiResponse::success(UserSummary::new(account, profile)))
}

/// POST /api/auth/logout - Revoke the refresh token and clear both cookies
///
/// A refresh cookie that no longer parses (expired, tampered) is skipped:
/// that session cannot be replayed anyway. A database failure while
/// blacklisting is NOT swallowed; the token must not stay usable without
/// the caller knowing.
pub async fn logout(
    Extension(auth): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    if let Some(cookie) = jar.get(REFRESH_TOKEN_COOKIE) {
        match validate_jwt(cookie.value(), TokenUse::Refresh) {
            Ok(claims) => {
                let sessions = SessionService::new().await.map_err(ApiError::from)?;
                sessions.revoke(&claims).await.map_err(ApiError::from)?;
                tracing::info!(username = %auth.username, "refresh token revoked");
            }
            Err(e) => {
                tracing::debug!(username = %auth.username, "skipping blacklist of unusable refresh token: {}", e);
            }
        }
    }

    let jar = jar.add(expired_access_cookie()).add(expired_refresh_cookie());

    Ok((jar, ApiResponse::reset_content("Successfully logged out")))
}
