use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Claims;
use crate::database::manager::{DatabaseError, DatabaseManager};

/// Refresh-token revocation. A token is unusable once its `jti` lands in
/// the blacklist, regardless of its remaining lifetime.
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    /// Blacklist a refresh token. Idempotent: revoking twice is a no-op.
    pub async fn revoke(&self, claims: &Claims) -> Result<(), DatabaseError> {
        let token_exp = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);

        sqlx::query(
            "INSERT INTO revoked_tokens (jti, account_id, token_exp) VALUES ($1, $2, $3)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(claims.jti)
        .bind(claims.sub)
        .bind(token_exp)
        .execute(&self.pool)
        .await?;

        // Expired entries can never match a live token again; sweep them
        // while we are here rather than running a background job.
        sqlx::query("DELETE FROM revoked_tokens WHERE token_exp < now()")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn is_revoked(&self, jti: Uuid) -> Result<bool, DatabaseError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT jti FROM revoked_tokens WHERE jti = $1")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }
}
