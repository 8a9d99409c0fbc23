use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::account::Role;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Which half of the token pair a JWT belongs to. The auth middleware only
/// accepts `Access`; the refresh endpoint only accepts `Refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub token_use: TokenUse,
    /// Token id, recorded in the blacklist on revocation
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn access(account_id: Uuid, username: &str, role: Role) -> Self {
        let minutes = config::config().security.access_token_minutes;
        Self::new(account_id, username, role, TokenUse::Access, Duration::minutes(minutes))
    }

    pub fn refresh(account_id: Uuid, username: &str, role: Role) -> Self {
        let days = config::config().security.refresh_token_days;
        Self::new(account_id, username, role, TokenUse::Refresh, Duration::days(days))
    }

    fn new(account_id: Uuid, username: &str, role: Role, token_use: TokenUse, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id,
            username: username.to_string(),
            role,
            token_use,
            jti: Uuid::new_v4(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    /// Token signature has expired
    Expired,
    /// Signature verification failed
    InvalidSignature,
    /// Token valid but minted for the other half of the pair
    WrongTokenUse,
    InvalidSecret,
    Invalid(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Expired => write!(f, "Token has expired"),
            JwtError::InvalidSignature => write!(f, "Invalid token signature"),
            JwtError::WrongTokenUse => write!(f, "Wrong token type for this operation"),
            JwtError::InvalidSecret => write!(f, "JWT secret not configured"),
            JwtError::Invalid(msg) => write!(f, "Invalid token: {}", msg),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| JwtError::Invalid(e.to_string()))
}

/// Validate a JWT and require it to be the expected half of the token pair.
pub fn validate_jwt(token: &str, expected_use: TokenUse) -> Result<Claims, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::Invalid(e.to_string()),
    })?;

    if token_data.claims.token_use != expected_use {
        return Err(JwtError::WrongTokenUse);
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trip() {
        let id = Uuid::new_v4();
        let token = generate_jwt(&Claims::access(id, "resident", Role::User)).unwrap();
        let claims = validate_jwt(&token, TokenUse::Access).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "resident");
        assert_eq!(claims.token_use, TokenUse::Access);
    }

    #[test]
    fn refresh_token_rejected_where_access_expected() {
        let token = generate_jwt(&Claims::refresh(Uuid::new_v4(), "resident", Role::User)).unwrap();
        match validate_jwt(&token, TokenUse::Access) {
            Err(JwtError::WrongTokenUse) => {}
            other => panic!("expected WrongTokenUse, got {:?}", other.map(|c| c.token_use)),
        }
    }

    #[test]
    fn jti_is_unique_per_token() {
        let id = Uuid::new_v4();
        let a = Claims::refresh(id, "resident", Role::User);
        let b = Claims::refresh(id, "resident", Role::User);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(validate_jwt("not-a-jwt", TokenUse::Access).is_err());
    }
}
