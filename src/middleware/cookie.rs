//! Cookie transport for the JWT pair.
//!
//! Browser clients never see the tokens: both travel as httponly cookies,
//! and the bridge below rewrites the access cookie into a bearer header so
//! the auth middleware has a single code path.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::config;

/// If an access-token cookie is present and the client did not supply an
/// explicit Authorization header, synthesize a bearer header from the
/// cookie before authentication runs.
pub async fn cookie_to_header_middleware(jar: CookieJar, mut request: Request, next: Next) -> Response {
    if request.headers().get(AUTHORIZATION).is_none() {
        if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", cookie.value())) {
                request.headers_mut().insert(AUTHORIZATION, value);
            }
        }
    }

    next.run(request).await
}

// Both cookies share the same attributes; only name and lifetime differ.
// SameSite is Lax everywhere, including refresh.
fn build_cookie(name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(config::config().security.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

pub fn access_token_cookie(token: String) -> Cookie<'static> {
    let minutes = config::config().security.access_token_minutes;
    build_cookie(ACCESS_TOKEN_COOKIE, token, time::Duration::minutes(minutes))
}

pub fn refresh_token_cookie(token: String) -> Cookie<'static> {
    let days = config::config().security.refresh_token_days;
    build_cookie(REFRESH_TOKEN_COOKIE, token, time::Duration::days(days))
}

pub fn expired_access_cookie() -> Cookie<'static> {
    build_cookie(ACCESS_TOKEN_COOKIE, String::new(), time::Duration::seconds(0))
}

pub fn expired_refresh_cookie() -> Cookie<'static> {
    build_cookie(REFRESH_TOKEN_COOKIE, String::new(), time::Duration::seconds(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_cookies_are_httponly_lax_and_rooted() {
        for cookie in [
            access_token_cookie("tok".to_string()),
            refresh_token_cookie("tok".to_string()),
        ] {
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
            assert_eq!(cookie.path(), Some("/"));
        }
    }

    #[test]
    fn expired_cookies_have_zero_max_age() {
        assert_eq!(
            expired_access_cookie().max_age(),
            Some(time::Duration::seconds(0))
        );
        assert_eq!(
            expired_refresh_cookie().max_age(),
            Some(time::Duration::seconds(0))
        );
    }
}
