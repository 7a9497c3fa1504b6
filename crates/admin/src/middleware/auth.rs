//! Admin session guard.
//!
//! The session cookie holds a CMS admin bearer token; there is no local
//! session store. Every protected request re-validates the token against
//! the CMS "who am I" endpoint, so revocation takes effect immediately at
//! the cost of one upstream round trip per request.
//!
//! Failure handling per route kind:
//! - no cookie: redirect to the login page (401 for `/api/` paths);
//! - introspection rejected or unreachable: clear the cookie, then the
//!   same redirect/401 split.
//!
//! On success the cookie is re-issued with a one-hour max-age (login itself
//! grants eight hours), giving a sliding window.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tienda_cms::AdminUser;

use crate::config::Environment;
use crate::state::AppState;

/// Cookie max-age granted at login.
pub const LOGIN_MAX_AGE_SECS: u64 = 8 * 60 * 60;

/// Cookie max-age granted on each validated request.
pub const REFRESH_MAX_AGE_SECS: u64 = 60 * 60;

/// The authenticated administrator, inserted into request extensions by
/// [`require_admin_session`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentAdmin(admin): CurrentAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email.unwrap_or_default())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentAdmin(pub AdminUser);

impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Build the `Set-Cookie` value for a session token.
///
/// HttpOnly + `SameSite=Strict` always; `Secure` in production (required by
/// the `__Host-` cookie name prefix).
#[must_use]
pub fn build_session_cookie(environment: Environment, token: &str, max_age_secs: u64) -> String {
    let mut cookie = format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}",
        environment.session_cookie_name()
    );
    if environment.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the session cookie.
#[must_use]
pub fn clear_session_cookie(environment: Environment) -> String {
    build_session_cookie(environment, "", 0)
}

/// Extract the session token from the `Cookie` header(s).
#[must_use]
pub fn session_token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, token) = pair.trim().split_once('=')?;
            (name == cookie_name && !token.is_empty()).then(|| token.to_owned())
        })
        .next()
}

/// Middleware guarding every admin route.
pub async fn require_admin_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let environment = state.config().environment;
    let cookie_name = environment.session_cookie_name();
    let is_api = request.uri().path().starts_with("/api/");

    let Some(token) = session_token_from_headers(request.headers(), cookie_name) else {
        return reject(environment, is_api, false);
    };

    match state.cms().introspect_admin(&token).await {
        Ok(admin) => {
            request.extensions_mut().insert(CurrentAdmin(admin));
            let mut response = next.run(request).await;
            // Sliding window: another hour from this request.
            if let Ok(value) = HeaderValue::from_str(&build_session_cookie(
                environment,
                &token,
                REFRESH_MAX_AGE_SECS,
            )) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            response
        }
        Err(err) => {
            // Rejected, expired, or the CMS was unreachable - all of these
            // invalidate the cookie.
            tracing::warn!(error = %err, "admin session introspection failed");
            reject(environment, is_api, true)
        }
    }
}

fn reject(environment: Environment, is_api: bool, clear_cookie: bool) -> Response {
    let mut response = if is_api {
        StatusCode::UNAUTHORIZED.into_response()
    } else {
        Redirect::to("/auth/login").into_response()
    };
    if clear_cookie
        && let Ok(value) = HeaderValue::from_str(&clear_session_cookie(environment))
    {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_session_cookie_development() {
        let cookie = build_session_cookie(Environment::Development, "tok123", LOGIN_MAX_AGE_SECS);
        assert_eq!(
            cookie,
            "admin_token=tok123; Path=/; HttpOnly; SameSite=Strict; Max-Age=28800"
        );
    }

    #[test]
    fn test_build_session_cookie_production_is_secure_host_prefixed() {
        let cookie = build_session_cookie(Environment::Production, "tok123", REFRESH_MAX_AGE_SECS);
        assert!(cookie.starts_with("__Host-admin_token=tok123; "));
        assert!(cookie.ends_with("; Secure"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn test_clear_session_cookie_zeroes_max_age() {
        let cookie = clear_session_cookie(Environment::Development);
        assert!(cookie.starts_with("admin_token=; "));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_session_token_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(session_token_from_headers(&headers, "admin_token").is_none());

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; admin_token=tok123; theme=dark"),
        );
        assert_eq!(
            session_token_from_headers(&headers, "admin_token").as_deref(),
            Some("tok123")
        );
        // Wrong cookie name finds nothing.
        assert!(session_token_from_headers(&headers, "__Host-admin_token").is_none());
    }

    #[test]
    fn test_session_token_ignores_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("admin_token="));
        assert!(session_token_from_headers(&headers, "admin_token").is_none());
    }
}
