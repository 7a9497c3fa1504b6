//! Login/logout handlers. Credentials are forwarded to the CMS admin
//! surface; the resulting bearer token lives only in the session cookie.

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tienda_cms::CmsError;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::auth::{LOGIN_MAX_AGE_SECS, build_session_cookie, clear_session_cookie};
use crate::state::AppState;

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    let session = state
        .cms()
        .admin_login(&request.email, &request.password)
        .await
        .map_err(|err| match err {
            CmsError::Api { status: 400 | 401, .. } => {
                AppError::Unauthorized("Invalid credentials".to_string())
            }
            other => AppError::from(other),
        })?;

    let cookie = build_session_cookie(
        state.config().environment,
        &session.token,
        LOGIN_MAX_AGE_SECS,
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("cookie encoding: {e}")))?;

    tracing::info!(admin_id = session.user.id, "admin logged in");

    let mut response = Json(json!({ "user": session.user })).into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}

/// POST /auth/logout - clear the session cookie. The CMS token itself
/// simply expires; there is no server-side session to destroy.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<Response> {
    let cookie = clear_session_cookie(state.config().environment);
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("cookie encoding: {e}")))?;

    let mut response = Json(json!({ "status": "ok" })).into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}
