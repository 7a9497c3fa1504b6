//! Size CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tienda_core::normalize_size_code;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentAdmin;
use crate::routes::ListParams;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SizeBody {
    pub code: String,
}

impl SizeBody {
    /// Reject codes that normalize to nothing (e.g. only punctuation).
    fn checked_code(&self) -> Result<&str> {
        if normalize_size_code(&self.code).is_empty() {
            return Err(AppError::BadRequest(
                "code must contain at least one alphanumeric character".to_string(),
            ));
        }
        Ok(&self.code)
    }
}

/// GET /api/sizes
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let page = state
        .cms()
        .list_sizes(params.page(), params.page_size())
        .await?;
    Ok(Json(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// POST /api/sizes
#[instrument(skip(state, _admin))]
pub async fn create(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(body): Json<SizeBody>,
) -> Result<Json<Value>> {
    let size = state.cms().create_size(body.checked_code()?).await?;
    Ok(Json(json!(size)))
}

/// PUT /api/sizes/{id}
#[instrument(skip(state, _admin))]
pub async fn update(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
    Json(body): Json<SizeBody>,
) -> Result<Json<Value>> {
    let size = state.cms().update_size(&id, body.checked_code()?).await?;
    Ok(Json(json!(size)))
}

/// DELETE /api/sizes/{id}
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state.cms().delete_size(&id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_code() {
        assert!(SizeBody { code: "m".into() }.checked_code().is_ok());
        assert!(SizeBody { code: "---".into() }.checked_code().is_err());
        assert!(SizeBody { code: String::new() }.checked_code().is_err());
    }
}
