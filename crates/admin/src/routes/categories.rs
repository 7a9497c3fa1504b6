//! Category CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tienda_core::normalize_category_label;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentAdmin;
use crate::routes::ListParams;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub label: String,
}

impl CategoryBody {
    fn checked_label(&self) -> Result<&str> {
        if normalize_category_label(&self.label).is_empty() {
            return Err(AppError::BadRequest(
                "label must contain at least one alphanumeric character".to_string(),
            ));
        }
        Ok(&self.label)
    }
}

/// GET /api/categories
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let page = state
        .cms()
        .list_categories(params.page(), params.page_size())
        .await?;
    Ok(Json(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// POST /api/categories
#[instrument(skip(state, _admin))]
pub async fn create(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(body): Json<CategoryBody>,
) -> Result<Json<Value>> {
    let category = state.cms().create_category(body.checked_label()?).await?;
    Ok(Json(json!(category)))
}

/// PUT /api/categories/{id}
#[instrument(skip(state, _admin))]
pub async fn update(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<Value>> {
    let category = state
        .cms()
        .update_category(&id, body.checked_label()?)
        .await?;
    Ok(Json(json!(category)))
}

/// DELETE /api/categories/{id}
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state.cms().delete_category(&id).await?;
    Ok(Json(json!({ "status": "deleted" })))
}
