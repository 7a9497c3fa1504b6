//! Order browsing handlers (read-only: orders are created by checkout and
//! confirmed by the webhook, never edited here).

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentAdmin;
use crate::routes::ListParams;
use crate::state::AppState;

/// GET /api/orders - newest first.
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let page = state
        .cms()
        .list_orders(params.page(), params.page_size())
        .await?;
    Ok(Json(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// GET /api/orders/{token} - look up one order by its correlation token.
#[instrument(skip(state, _admin))]
pub async fn get(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(token): Path<String>,
) -> Result<Json<Value>> {
    let order = state
        .cms()
        .find_order_by_token(&token)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {token}")))?;
    Ok(Json(json!(order)))
}
