//! Catalog read handlers. Thin JSON projections of CMS reads; nothing is
//! cached across requests.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 25;

/// Pagination + filter parameters for listing endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category: Option<String>,
}

impl ListParams {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100)
    }
}

/// GET /api/products - visible products, paginated, optionally filtered by
/// category label.
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let page = state
        .cms()
        .list_products(
            params.page(),
            params.page_size(),
            params.category.as_deref(),
            true,
        )
        .await?;
    Ok(Json(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// GET /api/products/{document_id} - product detail.
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Value>> {
    let product = state.cms().get_product_by_document_id(&document_id).await?;
    Ok(Json(json!(product)))
}

/// GET /api/categories - category listing.
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
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

/// GET /api/sizes - size listing.
#[instrument(skip(state))]
pub async fn list_sizes(
    State(state): State<AppState>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults_and_clamping() {
        let params = ListParams {
            page: None,
            page_size: None,
            category: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);

        let params = ListParams {
            page: Some(0),
            page_size: Some(10_000),
            category: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 100);
    }
}
