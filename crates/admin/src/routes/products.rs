//! Product CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tienda_cms::ProductWrite;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentAdmin;
use crate::routes::ListParams;
use crate::state::AppState;

/// Create/update body. On update, absent fields leave the stored value
/// untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub offer: Option<bool>,
    pub offer_price: Option<Decimal>,
    pub stock: Option<i64>,
    pub show: Option<bool>,
    pub sizes: Option<Vec<i64>>,
    pub type_products: Option<Vec<i64>>,
    pub media: Option<Vec<i64>>,
}

impl ProductBody {
    fn into_write(self) -> Result<ProductWrite> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err(AppError::BadRequest("name must not be empty".to_string()));
        }
        if let Some(price) = self.price
            && price <= Decimal::ZERO
        {
            return Err(AppError::BadRequest("price must be positive".to_string()));
        }
        if let Some(stock) = self.stock
            && stock < 0
        {
            return Err(AppError::BadRequest("stock must not be negative".to_string()));
        }
        Ok(ProductWrite {
            name: self.name,
            price: self.price,
            offer: self.offer,
            offer_price: self.offer_price,
            stock: self.stock,
            show: self.show,
            sizes: self.sizes,
            type_products: self.type_products,
            media: self.media,
        })
    }

    fn into_create_write(self) -> Result<ProductWrite> {
        if self.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(AppError::BadRequest("name is required".to_string()));
        }
        if self.price.is_none() {
            return Err(AppError::BadRequest("price is required".to_string()));
        }
        self.into_write()
    }
}

/// GET /api/products - every product, hidden ones included.
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>> {
    let page = state
        .cms()
        .list_products(params.page(), params.page_size(), None, false)
        .await?;
    Ok(Json(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

/// GET /api/products/{id} - by numeric id or document id.
#[instrument(skip(state, _admin))]
pub async fn get(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let product = state.cms().get_product(&id).await?;
    Ok(Json(json!(product)))
}

/// POST /api/products
#[instrument(skip(state, _admin, body))]
pub async fn create(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(body): Json<ProductBody>,
) -> Result<Json<Value>> {
    let write = body.into_create_write()?;
    let product = state.cms().create_product(&write).await?;
    tracing::info!(document_id = %product.document_id, "product created");
    Ok(Json(json!(product)))
}

/// PUT /api/products/{id} - partial update by numeric id or document id.
#[instrument(skip(state, _admin, body))]
pub async fn update(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Value>> {
    let write = body.into_write()?;
    let product = state.cms().update_product(&id, &write).await?;
    Ok(Json(json!(product)))
}

/// DELETE /api/products/{id}
#[instrument(skip(state, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state.cms().delete_product(&id).await?;
    tracing::info!(id, "product deleted");
    Ok(Json(json!({ "status": "deleted" })))
}
