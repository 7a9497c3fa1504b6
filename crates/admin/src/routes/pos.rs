//! Point-of-sale handler: an in-person, admin-operated sale that decrements
//! stock and records an immutable Sale.
//!
//! Stock is checked with the cart domain and then written back
//! read-then-write; concurrent sales of the same product can interleave and
//! drive stock negative. The content API has no compare-and-swap, so this
//! race is accepted and the stock check is best-effort.

use axum::{Json, extract::State};
use chrono::Utc;
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{Value, json};
use tienda_core::cart::{self, CartLine};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::CurrentAdmin;
use crate::state::AppState;

/// One line of an in-person sale.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosItemInput {
    pub document_id: String,
    pub quantity: u32,
}

/// POS sale request body.
#[derive(Debug, Deserialize)]
pub struct PosSaleRequest {
    pub items: Vec<PosItemInput>,
}

/// Human-readable summary of the sold lines, stored as the sale's name.
fn sale_name(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}x {}", line.quantity, line.product.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Names of products whose stock does not cover the requested quantity.
fn insufficient_names(lines: &[CartLine]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.product.stock < i64::from(line.quantity))
        .map(|line| line.product.name.clone())
        .collect()
}

/// POST /api/pos/sales
#[instrument(skip(state, _admin, request), fields(item_count = request.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(request): Json<PosSaleRequest>,
) -> Result<Json<Value>> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest("sale has no items".to_string()));
    }
    if request.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    // Fetch every product; a missing one fails the sale outright.
    let products = join_all(
        request
            .items
            .iter()
            .map(|item| state.cms().get_product_by_document_id(&item.document_id)),
    )
    .await
    .into_iter()
    .collect::<std::result::Result<Vec<_>, _>>()?;

    // Build the cart through the domain so duplicate lines merge.
    let mut lines: Vec<CartLine> = cart::clear_cart();
    for (item, product) in request.items.iter().zip(&products) {
        lines = cart::add_to_cart(&lines, product, None, item.quantity);
    }

    if !cart::has_sufficient_stock(&lines) {
        return Err(AppError::Conflict(format!(
            "insufficient stock: {}",
            insufficient_names(&lines).join(", ")
        )));
    }

    let total = cart::total(&lines);

    // Read-then-write decrement per line (accepted race, see module doc).
    for line in &lines {
        state
            .cms()
            .decrement_stock(&line.product, line.quantity)
            .await?;
    }

    let sale = state
        .cms()
        .create_sale(&sale_name(&lines), total, Utc::now())
        .await?;

    tracing::info!(sale = %sale.document_id, total = %sale.sale_price, "POS sale recorded");
    Ok(Json(json!(sale)))
}

/// GET /api/pos/sales - sale history, newest first.
#[instrument(skip(state, _admin))]
pub async fn list(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    axum::extract::Query(params): axum::extract::Query<crate::routes::ListParams>,
) -> Result<Json<Value>> {
    let page = state
        .cms()
        .list_sales(params.page(), params.page_size())
        .await?;
    Ok(Json(json!({
        "items": page.items,
        "pagination": page.pagination,
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use tienda_core::{DocumentId, Product, ProductId};

    use super::*;

    fn product(id: i64, name: &str, price: i64, stock: i64) -> Product {
        Product {
            id: ProductId::new(id),
            document_id: DocumentId::new(format!("doc{id}")),
            name: name.to_owned(),
            price: Decimal::new(price, 0),
            offer: false,
            offer_price: None,
            stock,
            show: true,
            sizes: vec![],
            categories: vec![],
            media: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_sale_name_lists_quantities() {
        let lines = vec![
            CartLine {
                product: product(1, "Remera", 1500, 10),
                size: None,
                quantity: 2,
            },
            CartLine {
                product: product(2, "Pantalón", 3000, 5),
                size: None,
                quantity: 1,
            },
        ];
        assert_eq!(sale_name(&lines), "2x Remera, 1x Pantalón");
    }

    #[test]
    fn test_insufficient_names_flags_only_offenders() {
        let lines = vec![
            CartLine {
                product: product(1, "Remera", 1500, 1),
                size: None,
                quantity: 2,
            },
            CartLine {
                product: product(2, "Pantalón", 3000, 5),
                size: None,
                quantity: 1,
            },
        ];
        assert_eq!(insufficient_names(&lines), vec!["Remera".to_owned()]);
        assert!(!cart::has_sufficient_stock(&lines));
    }
}
