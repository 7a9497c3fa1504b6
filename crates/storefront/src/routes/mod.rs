//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (pings the CMS)
//!
//! # Catalog
//! GET  /api/products                  - Product listing (pagination, category filter)
//! GET  /api/products/{document_id}    - Product detail
//! GET  /api/categories                - Category listing
//! GET  /api/sizes                     - Size listing
//!
//! # Checkout
//! POST /api/checkout                  - Validate cart, create order + preference
//! POST /api/payments/mp/preference    - Internal preference creation
//!
//! # Webhooks
//! POST /api/webhooks/mercadopago      - Payment notifications (always 200)
//! GET/HEAD/OPTIONS variants           - Endpoint validation pings
//! ```

pub mod catalog;
pub mod checkout;
pub mod preference;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/{document_id}", get(catalog::get_product))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/sizes", get(catalog::list_sizes))
        .route("/api/checkout", post(checkout::create))
        .route("/api/payments/mp/preference", post(preference::create))
        .route(
            "/api/webhooks/mercadopago",
            post(webhooks::receive)
                .get(webhooks::probe)
                .head(webhooks::probe)
                .options(webhooks::probe),
        )
}
