//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the CMS)
//!
//! # Auth (public)
//! POST /auth/login             - Exchange credentials for a session cookie
//! POST /auth/logout            - Clear the session cookie
//!
//! # Products (session required)
//! GET    /api/products         - List (hidden included)
//! GET    /api/products/{id}    - Detail (numeric id or document id)
//! POST   /api/products         - Create
//! PUT    /api/products/{id}    - Update
//! DELETE /api/products/{id}    - Delete
//!
//! # Sizes / Categories (session required)
//! GET/POST         /api/sizes, /api/categories
//! PUT/DELETE       /api/sizes/{id}, /api/categories/{id}
//!
//! # Orders (session required, read-only)
//! GET /api/orders
//! GET /api/orders/{token}
//!
//! # Point of sale (session required)
//! GET  /api/pos/sales          - Sale history
//! POST /api/pos/sales          - Record a sale (decrements stock)
//!
//! # Files (session required)
//! POST   /api/files            - Multipart upload
//! DELETE /api/files/{id}       - Delete
//! ```

pub mod auth;
pub mod categories;
pub mod files;
pub mod orders;
pub mod pos;
pub mod products;
pub mod sizes;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 25;

/// Pagination parameters shared by the listing endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListParams {
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100)
    }
}

/// Routes reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

/// Routes behind the session guard.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/api/sizes", get(sizes::list).post(sizes::create))
        .route(
            "/api/sizes/{id}",
            put(sizes::update).delete(sizes::delete),
        )
        .route(
            "/api/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/api/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/api/orders", get(orders::list))
        .route("/api/orders/{token}", get(orders::get))
        .route("/api/pos/sales", get(pos::list).post(pos::create))
        .route("/api/files", post(files::upload))
        .route("/api/files/{id}", axum::routing::delete(files::delete))
}
