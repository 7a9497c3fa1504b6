//! Content-API client library.
//!
//! # Architecture
//!
//! - One [`ContentClient`] over `reqwest`, bearer-authenticated with the
//!   server-side API token; per-resource operations live in their own
//!   modules as `impl ContentClient` blocks.
//! - The CMS is the source of truth - no local sync, no cross-request
//!   caching; every read goes to the API.
//! - Responses are normalized through [`envelope`] before typed
//!   deserialization, so callers never see the difference between the v4
//!   (nested `attributes`) and v5 (flat) response envelopes.
//! - The id-vs-document-id addressing mismatch between API versions is
//!   bridged by [`fallback::with_id_fallback`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tienda_cms::ContentClient;
//!
//! let cms = ContentClient::new(&config.cms_url, &config.cms_token)?;
//!
//! let page = cms.list_products(1, 25, None, true).await?;
//! let product = cms.get_product_by_document_id("abc123").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
pub mod envelope;
pub mod fallback;

mod admin;
mod categories;
mod files;
mod orders;
mod products;
mod sales;
mod sizes;

pub use admin::{AdminToken, AdminUser};
pub use client::{ContentClient, Paginated};
pub use envelope::PageInfo;
pub use orders::{NewOrder, OrderPaymentUpdate};
pub use products::ProductWrite;

use thiserror::Error;

/// Errors that can occur when talking to the content API.
#[derive(Debug, Error)]
pub enum CmsError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx status. Status and body are preserved for
    /// the caller to render or log.
    #[error("content API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// A resource was absent, named so callers can decide to retry through
    /// the id-resolution fallback.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// JSON (de)serialization failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed as JSON but did not have the expected envelope.
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// The client could not be constructed (bad base URL or token bytes).
    #[error("client configuration error: {0}")]
    Config(String),
}

impl CmsError {
    /// Whether this error means "the resource does not exist" (either the
    /// typed variant or a raw 404 from the API).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Api { status: 404, .. }
        )
    }

    /// Convert a raw 404 into a named not-found error; other errors pass
    /// through unchanged.
    #[must_use]
    pub fn named_not_found(self, resource: &str, id: &str) -> Self {
        if let Self::Api { status: 404, .. } = self {
            Self::NotFound {
                resource: resource.to_owned(),
                id: id.to_owned(),
            }
        } else {
            self
        }
    }
}
