//! Application state shared across handlers.

use std::sync::Arc;

use tienda_cms::{CmsError, ContentClient};

use crate::config::StorefrontConfig;
use crate::mercadopago::{MercadoPagoClient, MercadoPagoError};

/// Error creating the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("content client: {0}")]
    Cms(#[from] CmsError),
    #[error("mercadopago client: {0}")]
    MercadoPago(#[from] MercadoPagoError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the outbound
/// API clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cms: ContentClient,
    mercadopago: Option<MercadoPagoClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The MercadoPago client exists only when an access token is
    /// configured; payment routes check for it and degrade explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let cms = ContentClient::new(&config.cms_url, &config.cms_api_token)?;
        let mercadopago = config
            .mercadopago
            .access_token
            .as_ref()
            .map(MercadoPagoClient::new)
            .transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                cms,
                mercadopago,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the content-API client.
    #[must_use]
    pub fn cms(&self) -> &ContentClient {
        &self.inner.cms
    }

    /// Get the MercadoPago client, if configured.
    #[must_use]
    pub fn mercadopago(&self) -> Option<&MercadoPagoClient> {
        self.inner.mercadopago.as_ref()
    }
}
