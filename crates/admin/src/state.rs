//! Application state shared across handlers.

use std::sync::Arc;

use tienda_cms::{CmsError, ContentClient};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    cms: ContentClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the content client fails to build.
    pub fn new(config: AdminConfig) -> Result<Self, CmsError> {
        let cms = ContentClient::new(&config.cms_url, &config.cms_api_token)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, cms }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the content-API client.
    #[must_use]
    pub fn cms(&self) -> &ContentClient {
        &self.inner.cms
    }
}
