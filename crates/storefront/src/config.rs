//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CMS_URL` - Base URL of the content API
//! - `CMS_API_TOKEN` - Server-side content-API token
//! - `SITE_URL` - Public origin of the storefront (used for payment
//!   back-urls and webhook gating)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `MP_ACCESS_TOKEN` - MercadoPago server access token; without it the
//!   preference endpoint is disabled and the webhook only acknowledges
//! - `MP_PUBLIC_KEY` - MercadoPago public key (handed to the browser widget)
//! - `MP_WEBHOOK_SECRET` - HMAC secret for webhook signature verification
//! - `MP_WEBHOOK_URL` - Explicit webhook URL override (attached to
//!   preferences even when `SITE_URL` is not HTTPS)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the content API
    pub cms_url: String,
    /// Server-side content-API token
    pub cms_api_token: SecretString,
    /// Public origin of the storefront
    pub site_url: String,
    /// MercadoPago configuration
    pub mercadopago: MercadoPagoConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// MercadoPago configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone, Default)]
pub struct MercadoPagoConfig {
    /// Server access token (None disables preference creation and payment
    /// fetches)
    pub access_token: Option<SecretString>,
    /// Public key (safe to expose to the browser)
    pub public_key: Option<String>,
    /// Webhook signing secret (None disables signature verification)
    pub webhook_secret: Option<SecretString>,
    /// Explicit webhook URL override
    pub webhook_url_override: Option<String>,
}

impl std::fmt::Debug for MercadoPagoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MercadoPagoConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("public_key", &self.public_key)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "[REDACTED]"))
            .field("webhook_url_override", &self.webhook_url_override)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;

        let cms_url = get_required_env("CMS_URL")?;
        let cms_api_token = SecretString::from(get_required_env("CMS_API_TOKEN")?);
        let site_url = get_required_env("SITE_URL")?
            .trim_end_matches('/')
            .to_string();

        let mercadopago = MercadoPagoConfig {
            access_token: get_optional_env("MP_ACCESS_TOKEN").map(SecretString::from),
            public_key: get_optional_env("MP_PUBLIC_KEY"),
            webhook_secret: get_optional_env("MP_WEBHOOK_SECRET").map(SecretString::from),
            webhook_url_override: get_optional_env("MP_WEBHOOK_URL"),
        };

        Ok(Self {
            host,
            port,
            cms_url,
            cms_api_token,
            site_url,
            mercadopago,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The webhook notification URL to attach to payment preferences, if
    /// any.
    ///
    /// An explicit override always wins; otherwise the URL is derived from
    /// the site origin, but only when that origin is HTTPS (the provider
    /// does not deliver notifications over plain HTTP).
    #[must_use]
    pub fn webhook_notification_url(&self) -> Option<String> {
        if let Some(explicit) = &self.mercadopago.webhook_url_override {
            return Some(explicit.clone());
        }
        if self.site_url.starts_with("https://") {
            return Some(format!("{}/api/webhooks/mercadopago", self.site_url));
        }
        None
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(site_url: &str, webhook_override: Option<&str>) -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            cms_url: "http://localhost:1337".to_string(),
            cms_api_token: SecretString::from("token"),
            site_url: site_url.to_string(),
            mercadopago: MercadoPagoConfig {
                webhook_url_override: webhook_override.map(String::from),
                ..MercadoPagoConfig::default()
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = config("https://tienda.example", None);
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_webhook_url_derived_from_https_origin() {
        let config = config("https://tienda.example", None);
        assert_eq!(
            config.webhook_notification_url().unwrap(),
            "https://tienda.example/api/webhooks/mercadopago"
        );
    }

    #[test]
    fn test_webhook_url_absent_for_http_origin() {
        let config = config("http://localhost:3000", None);
        assert!(config.webhook_notification_url().is_none());
    }

    #[test]
    fn test_webhook_url_override_wins() {
        let config = config(
            "http://localhost:3000",
            Some("https://tunnel.example/api/webhooks/mercadopago"),
        );
        assert_eq!(
            config.webhook_notification_url().unwrap(),
            "https://tunnel.example/api/webhooks/mercadopago"
        );
    }

    #[test]
    fn test_mercadopago_config_debug_redacts_secrets() {
        let mp = MercadoPagoConfig {
            access_token: Some(SecretString::from("super_secret_access_token")),
            public_key: Some("public-key-value".to_string()),
            webhook_secret: Some(SecretString::from("super_secret_webhook")),
            webhook_url_override: None,
        };
        let debug_output = format!("{mp:?}");
        assert!(debug_output.contains("public-key-value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_access_token"));
        assert!(!debug_output.contains("super_secret_webhook"));
    }
}
