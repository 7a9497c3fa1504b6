//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CMS_URL` - Base URL of the content API
//! - `CMS_API_TOKEN` - Server-side content-API token (CRUD writes)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_ENVIRONMENT` - `development` (default) or `production`; selects
//!   the session cookie name and the `Secure` attribute
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

/// Deployment environment. Production hardens the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvVar(
                "ADMIN_ENVIRONMENT".to_string(),
                format!("expected development or production, got {other:?}"),
            )),
        }
    }

    /// Whether this is a production deployment.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// The session cookie name. The `__Host-` prefix in production binds
    /// the cookie to this host over HTTPS.
    #[must_use]
    pub const fn session_cookie_name(self) -> &'static str {
        match self {
            Self::Production => "__Host-admin_token",
            Self::Development => "admin_token",
        }
    }
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the content API
    pub cms_url: String,
    /// Server-side content-API token
    pub cms_api_token: SecretString,
    /// Deployment environment
    pub environment: Environment,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl AdminConfig {
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

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;

        let cms_url = get_required_env("CMS_URL")?;
        let cms_api_token = SecretString::from(get_required_env("CMS_API_TOKEN")?);
        let environment =
            Environment::parse(&get_env_or_default("ADMIN_ENVIRONMENT", "development"))?;

        Ok(Self {
            host,
            port,
            cms_url,
            cms_api_token,
            environment,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            Environment::parse("development").ok(),
            Some(Environment::Development)
        );
        assert_eq!(
            Environment::parse("production").ok(),
            Some(Environment::Production)
        );
        assert!(Environment::parse("staging").is_err());
    }

    #[test]
    fn test_cookie_name_varies_by_environment() {
        assert_eq!(
            Environment::Development.session_cookie_name(),
            "admin_token"
        );
        assert_eq!(
            Environment::Production.session_cookie_name(),
            "__Host-admin_token"
        );
    }
}
