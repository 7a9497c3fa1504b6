//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T,
//! AppError>`. The one deliberate exception is the webhook handler, which
//! never fails outward (see `routes::webhooks`).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tienda_cms::CmsError;

use crate::checkout::CheckoutError;
use crate::mercadopago::{MercadoPagoError, PreferenceValidationError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Content API operation failed.
    #[error("CMS error: {0}")]
    Cms(#[from] CmsError),

    /// Payment provider operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] MercadoPagoError),

    /// Checkout orchestration failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Preference payload failed validation.
    #[error("Invalid preference: {0}")]
    InvalidPreference(#[from] PreferenceValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A required upstream is not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Cms(err) => {
                if err.is_not_found() {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::Checkout(err) => err.status(),
            Self::InvalidPreference(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to clients. Upstream detail stays in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Cms(err) => {
                if err.is_not_found() {
                    err.to_string()
                } else {
                    "External service error".to_string()
                }
            }
            Self::Payment(_) => "Payment provider error".to_string(),
            Self::Checkout(err) => err.public_message(),
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unavailable("x".to_string()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cms_not_found_maps_to_404() {
        let err = AppError::Cms(CmsError::NotFound {
            resource: "products".into(),
            id: "abc".into(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "products not found: abc");
    }

    #[test]
    fn test_upstream_errors_hide_detail() {
        let err = AppError::Cms(CmsError::Api {
            status: 500,
            body: "secret internals".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.public_message(), "External service error");
    }
}
