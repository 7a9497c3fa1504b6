//! MercadoPago REST API client.
//!
//! Two endpoints are consumed: `POST /checkout/preferences` (create a
//! payment preference) and `GET /v1/payments/{id}` (fetch payment status).
//! Both are bearer-token authenticated with the server access token.

mod types;

pub use types::{
    BackUrls, Identification, Payment, PreferenceItem, PreferencePayer, PreferenceRequest,
    PreferenceResponse, PreferenceValidationError,
};

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

/// Production API base URL.
const BASE_URL: &str = "https://api.mercadopago.com";

/// Errors that can occur when interacting with the MercadoPago API.
#[derive(Debug, Error)]
pub enum MercadoPagoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-2xx response. Status and body are preserved for
    /// diagnosis.
    #[error("MercadoPago API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Response body did not parse.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A preference request failed validation before being sent.
    #[error(transparent)]
    Invalid(#[from] PreferenceValidationError),

    /// The client could not be constructed.
    #[error("client configuration error: {0}")]
    Config(String),
}

/// Client for the MercadoPago REST API.
#[derive(Clone)]
pub struct MercadoPagoClient {
    inner: Arc<MercadoPagoClientInner>,
}

struct MercadoPagoClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl MercadoPagoClient {
    /// Create a new client authenticated with the given access token.
    ///
    /// # Errors
    ///
    /// Returns [`MercadoPagoError::Config`] if the token cannot be encoded
    /// as a header value or the HTTP client fails to build.
    pub fn new(access_token: &SecretString) -> Result<Self, MercadoPagoError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", access_token.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| MercadoPagoError::Config(format!("invalid access token: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(MercadoPagoClientInner {
                client,
                base_url: BASE_URL.to_owned(),
            }),
        })
    }

    /// Create a payment preference.
    ///
    /// The request is validated before it goes on the wire.
    ///
    /// # Errors
    ///
    /// Returns validation errors without touching the network, and
    /// [`MercadoPagoError::Api`] with the upstream status and body for
    /// rejected requests.
    #[instrument(skip(self, request), fields(external_reference = %request.external_reference))]
    pub async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<PreferenceResponse, MercadoPagoError> {
        request.validate()?;

        let url = format!("{}/checkout/preferences", self.inner.base_url);
        let response = self.inner.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MercadoPagoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch a payment by id.
    ///
    /// # Errors
    ///
    /// Returns [`MercadoPagoError::Api`] for unknown payments or auth
    /// failures.
    #[instrument(skip(self))]
    pub async fn get_payment(&self, payment_id: &str) -> Result<Payment, MercadoPagoError> {
        let url = format!("{}/v1/payments/{payment_id}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MercadoPagoError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
