//! Wire types for the preference and payment endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures for a preference request.
///
/// The schema is strict on purpose: the preference endpoint is the last stop
/// before money amounts leave the system.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreferenceValidationError {
    #[error("preference must contain at least one item")]
    EmptyItems,
    #[error("item {index}: id must not be empty")]
    EmptyId { index: usize },
    #[error("item {index}: title must not be empty")]
    EmptyTitle { index: usize },
    #[error("item {index}: quantity must be at least 1")]
    ZeroQuantity { index: usize },
    #[error("item {index}: unit price must be positive")]
    NonPositivePrice { index: usize },
    #[error("item {index}: currency must be a 3-letter uppercase code")]
    BadCurrency { index: usize },
}

/// An item on a payment preference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub currency_id: String,
}

impl PreferenceItem {
    fn validate(&self, index: usize) -> Result<(), PreferenceValidationError> {
        if self.id.trim().is_empty() {
            return Err(PreferenceValidationError::EmptyId { index });
        }
        if self.title.trim().is_empty() {
            return Err(PreferenceValidationError::EmptyTitle { index });
        }
        if self.quantity == 0 {
            return Err(PreferenceValidationError::ZeroQuantity { index });
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(PreferenceValidationError::NonPositivePrice { index });
        }
        if self.currency_id.len() != 3
            || !self.currency_id.bytes().all(|b| b.is_ascii_uppercase())
        {
            return Err(PreferenceValidationError::BadCurrency { index });
        }
        Ok(())
    }
}

/// Payer identification (DNI for this market).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identification {
    #[serde(rename = "type")]
    pub kind: String,
    pub number: String,
}

/// Preference payer data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferencePayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub identification: Identification,
}

/// Redirect targets after the hosted checkout finishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

impl BackUrls {
    /// The static result pages under the given site origin.
    #[must_use]
    pub fn for_origin(site_url: &str) -> Self {
        Self {
            success: format!("{site_url}/checkout/success"),
            failure: format!("{site_url}/checkout/failure"),
            pending: format!("{site_url}/checkout/pending"),
        }
    }
}

/// A preference-creation request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<PreferencePayer>,
    pub back_urls: BackUrls,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_url: Option<String>,
    /// Correlation token echoed back in webhook payloads.
    pub external_reference: String,
}

impl PreferenceRequest {
    /// Validate the strict item schema.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), PreferenceValidationError> {
        if self.items.is_empty() {
            return Err(PreferenceValidationError::EmptyItems);
        }
        for (index, item) in self.items.iter().enumerate() {
            item.validate(index)?;
        }
        Ok(())
    }
}

/// A created preference. The id is what the browser widget needs; the init
/// points are the hosted-checkout URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceResponse {
    pub id: String,
    #[serde(default)]
    pub init_point: Option<String>,
    #[serde(default)]
    pub sandbox_init_point: Option<String>,
}

/// A payment fetched from `GET /v1/payments/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub id: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_detail: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub payer: Option<PaymentPayer>,
}

/// Payer block on a fetched payment.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentPayer {
    #[serde(default)]
    pub email: Option<String>,
}

impl Payment {
    /// Whether the provider considers this payment approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status.as_deref() == Some("approved")
    }
}
