//! Checkout orchestration.
//!
//! The browser submits its cart and customer data; nothing in that payload
//! is trusted. Every product is re-fetched by document id, the claims are
//! checked against the authoritative records, prices and the total are
//! recomputed server-side, and only then is an order persisted and a payment
//! preference created. Any mismatch aborts the whole checkout - no partial
//! orders, no silently dropped items.

use axum::http::StatusCode;
use futures::future::join_all;
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tienda_cms::{CmsError, NewOrder};
use tienda_core::{Customer, CustomerError, ORDER_TOKEN_PREFIX, OrderLine, Product, normalize_size_code};
use tracing::instrument;

use crate::mercadopago::{
    BackUrls, Identification, MercadoPagoError, PreferenceItem, PreferencePayer, PreferenceRequest,
};
use crate::state::AppState;

/// Currency every preference is denominated in.
const CURRENCY: &str = "ARS";

/// Length of the random tail of an order token.
const ORDER_TOKEN_TAIL_LEN: usize = 10;

/// One client-claimed cart line.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemInput {
    pub product_id: i64,
    pub document_id: String,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u32,
}

/// Client-submitted customer fields, validated into a [`Customer`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCustomerInput {
    pub name: String,
    pub last_name: String,
    pub dni: String,
    pub email: String,
}

/// The checkout request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItemInput>,
    pub customer: CheckoutCustomerInput,
}

/// The checkout response: what the browser needs to render the payment
/// widget and track its order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub preference_id: String,
    pub order_id: String,
}

/// Errors from the checkout orchestrator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("item {document_id}: quantity must be at least 1")]
    InvalidQuantity { document_id: String },

    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// The cart disagreed with the authoritative product records. The full
    /// mismatch set is logged; the client only gets this generic message.
    #[error("cart validation failed")]
    ValidationFailed,

    #[error("payment provider is not configured")]
    PaymentUnavailable,

    #[error(transparent)]
    Cms(#[from] CmsError),

    #[error(transparent)]
    Payment(#[from] MercadoPagoError),
}

impl CheckoutError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::EmptyCart
            | Self::InvalidQuantity { .. }
            | Self::Customer(_)
            | Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::PaymentUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            // Rejected before the wire; the provider was never involved.
            Self::Payment(MercadoPagoError::Invalid(_)) => StatusCode::BAD_REQUEST,
            Self::Cms(_) | Self::Payment(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub(crate) fn public_message(&self) -> String {
        match self {
            Self::Cms(_) => "External service error".to_string(),
            Self::Payment(MercadoPagoError::Invalid(err)) => err.to_string(),
            Self::Payment(_) => "Payment provider error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Why a claimed cart line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchReason {
    /// No product carries the claimed document id (or its fetch failed).
    NotFound,
    /// The record's numeric id differs from the claim.
    IdMismatch { claimed: i64, actual: i64 },
    /// The record's document id differs from the claim.
    DocumentIdMismatch { actual: String },
    /// The requested size is not in the product's size list.
    SizeUnavailable { requested: String },
}

/// One rejected cart line, for the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMismatch {
    pub document_id: String,
    pub reason: MismatchReason,
}

/// A cart line that survived validation, paired with its authoritative
/// product record.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedItem {
    pub product: Product,
    pub size: Option<String>,
    pub quantity: u32,
}

/// Check every claimed line against its fetched record.
///
/// All violations across all lines are collected; a single bad line fails
/// the whole set.
pub(crate) fn validate_items(
    claims: &[CheckoutItemInput],
    fetched: Vec<Option<Product>>,
) -> Result<Vec<ValidatedItem>, Vec<ItemMismatch>> {
    let mut valid = Vec::with_capacity(claims.len());
    let mut mismatches = Vec::new();

    for (claim, product) in claims.iter().zip(fetched) {
        let Some(product) = product else {
            mismatches.push(ItemMismatch {
                document_id: claim.document_id.clone(),
                reason: MismatchReason::NotFound,
            });
            continue;
        };

        let mut ok = true;
        if product.id.as_i64() != claim.product_id {
            mismatches.push(ItemMismatch {
                document_id: claim.document_id.clone(),
                reason: MismatchReason::IdMismatch {
                    claimed: claim.product_id,
                    actual: product.id.as_i64(),
                },
            });
            ok = false;
        }
        if product.document_id.as_str() != claim.document_id {
            mismatches.push(ItemMismatch {
                document_id: claim.document_id.clone(),
                reason: MismatchReason::DocumentIdMismatch {
                    actual: product.document_id.as_str().to_owned(),
                },
            });
            ok = false;
        }
        if let Some(size) = &claim.size
            && !product.has_size(size)
        {
            mismatches.push(ItemMismatch {
                document_id: claim.document_id.clone(),
                reason: MismatchReason::SizeUnavailable {
                    requested: size.clone(),
                },
            });
            ok = false;
        }

        if ok {
            valid.push(ValidatedItem {
                size: claim.size.as_deref().map(normalize_size_code),
                quantity: claim.quantity,
                product,
            });
        }
    }

    if mismatches.is_empty() {
        Ok(valid)
    } else {
        Err(mismatches)
    }
}

/// Build the provider item list from validated lines. Prices come from the
/// authoritative records, never the client.
pub(crate) fn preference_items(valid: &[ValidatedItem]) -> Vec<PreferenceItem> {
    valid
        .iter()
        .map(|item| PreferenceItem {
            id: item.product.document_id.as_str().to_owned(),
            title: item.product.name.clone(),
            quantity: item.quantity,
            unit_price: item.product.unit_price(),
            currency_id: CURRENCY.to_owned(),
        })
        .collect()
}

/// The authoritative order total.
pub(crate) fn order_total(valid: &[ValidatedItem]) -> Decimal {
    valid
        .iter()
        .map(|item| item.product.unit_price() * Decimal::from(item.quantity))
        .sum()
}

/// Generate a fresh order token: the fixed prefix plus a random uppercase
/// alphanumeric tail.
pub(crate) fn generate_order_token() -> String {
    let tail: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(ORDER_TOKEN_TAIL_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("{ORDER_TOKEN_PREFIX}{tail}")
}

/// Run the whole checkout: validate, persist the order, create the payment
/// preference.
///
/// # Errors
///
/// Fails fast on bad input before anything is persisted; mismatches abort
/// with [`CheckoutError::ValidationFailed`]; upstream failures carry their
/// status and body.
#[instrument(skip(state, request), fields(item_count = request.items.len()))]
pub async fn process_checkout(
    state: &AppState,
    request: CheckoutRequest,
) -> Result<CheckoutResponse, CheckoutError> {
    // 1. Fail fast on bad input - nothing is persisted past this block.
    if request.items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    for item in &request.items {
        if item.quantity == 0 {
            return Err(CheckoutError::InvalidQuantity {
                document_id: item.document_id.clone(),
            });
        }
    }
    let customer = Customer::parse(
        &request.customer.name,
        &request.customer.last_name,
        &request.customer.dni,
        &request.customer.email,
    )?;
    let Some(mercadopago) = state.mercadopago() else {
        return Err(CheckoutError::PaymentUnavailable);
    };

    // 2. Re-fetch every product by document id, concurrently. A failed
    //    fetch counts as not-found for that item, not a hard stop yet.
    let fetches = join_all(
        request
            .items
            .iter()
            .map(|item| state.cms().get_product_by_document_id(&item.document_id)),
    )
    .await;
    let fetched: Vec<Option<Product>> = fetches
        .into_iter()
        .map(|result| match result {
            Ok(product) => Some(product),
            Err(err) => {
                tracing::debug!(error = %err, "product fetch failed during checkout");
                None
            }
        })
        .collect();

    // 3. Validate the claims; any violation aborts the whole operation.
    let valid = match validate_items(&request.items, fetched) {
        Ok(valid) => valid,
        Err(mismatches) => {
            tracing::error!(
                mismatch_count = mismatches.len(),
                ?mismatches,
                "cart validation failed"
            );
            return Err(CheckoutError::ValidationFailed);
        }
    };

    // 4. Server-trusted prices and total.
    let items = preference_items(&valid);
    let total = order_total(&valid);

    // 5. Persist the order, unconfirmed.
    let token = generate_order_token();
    let lines: Vec<OrderLine> = valid
        .iter()
        .map(|item| OrderLine {
            product_id: item.product.id,
            document_id: item.product.document_id.clone(),
            name: item.product.name.clone(),
            unit_price: item.product.unit_price(),
            quantity: item.quantity,
            size: item.size.clone(),
        })
        .collect();
    state
        .cms()
        .create_order(&NewOrder {
            order: token.clone(),
            name: customer.name.clone(),
            last_name: customer.last_name.clone(),
            dni: customer.dni.as_i64(),
            email: customer.email.as_str().to_owned(),
            products: lines,
            total,
        })
        .await?;

    // 6. Create the payment preference, correlated by the order token.
    let preference_request = PreferenceRequest {
        items,
        payer: Some(PreferencePayer {
            email: Some(customer.email.as_str().to_owned()),
            identification: Identification {
                kind: "DNI".to_owned(),
                number: customer.dni.to_string(),
            },
        }),
        back_urls: BackUrls::for_origin(&state.config().site_url),
        notification_url: state.config().webhook_notification_url(),
        external_reference: token.clone(),
    };
    let preference = mercadopago.create_preference(&preference_request).await?;

    tracing::info!(order = %token, preference = %preference.id, "checkout completed");

    // 7. Hand the widget id and the order token back to the browser.
    Ok(CheckoutResponse {
        preference_id: preference.id,
        order_id: token,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tienda_core::{DocumentId, ProductId, SizeId, SizeVariant};

    use super::*;

    fn claim(product_id: i64, document_id: &str, size: Option<&str>, quantity: u32) -> CheckoutItemInput {
        CheckoutItemInput {
            product_id,
            document_id: document_id.to_owned(),
            size: size.map(String::from),
            quantity,
        }
    }

    fn product(id: i64, document_id: &str, price: i64, sizes: &[&str]) -> Product {
        Product {
            id: ProductId::new(id),
            document_id: DocumentId::new(document_id),
            name: format!("Producto {id}"),
            price: Decimal::new(price, 0),
            offer: false,
            offer_price: None,
            stock: 10,
            show: true,
            sizes: sizes
                .iter()
                .enumerate()
                .map(|(i, code)| SizeVariant {
                    id: SizeId::new(i64::try_from(i).unwrap() + 1),
                    document_id: DocumentId::new(format!("s{i}")),
                    code: (*code).to_owned(),
                })
                .collect(),
            categories: vec![],
            media: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_validate_items_happy_path() {
        let claims = vec![
            claim(1, "doc1", Some("M"), 2),
            claim(2, "doc2", None, 1),
        ];
        let fetched = vec![
            Some(product(1, "doc1", 1500, &["S", "M"])),
            Some(product(2, "doc2", 2000, &[])),
        ];
        let valid = validate_items(&claims, fetched).unwrap();
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].size.as_deref(), Some("M"));
        assert!(valid[1].size.is_none());
    }

    #[test]
    fn test_validate_items_not_found() {
        let claims = vec![claim(1, "doc1", None, 1)];
        let err = validate_items(&claims, vec![None]).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].reason, MismatchReason::NotFound);
        assert_eq!(err[0].document_id, "doc1");
    }

    #[test]
    fn test_validate_items_id_mismatch_fails_whole_set() {
        let claims = vec![
            claim(1, "doc1", None, 1),
            claim(99, "doc2", None, 1),
        ];
        let fetched = vec![
            Some(product(1, "doc1", 1500, &[])),
            Some(product(2, "doc2", 2000, &[])),
        ];
        let err = validate_items(&claims, fetched).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(
            err[0].reason,
            MismatchReason::IdMismatch {
                claimed: 99,
                actual: 2
            }
        );
    }

    #[test]
    fn test_validate_items_document_id_mismatch() {
        let claims = vec![claim(1, "doc1", None, 1)];
        let fetched = vec![Some(product(1, "other-doc", 1500, &[]))];
        let err = validate_items(&claims, fetched).unwrap_err();
        assert_eq!(
            err[0].reason,
            MismatchReason::DocumentIdMismatch {
                actual: "other-doc".to_owned()
            }
        );
    }

    #[test]
    fn test_validate_items_size_unavailable() {
        let claims = vec![claim(1, "doc1", Some("XL"), 1)];
        let fetched = vec![Some(product(1, "doc1", 1500, &["S", "M"]))];
        let err = validate_items(&claims, fetched).unwrap_err();
        assert_eq!(
            err[0].reason,
            MismatchReason::SizeUnavailable {
                requested: "XL".to_owned()
            }
        );

        // A size claim against a product with no sizes is also a mismatch.
        let claims = vec![claim(1, "doc1", Some("M"), 1)];
        let fetched = vec![Some(product(1, "doc1", 1500, &[]))];
        assert!(validate_items(&claims, fetched).is_err());
    }

    #[test]
    fn test_validate_items_collects_all_mismatches() {
        let claims = vec![claim(9, "doc1", Some("XL"), 1)];
        let fetched = vec![Some(product(1, "doc1", 1500, &["M"]))];
        let err = validate_items(&claims, fetched).unwrap_err();
        // Both the id and the size violations are reported for the line.
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn test_preference_items_use_authoritative_prices() {
        let mut offered = product(1, "doc1", 1500, &["M"]);
        offered.offer = true;
        offered.offer_price = Some(Decimal::new(1200, 0));
        let valid = vec![
            ValidatedItem {
                product: offered,
                size: Some("M".to_owned()),
                quantity: 2,
            },
            ValidatedItem {
                product: product(2, "doc2", 2000, &[]),
                size: None,
                quantity: 1,
            },
        ];

        let items = preference_items(&valid);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].unit_price, Decimal::new(1200, 0));
        assert_eq!(items[1].unit_price, Decimal::new(2000, 0));
        assert_eq!(items[0].currency_id, "ARS");

        assert_eq!(order_total(&valid), Decimal::new(4400, 0));
    }

    #[test]
    fn test_generate_order_token_format() {
        let token = generate_order_token();
        assert!(token.starts_with(ORDER_TOKEN_PREFIX));
        let tail = &token[ORDER_TOKEN_PREFIX.len()..];
        assert_eq!(tail.len(), ORDER_TOKEN_TAIL_LEN);
        assert!(tail.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert_ne!(generate_order_token(), generate_order_token());
    }
}
