//! Order resource operations.
//!
//! Orders are created once per checkout attempt and mutated exactly once by
//! the payment-confirmation path. [`ContentClient::update_order_payment`]
//! tolerates a missing order because its caller is the webhook, which must
//! never fail outward.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tienda_core::{Order, OrderLine};
use tracing::instrument;

use crate::CmsError;
use crate::client::{ContentClient, Paginated, eq_filter, pagination, populate_all};
use crate::envelope::{normalize_list, normalize_single};
use crate::fallback::with_id_fallback;

const COLLECTION: &str = "/api/orders";
const RESOURCE: &str = "orders";

/// Payload for creating an order. The payment flag always starts false; it
/// is not part of this struct on purpose.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// The generated correlation token (`ORD-` + random tail).
    pub order: String,
    pub name: String,
    pub last_name: String,
    pub dni: i64,
    pub email: String,
    pub products: Vec<OrderLine>,
    pub total: Decimal,
}

/// Confirmation fields written by the payment-notification path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPaymentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp_payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp_status: Option<String>,
}

impl ContentClient {
    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: u32, page_size: u32) -> Result<Paginated<Order>, CmsError> {
        let mut query = vec![populate_all(), ("sort".to_owned(), "createdAt:desc".to_owned())];
        query.extend(pagination(page, page_size));
        let envelope = self.get_json(COLLECTION, &query).await?;
        let (records, pagination) = normalize_list(envelope)?;
        let items = records
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Order>, _>>()?;
        Ok(Paginated { items, pagination })
    }

    /// Create an order with `orderPayment = false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the payload.
    #[instrument(skip(self, new_order), fields(order = %new_order.order))]
    pub async fn create_order(&self, new_order: &NewOrder) -> Result<Order, CmsError> {
        let mut data = serde_json::to_value(new_order)?;
        if let Some(map) = data.as_object_mut() {
            map.insert("orderPayment".to_owned(), json!(false));
        }
        let envelope = self.post_json(COLLECTION, &json!({ "data": data })).await?;
        Ok(serde_json::from_value(normalize_single(envelope)?)?)
    }

    /// Find an order by its correlation token.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; an absent order is
    /// `Ok(None)`, not an error.
    #[instrument(skip(self))]
    pub async fn find_order_by_token(&self, token: &str) -> Result<Option<Order>, CmsError> {
        let mut query = vec![populate_all(), eq_filter("order", token)];
        query.extend(pagination(1, 1));
        let envelope = self.get_json(COLLECTION, &query).await?;
        let (mut records, _) = normalize_list(envelope)?;
        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(records.remove(0))?))
    }

    /// Mark the order with the given correlation token as paid, attaching
    /// the payer/payment fields.
    ///
    /// Returns `Ok(true)` when an order was updated and `Ok(false)` when no
    /// order carries the token (the record may not exist yet when the
    /// provider notifies early) - the absence is logged, never raised.
    ///
    /// # Errors
    ///
    /// Returns an error only for lookup/update failures other than the
    /// order being absent.
    #[instrument(skip(self, update))]
    pub async fn update_order_payment(
        &self,
        token: &str,
        update: &OrderPaymentUpdate,
    ) -> Result<bool, CmsError> {
        let Some(order) = self.find_order_by_token(token).await? else {
            tracing::warn!(token, "payment confirmation for unknown order token");
            return Ok(false);
        };

        let mut data = serde_json::to_value(update)?;
        if let Some(map) = data.as_object_mut() {
            map.insert("orderPayment".to_owned(), json!(true));
        }
        let body = json!({ "data": data });

        with_id_fallback(
            RESOURCE,
            order.document_id.as_str(),
            |id| {
                let body = body.clone();
                async move {
                    self.put_json(&format!("{COLLECTION}/{id}"), &body).await?;
                    Ok(())
                }
            },
            |doc| async move { self.resolve_numeric_id(COLLECTION, &doc).await },
        )
        .await?;

        tracing::info!(token, "order marked as paid");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_serializes_camel_case() {
        let new_order = NewOrder {
            order: "ORD-AB12CD34EF".to_owned(),
            name: "Ana".to_owned(),
            last_name: "García".to_owned(),
            dni: 30_123_456,
            email: "ana@example.com".to_owned(),
            products: vec![],
            total: Decimal::new(2500, 0),
        };
        let value = serde_json::to_value(&new_order).unwrap();
        assert_eq!(value["lastName"], "García");
        assert_eq!(value["order"], "ORD-AB12CD34EF");
        assert!(value.get("orderPayment").is_none());
    }

    #[test]
    fn test_payment_update_omits_unset_fields() {
        let update = OrderPaymentUpdate {
            mp_status: Some("approved".to_owned()),
            ..OrderPaymentUpdate::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({ "mpStatus": "approved" }));
    }
}
