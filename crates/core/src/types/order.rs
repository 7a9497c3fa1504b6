//! Order and point-of-sale records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{DocumentId, OrderId, ProductId, SaleId};

/// Prefix of every generated order identifier (the human-shareable token
/// used as the payment provider's external reference).
pub const ORDER_TOKEN_PREFIX: &str = "ORD-";

/// A line item on an order, with the server-derived unit price frozen at
/// order-creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub document_id: DocumentId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
}

/// A customer order.
///
/// Created once per checkout attempt with `order_payment = false`; mutated
/// once by the webhook path to set the confirmation fields. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub document_id: DocumentId,
    /// Unique correlation token (`ORD-` + random tail).
    pub order: String,
    pub name: String,
    pub last_name: String,
    pub dni: i64,
    pub email: String,
    #[serde(default, deserialize_with = "super::product::null_as_default")]
    pub products: Vec<OrderLine>,
    pub total: Decimal,
    #[serde(default)]
    pub order_payment: bool,
    #[serde(default)]
    pub payer_email: Option<String>,
    #[serde(default)]
    pub mp_payment_id: Option<String>,
    #[serde(default)]
    pub mp_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A point-of-sale transaction. Created once, immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub document_id: DocumentId,
    pub name: String,
    pub sale_price: Decimal,
    pub sale_date: DateTime<Utc>,
}
