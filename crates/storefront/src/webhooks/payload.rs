//! Notification payload normalization.
//!
//! The provider has shipped several notification shapes over the years
//! (topic feeds, IPN, the current webhooks). Rather than probing optional
//! fields inline, each shape gets its own extraction function and the result
//! is a tagged [`PaymentRef`] naming which shape matched. Precedence is
//! fixed and documented: `data.id`, `resource.id`, `resource` path string,
//! top-level `id`, query parameter.

use std::collections::HashMap;

use serde_json::Value;

/// Path segment that marks a payment resource URL.
const PAYMENTS_SEGMENT: &str = "payments";

/// A payment identifier, tagged with the payload shape it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentRef {
    /// `{"data": {"id": ...}}` (current webhook shape).
    DataId(String),
    /// `{"resource": {"id": ...}}` (object-form IPN).
    ResourceId(String),
    /// `{"resource": "https://.../v1/payments/123"}` (URL-form IPN).
    ResourcePath(String),
    /// `{"id": ...}` at the top level.
    TopLevel(String),
    /// `?data.id=...` or `?id=...` query parameter.
    Query(String),
}

impl PaymentRef {
    /// The extracted payment id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::DataId(id)
            | Self::ResourceId(id)
            | Self::ResourcePath(id)
            | Self::TopLevel(id)
            | Self::Query(id) => id,
        }
    }

    /// The name of the payload shape that matched, for the logs.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::DataId(_) => "data.id",
            Self::ResourceId(_) => "resource.id",
            Self::ResourcePath(_) => "resource path",
            Self::TopLevel(_) => "top-level id",
            Self::Query(_) => "query parameter",
        }
    }
}

/// Render a JSON id value (string or number) as a string.
fn id_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn from_data_id(body: &Value) -> Option<PaymentRef> {
    id_value_to_string(body.get("data")?.get("id")?).map(PaymentRef::DataId)
}

fn from_resource_id(body: &Value) -> Option<PaymentRef> {
    id_value_to_string(body.get("resource")?.get("id")?).map(PaymentRef::ResourceId)
}

fn from_resource_path(body: &Value) -> Option<PaymentRef> {
    let path = body.get("resource")?.as_str()?;
    if !path.contains(PAYMENTS_SEGMENT) {
        return None;
    }
    let trailing = path.trim_end_matches('/').rsplit('/').next()?;
    if trailing.is_empty() || !trailing.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(PaymentRef::ResourcePath(trailing.to_owned()))
}

fn from_top_level(body: &Value) -> Option<PaymentRef> {
    id_value_to_string(body.get("id")?).map(PaymentRef::TopLevel)
}

fn from_query(query: &HashMap<String, String>) -> Option<PaymentRef> {
    query
        .get("data.id")
        .or_else(|| query.get("id"))
        .filter(|id| !id.is_empty())
        .map(|id| PaymentRef::Query(id.clone()))
}

/// Extract a payment reference, first matching shape wins.
#[must_use]
pub fn extract_payment_ref(
    body: Option<&Value>,
    query: &HashMap<String, String>,
) -> Option<PaymentRef> {
    if let Some(body) = body {
        if let Some(found) = from_data_id(body) {
            return Some(found);
        }
        if let Some(found) = from_resource_id(body) {
            return Some(found);
        }
        if let Some(found) = from_resource_path(body) {
            return Some(found);
        }
        if let Some(found) = from_top_level(body) {
            return Some(found);
        }
    }
    from_query(query)
}

/// Determine the event type from body fields (`type`, `topic`, `action`) or
/// query parameters; `"unknown"` when nothing matches.
#[must_use]
pub fn extract_event_type(body: Option<&Value>, query: &HashMap<String, String>) -> String {
    if let Some(body) = body {
        for field in ["type", "topic", "action"] {
            if let Some(value) = body.get(field).and_then(Value::as_str)
                && !value.is_empty()
            {
                return value.to_owned();
            }
        }
    }
    for field in ["type", "topic"] {
        if let Some(value) = query.get(field)
            && !value.is_empty()
        {
            return value.clone();
        }
    }
    "unknown".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn no_query() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_extract_data_id() {
        let body = json!({"type": "payment", "data": {"id": "12345"}});
        let found = extract_payment_ref(Some(&body), &no_query()).unwrap();
        assert_eq!(found, PaymentRef::DataId("12345".to_owned()));
        assert_eq!(found.id(), "12345");
        assert_eq!(found.shape(), "data.id");
    }

    #[test]
    fn test_extract_data_id_numeric() {
        let body = json!({"data": {"id": 98765}});
        let found = extract_payment_ref(Some(&body), &no_query()).unwrap();
        assert_eq!(found.id(), "98765");
    }

    #[test]
    fn test_extract_resource_id() {
        let body = json!({"topic": "payment", "resource": {"id": 555}});
        let found = extract_payment_ref(Some(&body), &no_query()).unwrap();
        assert_eq!(found, PaymentRef::ResourceId("555".to_owned()));
    }

    #[test]
    fn test_extract_resource_path() {
        let body = json!({"topic": "payment", "resource": "https://api.example.com/v1/payments/777"});
        let found = extract_payment_ref(Some(&body), &no_query()).unwrap();
        assert_eq!(found, PaymentRef::ResourcePath("777".to_owned()));
    }

    #[test]
    fn test_resource_path_requires_payments_segment_and_numeric_tail() {
        let body = json!({"resource": "https://api.example.com/v1/merchant_orders/777"});
        assert!(extract_payment_ref(Some(&body), &no_query()).is_none());

        let body = json!({"resource": "https://api.example.com/v1/payments/abc"});
        assert!(extract_payment_ref(Some(&body), &no_query()).is_none());
    }

    #[test]
    fn test_extract_top_level_id() {
        let body = json!({"id": "42", "live_mode": true});
        let found = extract_payment_ref(Some(&body), &no_query()).unwrap();
        assert_eq!(found, PaymentRef::TopLevel("42".to_owned()));
    }

    #[test]
    fn test_extract_query_id() {
        let mut query = HashMap::new();
        query.insert("data.id".to_owned(), "999".to_owned());
        let found = extract_payment_ref(None, &query).unwrap();
        assert_eq!(found, PaymentRef::Query("999".to_owned()));

        let mut query = HashMap::new();
        query.insert("id".to_owned(), "888".to_owned());
        let found = extract_payment_ref(None, &query).unwrap();
        assert_eq!(found.id(), "888");
    }

    #[test]
    fn test_precedence_data_id_wins() {
        let body = json!({
            "data": {"id": "1"},
            "resource": {"id": "2"},
            "id": "3"
        });
        let mut query = HashMap::new();
        query.insert("id".to_owned(), "4".to_owned());
        let found = extract_payment_ref(Some(&body), &query).unwrap();
        assert_eq!(found, PaymentRef::DataId("1".to_owned()));
    }

    #[test]
    fn test_precedence_resource_before_top_level() {
        let body = json!({"resource": {"id": "2"}, "id": "3"});
        let found = extract_payment_ref(Some(&body), &no_query()).unwrap();
        assert_eq!(found, PaymentRef::ResourceId("2".to_owned()));
    }

    #[test]
    fn test_no_id_anywhere() {
        let body = json!({"type": "test"});
        assert!(extract_payment_ref(Some(&body), &no_query()).is_none());
        assert!(extract_payment_ref(None, &no_query()).is_none());
    }

    #[test]
    fn test_event_type_from_body_fields() {
        let query = no_query();
        assert_eq!(
            extract_event_type(Some(&json!({"type": "payment"})), &query),
            "payment"
        );
        assert_eq!(
            extract_event_type(Some(&json!({"topic": "merchant_order"})), &query),
            "merchant_order"
        );
        assert_eq!(
            extract_event_type(Some(&json!({"action": "payment.updated"})), &query),
            "payment.updated"
        );
    }

    #[test]
    fn test_event_type_from_query_and_default() {
        let mut query = HashMap::new();
        query.insert("topic".to_owned(), "payment".to_owned());
        assert_eq!(extract_event_type(None, &query), "payment");

        assert_eq!(extract_event_type(None, &no_query()), "unknown");
        assert_eq!(extract_event_type(Some(&json!({})), &no_query()), "unknown");
    }
}
