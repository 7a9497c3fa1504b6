//! Payment-notification processing.
//!
//! The webhook endpoint never fails outward: whatever happens inside, the
//! provider gets a 200 so it does not retry-storm legitimate notifications.
//! To keep that guarantee testable, everything up to the first side effect
//! is a pure decision: [`evaluate_notification`] turns the raw request into
//! a [`NotificationDecision`], and only a `Process` decision lets the
//! handler touch the payment API.

pub mod payload;
pub mod signature;

use std::collections::HashMap;

pub use payload::{PaymentRef, extract_event_type, extract_payment_ref};
pub use signature::{signature_header, verify_signature};

use serde_json::Value;

/// What the handler should do with a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationDecision {
    /// Signature verification failed; acknowledge with a skip marker and do
    /// not process.
    Skipped { reason: &'static str },
    /// Nothing actionable (no payment id, or not a payment event);
    /// acknowledge only.
    Acknowledged { event: String },
    /// A payment event with an id: fetch and reconcile.
    Process {
        event: String,
        payment_ref: PaymentRef,
    },
}

/// Classify a raw notification.
///
/// - `secret`/`signature`: when a secret is configured, a missing or wrong
///   signature short-circuits to `Skipped`.
/// - `raw_body`: parsed tolerantly; an unparseable body falls back to the
///   query parameters alone.
/// - The event must textually look like a payment event (`payment` in the
///   type) and carry an id for `Process`.
#[must_use]
pub fn evaluate_notification(
    secret: Option<&str>,
    signature: Option<&str>,
    raw_body: &[u8],
    query: &HashMap<String, String>,
) -> NotificationDecision {
    if let Some(secret) = secret {
        let Some(signature) = signature else {
            return NotificationDecision::Skipped {
                reason: "missing signature",
            };
        };
        if !verify_signature(secret, signature, raw_body) {
            return NotificationDecision::Skipped {
                reason: "invalid signature",
            };
        }
    }

    let body: Option<Value> = serde_json::from_slice(raw_body).ok();
    let event = extract_event_type(body.as_ref(), query);
    let payment_ref = extract_payment_ref(body.as_ref(), query);

    match payment_ref {
        Some(payment_ref) if event.contains("payment") => NotificationDecision::Process {
            event,
            payment_ref,
        },
        _ => NotificationDecision::Acknowledged { event },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    use super::*;

    const SECRET: &str = "whk_test123secret456";

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    fn no_query() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_wrong_signature_is_skipped_not_processed() {
        let body = br#"{"type":"payment","data":{"id":"123"}}"#;
        let decision =
            evaluate_notification(Some(SECRET), Some("sha256=deadbeef"), body, &no_query());
        assert_eq!(
            decision,
            NotificationDecision::Skipped {
                reason: "invalid signature"
            }
        );
    }

    #[test]
    fn test_missing_signature_with_secret_is_skipped() {
        let body = br#"{"type":"payment","data":{"id":"123"}}"#;
        let decision = evaluate_notification(Some(SECRET), None, body, &no_query());
        assert_eq!(
            decision,
            NotificationDecision::Skipped {
                reason: "missing signature"
            }
        );
    }

    #[test]
    fn test_correct_signature_processes_payment_event() {
        let body = br#"{"type":"payment","data":{"id":"123"}}"#;
        let signature = sign(SECRET, body);
        let decision = evaluate_notification(Some(SECRET), Some(&signature), body, &no_query());
        assert_eq!(
            decision,
            NotificationDecision::Process {
                event: "payment".to_owned(),
                payment_ref: PaymentRef::DataId("123".to_owned()),
            }
        );
    }

    #[test]
    fn test_no_secret_skips_verification() {
        let body = br#"{"type":"payment","data":{"id":"123"}}"#;
        let decision = evaluate_notification(None, None, body, &no_query());
        assert!(matches!(decision, NotificationDecision::Process { .. }));
    }

    #[test]
    fn test_non_payment_event_is_acknowledged_only() {
        let body = br#"{"type":"test","data":{"id":"123"}}"#;
        let decision = evaluate_notification(None, None, body, &no_query());
        assert_eq!(
            decision,
            NotificationDecision::Acknowledged {
                event: "test".to_owned()
            }
        );
    }

    #[test]
    fn test_payment_event_without_id_is_acknowledged_only() {
        let body = br#"{"type":"payment"}"#;
        let decision = evaluate_notification(None, None, body, &no_query());
        assert_eq!(
            decision,
            NotificationDecision::Acknowledged {
                event: "payment".to_owned()
            }
        );
    }

    #[test]
    fn test_unparseable_body_falls_back_to_query() {
        let mut query = HashMap::new();
        query.insert("topic".to_owned(), "payment".to_owned());
        query.insert("id".to_owned(), "456".to_owned());
        let decision = evaluate_notification(None, None, b"not json {{", &query);
        assert_eq!(
            decision,
            NotificationDecision::Process {
                event: "payment".to_owned(),
                payment_ref: PaymentRef::Query("456".to_owned()),
            }
        );
    }

    #[test]
    fn test_empty_body_and_query_defaults_to_unknown() {
        let decision = evaluate_notification(None, None, b"", &no_query());
        assert_eq!(
            decision,
            NotificationDecision::Acknowledged {
                event: "unknown".to_owned()
            }
        );
    }

    #[test]
    fn test_action_field_counts_as_payment_event() {
        let body = br#"{"action":"payment.updated","data":{"id":"9"}}"#;
        let decision = evaluate_notification(None, None, body, &no_query());
        assert_eq!(
            decision,
            NotificationDecision::Process {
                event: "payment.updated".to_owned(),
                payment_ref: PaymentRef::DataId("9".to_owned()),
            }
        );
    }
}
