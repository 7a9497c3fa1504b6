//! Payment-notification endpoint.
//!
//! This is the one handler that never fails outward: every code path,
//! including signature rejection and internal errors, answers HTTP 200.
//! Errors are logged, and a failed signature check is acknowledged with a
//! `skipped` marker instead of a 4xx.

use std::collections::HashMap;

use axum::{Json, body::to_bytes, extract::Request, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tienda_cms::OrderPaymentUpdate;
use tracing::instrument;

use crate::mercadopago::Payment;
use crate::state::AppState;
use crate::webhooks::{NotificationDecision, evaluate_notification, signature_header};

/// Notification bodies are small; anything past this is not a payment
/// notification.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// GET/HEAD/OPTIONS - endpoint validation pings from the provider.
pub async fn probe() -> StatusCode {
    StatusCode::OK
}

/// POST /api/webhooks/mercadopago
#[instrument(skip(state, request))]
pub async fn receive(State(state): State<AppState>, request: Request) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let query = parse_query(parts.uri.query());
    let signature = signature_header(&parts.headers).map(str::to_owned);

    // Tolerate a failed body read: an empty body still gets acknowledged.
    let raw_body = to_bytes(body, MAX_BODY_BYTES).await.unwrap_or_default();

    let secret = state
        .config()
        .mercadopago
        .webhook_secret
        .as_ref()
        .map(|s| secrecy::ExposeSecret::expose_secret(s).to_owned());

    let decision =
        evaluate_notification(secret.as_deref(), signature.as_deref(), &raw_body, &query);

    match decision {
        NotificationDecision::Skipped { reason } => {
            tracing::warn!(reason, "webhook signature check failed, skipping");
            Json(json!({ "status": "skipped", "reason": reason }))
        }
        NotificationDecision::Acknowledged { event } => {
            tracing::info!(event, "webhook acknowledged without processing");
            Json(json!({ "status": "ok", "event": event }))
        }
        NotificationDecision::Process { event, payment_ref } => {
            tracing::info!(
                event,
                payment_id = payment_ref.id(),
                shape = payment_ref.shape(),
                "payment notification received"
            );
            reconcile_payment(&state, payment_ref.id()).await;
            Json(json!({ "status": "ok", "event": event, "payment_id": payment_ref.id() }))
        }
    }
}

/// Fetch the payment for observability and, when it is approved, mark the
/// correlated order as paid. Every failure here is logged and swallowed.
async fn reconcile_payment(state: &AppState, payment_id: &str) {
    let Some(mercadopago) = state.mercadopago() else {
        tracing::info!("payment credentials not configured, logging notification only");
        return;
    };

    let payment = match mercadopago.get_payment(payment_id).await {
        Ok(payment) => payment,
        Err(err) => {
            tracing::error!(error = %err, payment_id, "payment fetch failed");
            return;
        }
    };

    tracing::info!(
        payment_id = payment.id,
        status = ?payment.status,
        status_detail = ?payment.status_detail,
        external_reference = ?payment.external_reference,
        "payment details"
    );

    if payment.is_approved() {
        confirm_order(state, payment).await;
    }
}

/// Mark the order referenced by an approved payment as paid.
async fn confirm_order(state: &AppState, payment: Payment) {
    let Some(reference) = payment.external_reference.clone() else {
        tracing::warn!(
            payment_id = payment.id,
            "approved payment carries no external reference"
        );
        return;
    };

    let update = OrderPaymentUpdate {
        payer_email: payment.payer.and_then(|p| p.email),
        mp_payment_id: Some(payment.id.to_string()),
        mp_status: payment.status,
    };

    match state.cms().update_order_payment(&reference, &update).await {
        Ok(true) => {}
        Ok(false) => {
            // The order may not exist yet; the provider will not retry, so
            // this is logged for manual reconciliation.
            tracing::warn!(reference, "no order found for approved payment");
        }
        Err(err) => {
            tracing::error!(error = %err, reference, "failed to mark order as paid");
        }
    }
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}
