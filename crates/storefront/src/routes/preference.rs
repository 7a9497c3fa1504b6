//! Internal preference-creation endpoint.
//!
//! The checkout orchestrator builds preferences through the same types and
//! validation; this route is the standalone surface for clients that manage
//! their own order records. The schema is strict and the server access
//! token must be configured.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::mercadopago::{BackUrls, PreferenceItem, PreferencePayer, PreferenceRequest};
use crate::state::AppState;

/// Request body: items plus optional payer and the caller's correlation
/// reference. Back-urls and the notification URL are derived from server
/// configuration, never taken from the client.
#[derive(Debug, Deserialize)]
pub struct PreferenceCreateRequest {
    pub items: Vec<PreferenceItem>,
    #[serde(default)]
    pub payer: Option<PreferencePayer>,
    pub external_reference: String,
}

/// POST /api/payments/mp/preference
#[instrument(skip(state, request), fields(item_count = request.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<PreferenceCreateRequest>,
) -> Result<Json<Value>> {
    let Some(mercadopago) = state.mercadopago() else {
        return Err(AppError::Unavailable(
            "payment provider access token is not configured".to_string(),
        ));
    };

    let preference_request = PreferenceRequest {
        items: request.items,
        payer: request.payer,
        back_urls: BackUrls::for_origin(&state.config().site_url),
        notification_url: state.config().webhook_notification_url(),
        external_reference: request.external_reference,
    };
    // Validate before the wire so schema violations come back as 400s, not
    // provider errors.
    preference_request.validate()?;

    let preference = mercadopago.create_preference(&preference_request).await?;
    Ok(Json(json!({
        "id": preference.id,
        "init_point": preference.init_point,
    })))
}
