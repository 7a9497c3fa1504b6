//! Checkout handler. All of the logic lives in [`crate::checkout`]; this is
//! the HTTP shim.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::checkout::{CheckoutRequest, CheckoutResponse, process_checkout};
use crate::error::Result;
use crate::state::AppState;

/// POST /api/checkout - validate the submitted cart, persist an order, and
/// create a payment preference.
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let response = process_checkout(&state, request).await?;
    Ok(Json(response))
}
