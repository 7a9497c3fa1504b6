//! Webhook signature verification.
//!
//! The provider signs the raw request body with HMAC-SHA256. The header
//! value may be either `sha256=<hex>` or bare hex; comparison happens in
//! constant time via `Mac::verify_slice`.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header names carrying the signature, in lookup order.
const SIGNATURE_HEADERS: [&str; 2] = ["x-signature", "x-hub-signature-256"];

/// Pull the signature header value out of the request, if any.
#[must_use]
pub fn signature_header(headers: &HeaderMap) -> Option<&str> {
    SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
}

/// Verify an HMAC-SHA256 signature over the raw body.
///
/// Accepts both the `sha256=<hex>` prefixed form and bare hex. Any decode
/// failure counts as a failed verification, never a panic.
#[must_use]
pub fn verify_signature(secret: &str, header_value: &str, body: &[u8]) -> bool {
    let hex_part = header_value
        .strip_prefix("sha256=")
        .unwrap_or(header_value)
        .trim();

    let Ok(expected) = hex::decode(hex_part) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
