//! Administrator session endpoints (`/admin/login`, `/admin/users/me`).
//!
//! These live on the CMS admin surface, not the content API, and carry the
//! administrator's own bearer token rather than the server API token.

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::CmsError;
use crate::client::ContentClient;

/// A freshly issued administrator session token.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminToken {
    pub token: String,
    pub user: AdminUser,
}

/// The administrator behind a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminUser {
    pub id: i64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ContentClient {
    /// Exchange administrator credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Api`] with the upstream status for rejected
    /// credentials.
    #[instrument(skip(self, password))]
    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AdminToken, CmsError> {
        let request = self
            .raw()
            .post(self.url("/admin/login"))
            .json(&json!({ "email": email, "password": password }));
        let body = Self::execute(request).await?;
        let data = extract_data(body)?;
        Ok(serde_json::from_value(data)?)
    }

    /// Validate a session token against the "who am I" endpoint.
    ///
    /// Called on every admin-route request; there is deliberately no local
    /// session cache, so revocation on the CMS side takes effect
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Api`] for an expired or revoked token.
    #[instrument(skip(self, token))]
    pub async fn introspect_admin(&self, token: &str) -> Result<AdminUser, CmsError> {
        let request = self
            .raw()
            .get(self.url("/admin/users/me"))
            .header(AUTHORIZATION, format!("Bearer {token}"));
        let body = Self::execute(request).await?;
        let data = extract_data(body)?;
        Ok(serde_json::from_value(data)?)
    }
}

/// The admin surface wraps responses as `{ "data": ... }` without the
/// content-API record envelope.
fn extract_data(body: Value) -> Result<Value, CmsError> {
    let Value::Object(mut map) = body else {
        return Err(CmsError::Shape("admin response is not an object".to_owned()));
    };
    map.remove("data")
        .filter(|d| !d.is_null())
        .ok_or_else(|| CmsError::Shape("admin response has no data".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_admin_token_deserializes() {
        let data = extract_data(json!({
            "data": {
                "token": "jwt-value",
                "user": {"id": 1, "firstname": "Ana", "lastname": null, "email": "a@b.co"}
            }
        }))
        .unwrap();
        let token: AdminToken = serde_json::from_value(data).unwrap();
        assert_eq!(token.token, "jwt-value");
        assert_eq!(token.user.id, 1);
        assert_eq!(token.user.firstname.as_deref(), Some("Ana"));
        assert!(token.user.lastname.is_none());
    }

    #[test]
    fn test_extract_data_rejects_missing_or_null() {
        assert!(extract_data(json!({"data": null})).is_err());
        assert!(extract_data(json!({"error": {}})).is_err());
        assert!(extract_data(json!("nope")).is_err());
    }
}
