//! The HTTP transport shared by all resource operations.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::CmsError;
use crate::envelope::PageInfo;

/// A page of typed records plus the pagination metadata the API returned.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Option<PageInfo>,
}

/// Client for the content API.
///
/// Cheaply cloneable; all clones share one `reqwest` connection pool and the
/// bearer token installed as a default header.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ContentClientInner>,
}

struct ContentClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ContentClient {
    /// Create a new content-API client.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Config`] if the API token cannot be encoded as a
    /// header value or the HTTP client fails to build.
    pub fn new(base_url: &str, api_token: &SecretString) -> Result<Self, CmsError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", api_token.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| CmsError::Config(format!("invalid API token: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ContentClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_owned(),
            }),
        })
    }

    /// The configured base URL (no trailing slash).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// GET a path with query parameters, returning the raw JSON envelope.
    pub(crate) async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Value, CmsError> {
        let request = self.inner.client.get(self.url(path)).query(query);
        Self::execute(request).await
    }

    /// POST a JSON body.
    pub(crate) async fn post_json(&self, path: &str, body: &Value) -> Result<Value, CmsError> {
        let request = self.inner.client.post(self.url(path)).json(body);
        Self::execute(request).await
    }

    /// PUT a JSON body.
    pub(crate) async fn put_json(&self, path: &str, body: &Value) -> Result<Value, CmsError> {
        let request = self.inner.client.put(self.url(path)).json(body);
        Self::execute(request).await
    }

    /// DELETE a path.
    pub(crate) async fn delete_json(&self, path: &str) -> Result<Value, CmsError> {
        let request = self.inner.client.delete(self.url(path));
        Self::execute(request).await
    }

    /// POST without the default bearer token (admin login) or with a
    /// caller-supplied bearer (session introspection).
    pub(crate) fn raw(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Check that the CMS is reachable (its `/_health` endpoint).
    ///
    /// # Errors
    ///
    /// Returns an error if the CMS is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), CmsError> {
        let response = self.raw().get(self.url("/_health")).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CmsError::Api {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    /// Resolve a record's numeric primary key from its document id via a
    /// filtered collection lookup. Used by the id-resolution fallback.
    pub(crate) async fn resolve_numeric_id(
        &self,
        collection_path: &str,
        document_id: &str,
    ) -> Result<Option<i64>, CmsError> {
        let mut query = vec![eq_filter("documentId", document_id)];
        query.extend(pagination(1, 1));
        let envelope = self.get_json(collection_path, &query).await?;
        let (items, _) = crate::envelope::normalize_list(envelope)?;
        Ok(items
            .first()
            .and_then(|record| record.get("id"))
            .and_then(Value::as_i64))
    }

    /// Send a request, reading the body as text first so failures keep their
    /// diagnostics, then parsing JSON.
    pub(crate) async fn execute(request: reqwest::RequestBuilder) -> Result<Value, CmsError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "content API returned non-success status"
            );
            return Err(CmsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Build a `filters[<field>][$eq]=<value>` query pair.
pub(crate) fn eq_filter(field: &str, value: &str) -> (String, String) {
    (format!("filters[{field}][$eq]"), value.to_owned())
}

/// Build the `pagination[page]`/`pagination[pageSize]` query pairs.
pub(crate) fn pagination(page: u32, page_size: u32) -> [(String, String); 2] {
    [
        ("pagination[page]".to_owned(), page.to_string()),
        ("pagination[pageSize]".to_owned(), page_size.to_string()),
    ]
}

/// The `populate=*` query pair (expand all relations).
pub(crate) fn populate_all() -> (String, String) {
    ("populate".to_owned(), "*".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builders() {
        assert_eq!(
            eq_filter("documentId", "abc"),
            ("filters[documentId][$eq]".to_owned(), "abc".to_owned())
        );
        let [page, size] = pagination(2, 25);
        assert_eq!(page, ("pagination[page]".to_owned(), "2".to_owned()));
        assert_eq!(size, ("pagination[pageSize]".to_owned(), "25".to_owned()));
        assert_eq!(populate_all().1, "*");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ContentClient::new(
            "http://localhost:1337/",
            &SecretString::from("token-value"),
        )
        .expect("client");
        assert_eq!(client.base_url(), "http://localhost:1337");
        assert_eq!(client.url("/api/products"), "http://localhost:1337/api/products");
    }
}
