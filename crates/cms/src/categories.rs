//! Category (type-product) resource operations.

use serde_json::json;
use tienda_core::{Category, normalize_category_label};
use tracing::instrument;

use crate::CmsError;
use crate::client::{ContentClient, Paginated, pagination};
use crate::envelope::{normalize_list, normalize_single};
use crate::fallback::with_id_fallback;

const COLLECTION: &str = "/api/type-products";
const RESOURCE: &str = "type-products";

impl ContentClient {
    /// List categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Paginated<Category>, CmsError> {
        let query = pagination(page, page_size).to_vec();
        let envelope = self.get_json(COLLECTION, &query).await?;
        let (records, pagination) = normalize_list(envelope)?;
        let items = records
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Category>, _>>()?;
        Ok(Paginated { items, pagination })
    }

    /// Create a category. The label is normalized (lowercase alphanumeric
    /// plus single spaces) before it is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the payload.
    #[instrument(skip(self))]
    pub async fn create_category(&self, label: &str) -> Result<Category, CmsError> {
        let body = json!({ "data": { "label": normalize_category_label(label) } });
        let envelope = self.post_json(COLLECTION, &body).await?;
        Ok(serde_json::from_value(normalize_single(envelope)?)?)
    }

    /// Update a category's label, addressed by numeric id or document id.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] when neither addressing scheme finds
    /// the record.
    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        id_or_document_id: &str,
        label: &str,
    ) -> Result<Category, CmsError> {
        let body = json!({ "data": { "label": normalize_category_label(label) } });
        with_id_fallback(
            RESOURCE,
            id_or_document_id,
            |id| {
                let body = body.clone();
                async move {
                    let envelope = self.put_json(&format!("{COLLECTION}/{id}"), &body).await?;
                    Ok(serde_json::from_value::<Category>(normalize_single(envelope)?)?)
                }
            },
            |doc| async move { self.resolve_numeric_id(COLLECTION, &doc).await },
        )
        .await
        .map_err(|e| e.named_not_found(RESOURCE, id_or_document_id))
    }

    /// Delete a category, addressed by numeric id or document id.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] when neither addressing scheme finds
    /// the record.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id_or_document_id: &str) -> Result<(), CmsError> {
        with_id_fallback(
            RESOURCE,
            id_or_document_id,
            |id| async move {
                self.delete_json(&format!("{COLLECTION}/{id}")).await?;
                Ok(())
            },
            |doc| async move { self.resolve_numeric_id(COLLECTION, &doc).await },
        )
        .await
        .map_err(|e| e.named_not_found(RESOURCE, id_or_document_id))
    }
}
