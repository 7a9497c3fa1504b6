//! Product resource operations.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tienda_core::Product;
use tracing::instrument;

use crate::client::{ContentClient, Paginated, eq_filter, pagination, populate_all};
use crate::envelope::{normalize_list, normalize_single};
use crate::fallback::with_id_fallback;
use crate::CmsError;

const COLLECTION: &str = "/api/products";
const RESOURCE: &str = "products";

/// Fields accepted by product create/update. `None` fields are omitted from
/// the payload, leaving the stored value untouched on update.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    /// Size relation ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<i64>>,
    /// Category relation ids.
    #[serde(rename = "typeProducts", skip_serializing_if = "Option::is_none")]
    pub type_products: Option<Vec<i64>>,
    /// Media asset ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<i64>>,
}

impl ContentClient {
    /// List products with pagination, optionally filtered by category label
    /// and restricted to visible (`show = true`) records.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u32,
        page_size: u32,
        category: Option<&str>,
        only_visible: bool,
    ) -> Result<Paginated<Product>, CmsError> {
        let mut query = vec![populate_all()];
        query.extend(pagination(page, page_size));
        if only_visible {
            query.push(eq_filter("show", "true"));
        }
        if let Some(label) = category {
            // Relation filter: match the category label through the join.
            query.push((
                "filters[typeProducts][label][$eq]".to_owned(),
                label.to_owned(),
            ));
        }

        let envelope = self.get_json(COLLECTION, &query).await?;
        let (records, pagination) = normalize_list(envelope)?;
        let items = records
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Product>, _>>()?;
        Ok(Paginated { items, pagination })
    }

    /// Fetch the product with the given document id.
    ///
    /// The lookup goes through the collection filter rather than a path
    /// segment so it works against both API versions without guessing.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] if no product carries the document id.
    #[instrument(skip(self))]
    pub async fn get_product_by_document_id(
        &self,
        document_id: &str,
    ) -> Result<Product, CmsError> {
        let mut query = vec![populate_all(), eq_filter("documentId", document_id)];
        query.extend(pagination(1, 1));

        let envelope = self.get_json(COLLECTION, &query).await?;
        let (mut records, _) = normalize_list(envelope)?;
        if records.is_empty() {
            return Err(CmsError::NotFound {
                resource: RESOURCE.to_owned(),
                id: document_id.to_owned(),
            });
        }
        Ok(serde_json::from_value(records.remove(0))?)
    }

    /// Fetch a product by numeric id or document id, whichever the caller
    /// holds. Both go through a collection filter, so no 404-retry is
    /// needed here.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] if nothing matches.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id_or_document_id: &str) -> Result<Product, CmsError> {
        let field = if crate::fallback::is_numeric_id(id_or_document_id) {
            "id"
        } else {
            "documentId"
        };
        let mut query = vec![populate_all(), eq_filter(field, id_or_document_id)];
        query.extend(pagination(1, 1));

        let envelope = self.get_json(COLLECTION, &query).await?;
        let (mut records, _) = normalize_list(envelope)?;
        if records.is_empty() {
            return Err(CmsError::NotFound {
                resource: RESOURCE.to_owned(),
                id: id_or_document_id.to_owned(),
            });
        }
        Ok(serde_json::from_value(records.remove(0))?)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the payload.
    #[instrument(skip(self, write))]
    pub async fn create_product(&self, write: &ProductWrite) -> Result<Product, CmsError> {
        let envelope = self
            .post_json(COLLECTION, &json!({ "data": write }))
            .await?;
        Ok(serde_json::from_value(normalize_single(envelope)?)?)
    }

    /// Update a product addressed by numeric id or document id.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] when neither addressing scheme finds
    /// the record.
    #[instrument(skip(self, write))]
    pub async fn update_product(
        &self,
        id_or_document_id: &str,
        write: &ProductWrite,
    ) -> Result<Product, CmsError> {
        let body = json!({ "data": write });
        with_id_fallback(
            RESOURCE,
            id_or_document_id,
            |id| {
                let body = body.clone();
                async move {
                    let envelope = self
                        .put_json(&format!("{COLLECTION}/{id}"), &body)
                        .await?;
                    Ok(serde_json::from_value::<Product>(normalize_single(envelope)?)?)
                }
            },
            |doc| async move { self.resolve_numeric_id(COLLECTION, &doc).await },
        )
        .await
        .map_err(|e| e.named_not_found(RESOURCE, id_or_document_id))
    }

    /// Delete a product addressed by numeric id or document id.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] when neither addressing scheme finds
    /// the record.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id_or_document_id: &str) -> Result<(), CmsError> {
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

    /// Write a product's stock as `current - by`, from the caller's
    /// snapshot.
    ///
    /// Read-then-write: two concurrent sales can both observe sufficient
    /// stock and both succeed. The content API offers no compare-and-swap,
    /// so the race is accepted rather than masked.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    #[instrument(skip(self, product), fields(document_id = %product.document_id))]
    pub async fn decrement_stock(&self, product: &Product, by: u32) -> Result<Product, CmsError> {
        let write = ProductWrite {
            stock: Some(product.stock - i64::from(by)),
            ..ProductWrite::default()
        };
        self.update_product(product.document_id.as_str(), &write)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_write_omits_unset_fields() {
        let write = ProductWrite {
            stock: Some(3),
            ..ProductWrite::default()
        };
        let value = serde_json::to_value(&write).unwrap();
        assert_eq!(value, json!({ "stock": 3 }));
    }

    #[test]
    fn test_product_write_renames_relations() {
        let write = ProductWrite {
            name: Some("Remera".to_owned()),
            type_products: Some(vec![1, 2]),
            offer_price: Some(Decimal::new(1200, 0)),
            ..ProductWrite::default()
        };
        let value = serde_json::to_value(&write).unwrap();
        assert!(value.get("typeProducts").is_some());
        assert!(value.get("offerPrice").is_some());
        assert!(value.get("type_products").is_none());
    }
}
