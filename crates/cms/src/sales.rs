//! Point-of-sale record operations. Sales are write-once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tienda_core::Sale;
use tracing::instrument;

use crate::CmsError;
use crate::client::{ContentClient, Paginated, pagination};
use crate::envelope::{normalize_list, normalize_single};

const COLLECTION: &str = "/api/sales";

impl ContentClient {
    /// List sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_sales(&self, page: u32, page_size: u32) -> Result<Paginated<Sale>, CmsError> {
        let mut query = vec![("sort".to_owned(), "saleDate:desc".to_owned())];
        query.extend(pagination(page, page_size));
        let envelope = self.get_json(COLLECTION, &query).await?;
        let (records, pagination) = normalize_list(envelope)?;
        let items = records
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Sale>, _>>()?;
        Ok(Paginated { items, pagination })
    }

    /// Record a completed point-of-sale transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the payload.
    #[instrument(skip(self))]
    pub async fn create_sale(
        &self,
        name: &str,
        sale_price: Decimal,
        sale_date: DateTime<Utc>,
    ) -> Result<Sale, CmsError> {
        let body = json!({
            "data": {
                "name": name,
                "salePrice": sale_price,
                "saleDate": sale_date,
            }
        });
        let envelope = self.post_json(COLLECTION, &body).await?;
        Ok(serde_json::from_value(normalize_single(envelope)?)?)
    }
}
