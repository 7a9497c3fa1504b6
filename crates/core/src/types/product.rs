//! Catalog records as exposed by the content API.
//!
//! These structs deserialize from the *normalized* (flat) record shape
//! produced by the cms crate's envelope handling, so they are independent of
//! which content-API version served the response.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, DocumentId, MediaId, ProductId, SizeId};

/// A catalog product.
///
/// The authoritative copy lives in the CMS; instances of this struct are
/// per-request snapshots and are never written back wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub document_id: DocumentId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub offer: bool,
    #[serde(default)]
    pub offer_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_show")]
    pub show: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: Vec<SizeVariant>,
    #[serde(rename = "typeProducts", default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<MediaAsset>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_show() -> bool {
    true
}

/// Empty relations arrive as `null` from the older API version; treat that
/// the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Product {
    /// The price a buyer actually pays: the offer price when the offer flag
    /// is set (falling back to the list price if the offer price is absent),
    /// the list price otherwise.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        if self.offer {
            self.offer_price.unwrap_or(self.price)
        } else {
            self.price
        }
    }

    /// Whether the product carries the given size, comparing normalized codes.
    #[must_use]
    pub fn has_size(&self, code: &str) -> bool {
        let wanted = normalize_size_code(code);
        self.sizes
            .iter()
            .any(|s| normalize_size_code(&s.code) == wanted)
    }
}

/// A size variant (many-to-many with [`Product`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariant {
    pub id: SizeId,
    pub document_id: DocumentId,
    /// Normalized uppercase alphanumeric code (e.g. "M", "XL", "42").
    pub code: String,
}

/// A product category (many-to-many with [`Product`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub document_id: DocumentId,
    /// Normalized lowercase alphanumeric+space label (e.g. "remeras").
    pub label: String,
}

/// An uploaded media asset attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: MediaId,
    pub url: String,
    #[serde(default)]
    pub alternative_text: Option<String>,
}

/// Normalize a size code: uppercase, ASCII alphanumerics only.
#[must_use]
pub fn normalize_size_code(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Normalize a category label: lowercase, ASCII alphanumerics and single
/// spaces only.
#[must_use]
pub fn normalize_category_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = true;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_space = false;
        } else if c.is_whitespace() && !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(price: i64, offer: bool, offer_price: Option<i64>) -> Product {
        Product {
            id: ProductId::new(1),
            document_id: DocumentId::new("doc1"),
            name: "Remera lisa".to_owned(),
            price: Decimal::new(price, 0),
            offer,
            offer_price: offer_price.map(|p| Decimal::new(p, 0)),
            stock: 10,
            show: true,
            sizes: vec![SizeVariant {
                id: SizeId::new(1),
                document_id: DocumentId::new("size1"),
                code: "M".to_owned(),
            }],
            categories: vec![],
            media: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_unit_price_uses_offer_price_iff_offer() {
        assert_eq!(product(100, false, Some(80)).unit_price(), Decimal::new(100, 0));
        assert_eq!(product(100, true, Some(80)).unit_price(), Decimal::new(80, 0));
    }

    #[test]
    fn test_unit_price_offer_without_offer_price_falls_back() {
        assert_eq!(product(100, true, None).unit_price(), Decimal::new(100, 0));
    }

    #[test]
    fn test_has_size_compares_normalized_codes() {
        let p = product(100, false, None);
        assert!(p.has_size("M"));
        assert!(p.has_size(" m "));
        assert!(!p.has_size("XL"));
    }

    #[test]
    fn test_normalize_size_code() {
        assert_eq!(normalize_size_code(" xl "), "XL");
        assert_eq!(normalize_size_code("42-b"), "42B");
        assert_eq!(normalize_size_code("m"), "M");
    }

    #[test]
    fn test_normalize_category_label() {
        assert_eq!(normalize_category_label("Remeras"), "remeras");
        assert_eq!(normalize_category_label("  Ropa   de Niños!"), "ropa de nios");
        assert_eq!(normalize_category_label("A  B "), "a b");
    }

    #[test]
    fn test_product_deserializes_from_normalized_record() {
        let value = serde_json::json!({
            "id": 3,
            "documentId": "abc123",
            "name": "Remera",
            "price": 1500.0,
            "offer": true,
            "offerPrice": 1200.0,
            "stock": 4,
            "show": true,
            "sizes": [{"id": 1, "documentId": "s1", "code": "M"}],
            "typeProducts": [{"id": 2, "documentId": "c1", "label": "remeras"}],
            "media": [{"id": 9, "url": "/uploads/a.webp", "alternativeText": null}],
            "createdAt": "2024-05-01T12:00:00.000Z"
        });
        let p: Product = serde_json::from_value(value).unwrap();
        assert_eq!(p.id, ProductId::new(3));
        assert_eq!(p.document_id.as_str(), "abc123");
        assert_eq!(p.unit_price(), Decimal::new(1200, 0));
        assert_eq!(p.sizes.len(), 1);
        assert_eq!(p.categories.len(), 1);
        assert_eq!(p.media.len(), 1);
        assert!(p.created_at.is_some());
    }

    #[test]
    fn test_product_tolerates_null_relations() {
        let value = serde_json::json!({
            "id": 1,
            "documentId": "d",
            "name": "Basica",
            "price": 100.0,
            "sizes": null,
            "typeProducts": null,
            "media": null
        });
        let p: Product = serde_json::from_value(value).unwrap();
        assert!(p.sizes.is_empty());
        assert!(p.categories.is_empty());
        assert!(p.media.is_empty());
    }

    #[test]
    fn test_product_defaults_for_absent_relations() {
        let value = serde_json::json!({
            "id": 1,
            "documentId": "d",
            "name": "Basica",
            "price": 100.0
        });
        let p: Product = serde_json::from_value(value).unwrap();
        assert!(p.sizes.is_empty());
        assert!(p.categories.is_empty());
        assert!(p.media.is_empty());
        assert!(p.show);
        assert_eq!(p.stock, 0);
        assert!(!p.offer);
    }
}
