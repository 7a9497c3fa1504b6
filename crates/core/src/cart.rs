//! Pure cart and point-of-sale calculations.
//!
//! Everything here is total and side-effect free: functions take slices,
//! return fresh vectors, and never panic. Callers own persistence (browser
//! storage on the storefront, nothing at all for the POS, which builds a
//! cart per transaction).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Product, ProductId};

/// A cart line: a product snapshot, an optional selected size, and a
/// positive quantity.
///
/// The embedded product is a snapshot for display and stock checks only; its
/// price is never trusted at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product: Product,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u32,
}

/// Add a product to the cart, merging with an existing line for the same
/// product id by summing quantities.
#[must_use]
pub fn add_to_cart(
    cart: &[CartLine],
    product: &Product,
    size: Option<&str>,
    quantity: u32,
) -> Vec<CartLine> {
    let mut next: Vec<CartLine> = cart.to_vec();
    if let Some(line) = next.iter_mut().find(|l| l.product.id == product.id) {
        line.quantity = line.quantity.saturating_add(quantity);
    } else {
        next.push(CartLine {
            product: product.clone(),
            size: size.map(str::to_owned),
            quantity,
        });
    }
    next
}

/// Set the quantity of a line; a quantity of zero removes the line.
#[must_use]
pub fn set_quantity(cart: &[CartLine], product_id: ProductId, quantity: u32) -> Vec<CartLine> {
    if quantity == 0 {
        return remove_from_cart(cart, product_id);
    }
    cart.iter()
        .map(|l| {
            if l.product.id == product_id {
                CartLine {
                    quantity,
                    ..l.clone()
                }
            } else {
                l.clone()
            }
        })
        .collect()
}

/// Remove the line for the given product id, if present.
#[must_use]
pub fn remove_from_cart(cart: &[CartLine], product_id: ProductId) -> Vec<CartLine> {
    cart.iter()
        .filter(|l| l.product.id != product_id)
        .cloned()
        .collect()
}

/// An empty cart.
#[must_use]
pub fn clear_cart() -> Vec<CartLine> {
    Vec::new()
}

/// The line subtotal: the effective unit price (offer price iff the offer
/// flag is set) times the quantity.
#[must_use]
pub fn subtotal(line: &CartLine) -> Decimal {
    line.product.unit_price() * Decimal::from(line.quantity)
}

/// The cart total: the sum of all line subtotals.
#[must_use]
pub fn total(cart: &[CartLine]) -> Decimal {
    cart.iter().map(subtotal).sum()
}

/// Whether every line's quantity is covered by its product's stock.
#[must_use]
pub fn has_sufficient_stock(cart: &[CartLine]) -> bool {
    cart.iter()
        .all(|l| l.product.stock >= i64::from(l.quantity))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::types::DocumentId;

    use super::*;

    fn product(id: i64, price: i64, offer: bool, offer_price: Option<i64>, stock: i64) -> Product {
        Product {
            id: ProductId::new(id),
            document_id: DocumentId::new(format!("doc{id}")),
            name: format!("Producto {id}"),
            price: Decimal::new(price, 0),
            offer,
            offer_price: offer_price.map(|p| Decimal::new(p, 0)),
            stock,
            show: true,
            sizes: vec![],
            categories: vec![],
            media: vec![],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_add_to_cart_merges_by_product_id() {
        let p = product(1, 100, false, None, 10);
        let cart = add_to_cart(&[], &p, Some("M"), 1);
        let cart = add_to_cart(&cart, &p, Some("M"), 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 3);
    }

    #[test]
    fn test_add_to_cart_does_not_mutate_input() {
        let p = product(1, 100, false, None, 10);
        let original = add_to_cart(&[], &p, None, 1);
        let _ = add_to_cart(&original, &p, None, 5);
        assert_eq!(original[0].quantity, 1);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let p = product(1, 100, false, None, 10);
        let cart = add_to_cart(&[], &p, None, 2);
        let cart = set_quantity(&cart, p.id, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_replaces_quantity() {
        let p = product(1, 100, false, None, 10);
        let cart = add_to_cart(&[], &p, None, 2);
        let cart = set_quantity(&cart, p.id, 7);
        assert_eq!(cart[0].quantity, 7);
    }

    #[test]
    fn test_remove_from_cart() {
        let a = product(1, 100, false, None, 10);
        let b = product(2, 200, false, None, 10);
        let cart = add_to_cart(&add_to_cart(&[], &a, None, 1), &b, None, 1);
        let cart = remove_from_cart(&cart, a.id);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].product.id, b.id);
    }

    #[test]
    fn test_clear_cart_is_empty() {
        assert!(clear_cart().is_empty());
    }

    #[test]
    fn test_subtotal_uses_offer_price_iff_offer() {
        let regular = CartLine {
            product: product(1, 100, false, Some(80), 10),
            size: None,
            quantity: 3,
        };
        let offered = CartLine {
            product: product(2, 100, true, Some(80), 10),
            size: None,
            quantity: 3,
        };
        assert_eq!(subtotal(&regular), Decimal::new(300, 0));
        assert_eq!(subtotal(&offered), Decimal::new(240, 0));
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let a = CartLine {
            product: product(1, 100, false, None, 10),
            size: None,
            quantity: 2,
        };
        let b = CartLine {
            product: product(2, 150, true, Some(120), 10),
            size: None,
            quantity: 1,
        };
        let cart = vec![a.clone(), b.clone()];
        assert_eq!(total(&cart), subtotal(&a) + subtotal(&b));
        assert_eq!(total(&cart), Decimal::new(320, 0));
    }

    #[test]
    fn test_total_of_empty_cart_is_zero() {
        assert_eq!(total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_has_sufficient_stock_iff_no_line_exceeds_stock() {
        let fits = CartLine {
            product: product(1, 100, false, None, 5),
            size: None,
            quantity: 5,
        };
        let exceeds = CartLine {
            product: product(2, 100, false, None, 4),
            size: None,
            quantity: 5,
        };
        assert!(has_sufficient_stock(&[fits.clone()]));
        assert!(!has_sufficient_stock(&[fits, exceeds]));
        assert!(has_sufficient_stock(&[]));
    }
}
