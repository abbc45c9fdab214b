//! Cart models: the session-held guest cart and the account cart view.
//!
//! A guest's cart lives entirely in the session until login, when it is
//! merged into `shop.cart_items` by product id (quantities summed). Both
//! scopes hold the same invariant: one line per product.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use aurelia_core::{CartItemId, Price, ProductId};

/// A cart line joined with product data for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
}

/// The cart as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub subtotal: Price,
    pub item_count: u32,
}

impl CartView {
    /// Build a view from joined lines, computing the subtotal.
    ///
    /// Returns `None` if the subtotal overflows; the order path refuses the
    /// same carts, so the view never shows a subtotal an order could not
    /// carry.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>, currency: aurelia_core::CurrencyCode) -> Option<Self> {
        let subtotal = lines
            .iter()
            .try_fold(Price::zero(currency), |acc, line| {
                acc.checked_add(&line.line_total)
            })?;
        let item_count = lines.iter().map(|l| l.quantity).sum();
        Some(Self {
            lines,
            subtotal,
            item_count,
        })
    }
}

/// One guest cart line. Product data is joined at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The session-held cart of an unauthenticated shopper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestCart {
    lines: Vec<GuestLine>,
}

impl GuestCart {
    /// Add a quantity of a product. An existing line for the same product
    /// absorbs the quantity; a new line is appended otherwise.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(GuestLine {
                product_id,
                quantity,
            });
        }
    }

    /// Set the quantity of a product's line. A non-positive quantity
    /// removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        match u32::try_from(quantity) {
            Ok(q) if q > 0 => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
                    line.quantity = q;
                }
            }
            _ => self.remove(product_id),
        }
    }

    /// Remove a product's line entirely.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Drop all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[GuestLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Merge account cart quantities with guest lines by product id, summing
/// where both carts hold the same product.
///
/// This is the login-time sync semantic: guest quantities are *added* to
/// the account's, never replaced.
#[must_use]
pub fn merge_quantities(
    account: &[(ProductId, u32)],
    guest: &[GuestLine],
) -> BTreeMap<i32, u32> {
    let mut merged: BTreeMap<i32, u32> = account
        .iter()
        .map(|(id, qty)| (id.as_i32(), *qty))
        .collect();
    for line in guest {
        merged
            .entry(line.product_id.as_i32())
            .and_modify(|qty| *qty = qty.saturating_add(line.quantity))
            .or_insert(line.quantity);
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(n: i32) -> ProductId {
        ProductId::new(n)
    }

    #[test]
    fn test_add_distinct_products_one_line_each() {
        let mut cart = GuestCart::default();
        cart.add(pid(1), 2);
        cart.add(pid(2), 1);
        cart.add(pid(3), 4);

        assert_eq!(cart.lines().len(), 3);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.lines()[1].quantity, 1);
        assert_eq!(cart.lines()[2].quantity, 4);
    }

    #[test]
    fn test_add_same_product_sums_into_single_line() {
        let mut cart = GuestCart::default();
        cart.add(pid(1), 2);
        cart.add(pid(1), 3);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = GuestCart::default();
        cart.add(pid(1), 2);
        cart.set_quantity(pid(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_negative_removes_line() {
        let mut cart = GuestCart::default();
        cart.add(pid(1), 2);
        cart.set_quantity(pid(1), -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_updates_existing_line() {
        let mut cart = GuestCart::default();
        cart.add(pid(1), 2);
        cart.set_quantity(pid(1), 7);
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = GuestCart::default();
        cart.add(pid(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_sums_overlapping_products() {
        // Guest {A: 2} merged with account {A: 3, B: 1} yields {A: 5, B: 1}.
        let mut guest = GuestCart::default();
        guest.add(pid(1), 2);

        let account = vec![(pid(1), 3), (pid(2), 1)];
        let merged = merge_quantities(&account, guest.lines());

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(&1), Some(&5));
        assert_eq!(merged.get(&2), Some(&1));
    }

    #[test]
    fn test_merge_with_empty_guest_cart_is_identity() {
        let account = vec![(pid(1), 3)];
        let merged = merge_quantities(&account, &[]);
        assert_eq!(merged.get(&1), Some(&3));
        assert_eq!(merged.len(), 1);
    }

    fn priced_line(n: i32, amount: rust_decimal::Decimal, quantity: u32) -> CartLine {
        let price = Price::new(amount, aurelia_core::CurrencyCode::INR);
        CartLine {
            id: CartItemId::new(n),
            product_id: pid(n),
            name: format!("product {n}"),
            image: None,
            unit_price: price,
            quantity,
            line_total: price,
        }
    }

    #[test]
    fn test_view_subtotal_sums_line_totals() {
        use rust_decimal::Decimal;

        let lines = vec![
            priced_line(1, Decimal::new(1_499_00, 2), 1),
            priced_line(2, Decimal::new(2_500_00, 2), 2),
        ];
        let view = CartView::from_lines(lines, aurelia_core::CurrencyCode::INR).unwrap();
        assert_eq!(view.subtotal.amount, Decimal::new(3_999_00, 2));
        assert_eq!(view.item_count, 3);
    }

    #[test]
    fn test_view_subtotal_overflow_is_refused() {
        use rust_decimal::Decimal;

        let lines = vec![
            priced_line(1, Decimal::MAX, 1),
            priced_line(2, Decimal::MAX, 1),
        ];
        assert!(CartView::from_lines(lines, aurelia_core::CurrencyCode::INR).is_none());
    }

    #[test]
    fn test_merge_guest_only_products_carry_over() {
        let mut guest = GuestCart::default();
        guest.add(pid(9), 4);
        let merged = merge_quantities(&[], guest.lines());
        assert_eq!(merged.get(&9), Some(&4));
    }
}
