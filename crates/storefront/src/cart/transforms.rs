//! Local cart rewrites applied before the backend confirms a change.
//!
//! These only touch quantities. Totals stay as the backend last reported
//! them until the response replaces the whole cart.

use vitrine_core::{CartItemId, VariantId};

use crate::api::Cart;

/// Add `quantity` to the item holding `variant_id`.
///
/// A variant not yet in the cart is left out: the new line appears once the
/// backend responds, since the local cart cannot invent its item ID.
#[must_use]
pub fn increment_variant_quantity(cart: &Cart, variant_id: VariantId, quantity: i64) -> Cart {
    let mut next = cart.clone();
    if let Some(item) = next
        .items
        .iter_mut()
        .find(|item| item.variant_id == variant_id)
    {
        item.quantity += quantity;
    }
    next
}

/// Set the quantity of the item with `item_id`.
#[must_use]
pub fn set_item_quantity(cart: &Cart, item_id: CartItemId, quantity: i64) -> Cart {
    let mut next = cart.clone();
    if let Some(item) = next.items.iter_mut().find(|item| item.id == item_id) {
        item.quantity = quantity;
    }
    next
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use vitrine_core::CartId;

    use super::*;
    use crate::api::CartItem;

    fn cart() -> Cart {
        let mut cart = Cart::empty(CartId::new(1));
        cart.items = vec![
            CartItem {
                id: CartItemId::new(10),
                variant_id: VariantId::new(5),
                quantity: 1,
                price: Decimal::from(20),
                name: "Linen shirt".to_string(),
                variant_title: Some("M / White".to_string()),
            },
            CartItem {
                id: CartItemId::new(11),
                variant_id: VariantId::new(6),
                quantity: 4,
                price: Decimal::from(8),
                name: "Socks".to_string(),
                variant_title: None,
            },
        ];
        cart
    }

    #[test]
    fn test_increment_existing_variant() {
        let next = increment_variant_quantity(&cart(), VariantId::new(5), 2);
        assert_eq!(next.items[0].quantity, 3);
        assert_eq!(next.items[1].quantity, 4);
    }

    #[test]
    fn test_increment_absent_variant_leaves_cart_alone() {
        let before = cart();
        let next = increment_variant_quantity(&before, VariantId::new(99), 1);
        assert_eq!(next, before);
    }

    #[test]
    fn test_set_item_quantity_matches_item_id() {
        // Item 11 holds variant 6; matching must use the item ID
        let next = set_item_quantity(&cart(), CartItemId::new(11), 1);
        assert_eq!(next.items[1].quantity, 1);
        assert_eq!(next.items[0].quantity, 1);

        let untouched = set_item_quantity(&cart(), CartItemId::new(5), 9);
        assert_eq!(untouched, cart());
    }
}
