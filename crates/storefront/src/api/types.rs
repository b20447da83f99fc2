//! Wire types for the commerce REST API.
//!
//! These mirror the backend's JSON payloads. Money is carried as
//! [`Decimal`] strings to preserve precision.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrine_core::{AddressId, CartId, CartItemId, OrderId, OrderStatus, Product, VariantId};

// =============================================================================
// Catalog Types
// =============================================================================

/// A page of products from the catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl ProductPage {
    /// Whether more pages follow this one.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Cart item ID (distinct from the variant ID).
    pub id: CartItemId,
    /// Purchased variant.
    pub variant_id: VariantId,
    /// Quantity, at least 1.
    pub quantity: i64,
    /// Unit price snapshot taken when the item was added.
    pub price: Decimal,
    /// Product name for display.
    #[serde(default)]
    pub name: String,
    /// Variant title (e.g. "M / Red").
    #[serde(default)]
    pub variant_title: Option<String>,
}

impl CartItem {
    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A shopping cart as owned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Line items, at most one per variant.
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Sum of line totals before discounts.
    #[serde(default)]
    pub subtotal: Decimal,
    /// Coupon and promotion discounts.
    #[serde(default)]
    pub discount_total: Decimal,
    /// Wallet credit applied to this cart.
    #[serde(default)]
    pub wallet_credit: Decimal,
    /// Amount due.
    #[serde(default)]
    pub total: Decimal,
    /// Applied coupon code.
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// Selected shipping address.
    #[serde(default)]
    pub shipping_address_id: Option<AddressId>,
    /// Selected shipping method.
    #[serde(default)]
    pub shipping_method: Option<String>,
    /// Selected payment method.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Customer note.
    #[serde(default)]
    pub note: Option<String>,
}

impl Cart {
    /// An empty cart with the given ID.
    #[must_use]
    pub const fn empty(id: CartId) -> Self {
        Self {
            id,
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            discount_total: Decimal::ZERO,
            wallet_credit: Decimal::ZERO,
            total: Decimal::ZERO,
            coupon_code: None,
            shipping_address_id: None,
            shipping_method: None,
            payment_method: None,
            note: None,
        }
    }

    /// Sum of item quantities.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item with cart-item identity `id`.
    #[must_use]
    pub fn item(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The item holding `variant_id`, if that variant is in the cart.
    #[must_use]
    pub fn item_for_variant(&self, variant_id: VariantId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.variant_id == variant_id)
    }

    /// Whether wallet credit is applied.
    #[must_use]
    pub fn has_wallet_credit(&self) -> bool {
        self.wallet_credit > Decimal::ZERO
    }
}

/// Partial update of checkout details.
///
/// Fields left as `None` are not sent. `coupon_code: Some(None)` serializes
/// as `null` and removes the applied coupon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartDetailsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address_id: Option<AddressId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub coupon_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CartDetailsPatch {
    /// Patch that applies a coupon code.
    #[must_use]
    pub fn apply_coupon(code: impl Into<String>) -> Self {
        Self {
            coupon_code: Some(Some(code.into())),
            ..Self::default()
        }
    }

    /// Patch that removes the applied coupon.
    #[must_use]
    pub fn remove_coupon() -> Self {
        Self {
            coupon_code: Some(None),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_shipping_address(mut self, id: AddressId) -> Self {
        self.shipping_address_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_shipping_method(mut self, method: impl Into<String>) -> Self {
        self.shipping_method = Some(method.into());
        self
    }

    #[must_use]
    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.shipping_address_id.is_none()
            && self.shipping_method.is_none()
            && self.payment_method.is_none()
            && self.coupon_code.is_none()
            && self.note.is_none()
    }
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ref_option)] // signature imposed by serde's `with`
    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Request body for adding a variant to the cart.
#[derive(Debug, Clone, Serialize)]
pub struct AddItemInput {
    pub variant_id: VariantId,
    pub quantity: i64,
}

/// Request body for changing an item's quantity.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantityInput {
    pub quantity: i64,
}

// =============================================================================
// Checkout Types
// =============================================================================

/// Payload that finalizes the cart into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletePayload {
    /// Payment method identifier (e.g. "card", "cod").
    pub payment_method: String,
    /// Optional order note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An order created from a completed cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Human-facing order number.
    #[serde(default)]
    pub number: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: OrderStatus,
    /// Amount charged.
    pub total: Decimal,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Error Body
// =============================================================================

/// Error payload returned by the backend on non-success responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message safe to show to shoppers.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64, variant: i64, quantity: i64) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            variant_id: VariantId::new(variant),
            quantity,
            price: Decimal::new(1250, 2),
            name: "Tee".to_string(),
            variant_title: None,
        }
    }

    #[test]
    fn test_cart_lookups() {
        let mut cart = Cart::empty(CartId::new(1));
        cart.items = vec![item(10, 5, 1), item(11, 6, 3)];

        assert_eq!(cart.total_quantity(), 4);
        assert_eq!(cart.item(CartItemId::new(11)).map(|i| i.quantity), Some(3));
        assert_eq!(
            cart.item_for_variant(VariantId::new(5)).map(|i| i.id),
            Some(CartItemId::new(10))
        );
        assert!(cart.item_for_variant(VariantId::new(99)).is_none());
    }

    #[test]
    fn test_line_total() {
        assert_eq!(item(1, 1, 3).line_total(), Decimal::new(3750, 2));
    }

    #[test]
    fn test_cart_deserialize_minimal() {
        let json = r#"{"id": 3, "items": [{"id": 1, "variant_id": 5, "quantity": 2, "price": "9.99"}]}"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, Decimal::ZERO);
        assert!(cart.coupon_code.is_none());
    }

    #[test]
    fn test_patch_serialization_skips_unset_fields() {
        let patch = CartDetailsPatch::default().with_shipping_method("express");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"shipping_method": "express"}));
    }

    #[test]
    fn test_patch_remove_coupon_sends_null() {
        let json = serde_json::to_value(CartDetailsPatch::remove_coupon()).unwrap();
        assert_eq!(json, serde_json::json!({"coupon_code": null}));

        let json = serde_json::to_value(CartDetailsPatch::apply_coupon("SAVE10")).unwrap();
        assert_eq!(json, serde_json::json!({"coupon_code": "SAVE10"}));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(CartDetailsPatch::default().is_empty());
        assert!(!CartDetailsPatch::remove_coupon().is_empty());
    }

    #[test]
    fn test_order_deserialize() {
        let json = r#"{"id": 77, "number": "A-1001", "status": "processing", "total": "42.00"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, OrderId::new(77));
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.created_at.is_none());
    }
}
