//! The remote cart service seam.

use async_trait::async_trait;
use vitrine_core::{CartItemId, VariantId};

use crate::api::{ApiError, Cart, CartDetailsPatch, CompletePayload, Order};

/// Remote cart operations.
///
/// Every mutation returns the authoritative cart (or the created order)
/// as the backend sees it after the change. [`ApiClient`](crate::api::ApiClient)
/// is the production implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Fetch the current cart.
    async fn get_cart(&self) -> Result<Cart, ApiError>;

    /// Add `quantity` units of a variant.
    async fn add_item(&self, variant_id: VariantId, quantity: i64) -> Result<Cart, ApiError>;

    /// Set the quantity of an existing item.
    async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<Cart, ApiError>;

    /// Remove an item.
    async fn delete_item(&self, item_id: CartItemId) -> Result<Cart, ApiError>;

    /// Patch checkout details (address, shipping, payment, coupon, note).
    async fn update_details(&self, patch: CartDetailsPatch) -> Result<Cart, ApiError>;

    /// Finalize the cart into an order.
    async fn complete(&self, payload: CompletePayload) -> Result<Order, ApiError>;

    async fn apply_wallet_credit(&self) -> Result<Cart, ApiError>;

    async fn remove_wallet_credit(&self) -> Result<Cart, ApiError>;
}
