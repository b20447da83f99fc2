//! Cart endpoints (not cached - mutable state).

use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;
use vitrine_core::{CartItemId, VariantId};

use super::{
    AddItemInput, ApiClient, ApiError, Cart, CartDetailsPatch, CompletePayload, Order,
    UpdateQuantityInput,
};
use crate::cart::CartBackend;

#[async_trait]
impl CartBackend for ApiClient {
    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        let request = self.request(Method::GET, "cart")?;
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn add_item(&self, variant_id: VariantId, quantity: i64) -> Result<Cart, ApiError> {
        let request = self
            .request(Method::POST, "cart/items")?
            .json(&AddItemInput {
                variant_id,
                quantity,
            });
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<Cart, ApiError> {
        let request = self
            .request(Method::PATCH, &format!("cart/items/{item_id}"))?
            .json(&UpdateQuantityInput { quantity });
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn delete_item(&self, item_id: CartItemId) -> Result<Cart, ApiError> {
        let request = self.request(Method::DELETE, &format!("cart/items/{item_id}"))?;
        self.execute(request).await
    }

    #[instrument(skip(self, patch))]
    async fn update_details(&self, patch: CartDetailsPatch) -> Result<Cart, ApiError> {
        let request = self.request(Method::PATCH, "cart")?.json(&patch);
        self.execute(request).await
    }

    #[instrument(skip(self, payload), fields(payment_method = %payload.payment_method))]
    async fn complete(&self, payload: CompletePayload) -> Result<Order, ApiError> {
        let request = self.request(Method::POST, "cart/complete")?.json(&payload);
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn apply_wallet_credit(&self) -> Result<Cart, ApiError> {
        let request = self.request(Method::POST, "cart/wallet-credit")?;
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn remove_wallet_credit(&self) -> Result<Cart, ApiError> {
        let request = self.request(Method::DELETE, "cart/wallet-credit")?;
        self.execute(request).await
    }
}
