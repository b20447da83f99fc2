//! Cart operations with optimistic updates.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};
use vitrine_core::{CartItemId, VariantId};

use super::optimistic::{DEFAULT_TIMEOUT, OptimisticMutation, Settle};
use super::store::{QueryKey, QueryStore};
use super::transforms::{increment_variant_quantity, set_item_quantity};
use super::{CartBackend, SyncError};
use crate::api::{ApiError, Cart, CartDetailsPatch, CartItem, CompletePayload, Order};
use crate::notify::{Navigator, Notifier, Route};

const CART: QueryKey = QueryKey::CART;

/// The shopper's cart, cached and kept in step with the backend.
///
/// Cheap to clone; clones share the cache and collaborators.
#[derive(Clone)]
pub struct CartSync {
    backend: Arc<dyn CartBackend>,
    store: Arc<QueryStore<Cart>>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    timeout: Duration,
}

impl std::fmt::Debug for CartSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSync")
            .field("store", &self.store)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CartSync {
    #[must_use]
    pub fn new(
        backend: Arc<dyn CartBackend>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            backend,
            store: Arc::new(QueryStore::new()),
            notifier,
            navigator,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Share an existing cache instead of starting empty.
    #[must_use]
    pub fn with_store(mut self, store: Arc<QueryStore<Cart>>) -> Self {
        self.store = store;
        self
    }

    /// Upper bound for each backend call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<QueryStore<Cart>> {
        &self.store
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The cached cart, including optimistic changes in flight.
    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.store.get(CART)
    }

    #[must_use]
    pub fn contains_variant(&self, variant_id: VariantId) -> bool {
        self.store.with(CART, |cart| {
            cart.is_some_and(|cart| cart.item_for_variant(variant_id).is_some())
        })
    }

    #[must_use]
    pub fn item_for_variant(&self, variant_id: VariantId) -> Option<CartItem> {
        self.store.with(CART, |cart| {
            cart.and_then(|cart| cart.item_for_variant(variant_id).cloned())
        })
    }

    /// Fetch the cart and cache it.
    ///
    /// The fetched cart is returned even when a cart change is in flight;
    /// it is then not cached, so the optimistic value stays visible.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Superseded`] if a cart change or invalidation
    /// happens before the response arrives, or an error if the request
    /// fails or times out.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Cart, SyncError> {
        let mut ticket = self.store.watch(CART);
        let fetch = tokio::time::timeout(self.timeout, self.backend.get_cart());

        let cart = tokio::select! {
            biased;
            () = ticket.superseded() => {
                debug!("Cart fetch cancelled by a newer cart operation");
                return Err(SyncError::Superseded);
            }
            result = fetch => result.map_err(|_| SyncError::TimedOut(self.timeout))??,
        };

        if !self.store.write_if(CART, ticket.generation(), cart.clone()) {
            debug!("Cart changed during fetch; not caching");
        }
        Ok(cart)
    }

    /// Drop the cached cart (e.g. on logout). Responses of cart changes in
    /// flight are no longer cached.
    pub fn invalidate(&self) {
        self.store.invalidate(CART);
    }

    // =========================================================================
    // Item mutations
    // =========================================================================

    fn mutation(&self, label: &'static str) -> OptimisticMutation<'_, Cart> {
        OptimisticMutation::new(&self.store, CART, label, self.notifier.as_ref())
            .timeout(self.timeout)
    }

    /// Add `quantity` units of a variant.
    ///
    /// When the variant is already in the cart its quantity goes up
    /// immediately; a new line shows once the backend confirms it.
    ///
    /// # Errors
    ///
    /// See [`OptimisticMutation::run`]; `quantity` below 1 is rejected
    /// before anything changes.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        variant_id: VariantId,
        quantity: i64,
    ) -> Result<Cart, SyncError> {
        validate_quantity(quantity)?;

        self.mutation("add_to_cart")
            .optimistic(move |cart| increment_variant_quantity(cart, variant_id, quantity))
            .on_success("Added to cart")
            .on_failure("Could not add item to cart")
            .run(self.backend.add_item(variant_id, quantity), |cart| {
                Settle::Replace(cart.clone())
            })
            .await
    }

    /// Set the quantity of an item.
    ///
    /// # Errors
    ///
    /// See [`OptimisticMutation::run`]; `quantity` below 1 is rejected
    /// before anything changes (use [`delete_cart_item`](Self::delete_cart_item)).
    #[instrument(skip(self))]
    pub async fn change_quantity(
        &self,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<Cart, SyncError> {
        validate_quantity(quantity)?;

        self.mutation("change_quantity")
            .optimistic(move |cart| set_item_quantity(cart, item_id, quantity))
            .on_failure("Could not update quantity")
            .run(self.backend.update_item_quantity(item_id, quantity), |cart| {
                Settle::Replace(cart.clone())
            })
            .await
    }

    /// Remove an item.
    ///
    /// # Errors
    ///
    /// See [`OptimisticMutation::run`].
    #[instrument(skip(self))]
    pub async fn delete_cart_item(&self, item_id: CartItemId) -> Result<Cart, SyncError> {
        self.mutate_then_refetch(
            "delete_cart_item",
            "Could not remove item",
            self.backend.delete_item(item_id),
        )
        .await
    }

    // =========================================================================
    // Checkout details
    // =========================================================================

    /// Patch address, shipping, payment, coupon or note.
    ///
    /// # Errors
    ///
    /// See [`OptimisticMutation::run`].
    #[instrument(skip(self))]
    pub async fn update_cart_details(&self, patch: CartDetailsPatch) -> Result<Cart, SyncError> {
        self.mutate_then_refetch(
            "update_cart_details",
            "Could not update cart",
            self.backend.update_details(patch),
        )
        .await
    }

    /// # Errors
    ///
    /// See [`OptimisticMutation::run`].
    pub async fn apply_coupon(&self, code: &str) -> Result<Cart, SyncError> {
        self.update_cart_details(CartDetailsPatch::apply_coupon(code.trim()))
            .await
    }

    /// # Errors
    ///
    /// See [`OptimisticMutation::run`].
    pub async fn remove_coupon(&self) -> Result<Cart, SyncError> {
        self.update_cart_details(CartDetailsPatch::remove_coupon())
            .await
    }

    /// # Errors
    ///
    /// See [`OptimisticMutation::run`].
    #[instrument(skip(self))]
    pub async fn apply_wallet_credit(&self) -> Result<Cart, SyncError> {
        self.mutate_then_refetch(
            "apply_wallet_credit",
            "Could not apply wallet credit",
            self.backend.apply_wallet_credit(),
        )
        .await
    }

    /// # Errors
    ///
    /// See [`OptimisticMutation::run`].
    #[instrument(skip(self))]
    pub async fn remove_wallet_credit(&self) -> Result<Cart, SyncError> {
        self.mutate_then_refetch(
            "remove_wallet_credit",
            "Could not remove wallet credit",
            self.backend.remove_wallet_credit(),
        )
        .await
    }

    /// Place the order.
    ///
    /// On success the cached cart is dropped and the shopper is sent to the
    /// order confirmation page.
    ///
    /// # Errors
    ///
    /// See [`OptimisticMutation::run`]; the cart stays cached on failure,
    /// even when other cart changes happened meanwhile.
    #[instrument(skip(self, payload))]
    pub async fn complete_cart(&self, payload: CompletePayload) -> Result<Order, SyncError> {
        let order = self
            .mutation("complete_cart")
            .on_success("Order placed")
            .on_failure("Could not place order")
            .run(self.backend.complete(payload), |_| Settle::Evict)
            .await?;

        self.store.invalidate(CART);
        self.navigator.navigate(&Route::OrderConfirmation(order.id));
        Ok(order)
    }

    /// Send `request`, drop the cached cart on success, then fetch it again.
    ///
    /// Falls back to the cart in the response if the refetch fails.
    async fn mutate_then_refetch<F>(
        &self,
        label: &'static str,
        failure_message: &'static str,
        request: F,
    ) -> Result<Cart, SyncError>
    where
        F: Future<Output = Result<Cart, ApiError>> + Send,
    {
        let response = self
            .mutation(label)
            .on_failure(failure_message)
            .run(request, |_| Settle::Evict)
            .await?;

        let generation = self.store.generation(CART);
        match self.load().await {
            Ok(cart) => Ok(cart),
            Err(SyncError::Superseded) => {
                debug!(mutation = label, "Refetch cancelled by a newer cart operation");
                Ok(response)
            }
            Err(err) => {
                warn!(mutation = label, error = %err, "Refetch failed; caching response");
                if !self.store.write_if(CART, generation, response.clone()) {
                    debug!(mutation = label, "Cart changed during refetch; not caching response");
                }
                Ok(response)
            }
        }
    }
}

const fn validate_quantity(quantity: i64) -> Result<(), SyncError> {
    if quantity < 1 {
        return Err(SyncError::InvalidQuantity(quantity));
    }
    Ok(())
}
