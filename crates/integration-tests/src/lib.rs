//! Integration tests for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_sync` - Optimistic cart updates against a scripted backend
//! - `variant_resolution` - Variant picking over catalog payloads
//!
//! The scripted backend lets a test decide when, and in which order, each
//! backend call answers. Every call waits on a [`Reply`] handle the test
//! holds.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::oneshot;
use vitrine_core::{CartId, CartItemId, OrderId, OrderStatus, VariantId};
use vitrine_storefront::api::{ApiError, Cart, CartDetailsPatch, CartItem, CompletePayload, Order};
use vitrine_storefront::cart::CartBackend;
use vitrine_storefront::notify::{Navigator, Notifier, Route};

// =============================================================================
// Scripted backend
// =============================================================================

/// Backend operations, used to route scripted replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetCart,
    AddItem,
    UpdateItemQuantity,
    DeleteItem,
    UpdateDetails,
    ApplyWalletCredit,
    RemoveWalletCredit,
}

/// A recorded backend call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetCart,
    AddItem(VariantId, i64),
    UpdateItemQuantity(CartItemId, i64),
    DeleteItem(CartItemId),
    UpdateDetails(CartDetailsPatch),
    Complete(CompletePayload),
    ApplyWalletCredit,
    RemoveWalletCredit,
}

/// Answers one pending backend call.
#[derive(Debug)]
pub struct Reply<T> {
    tx: oneshot::Sender<Result<T, ApiError>>,
}

impl<T> Reply<T> {
    /// Answer with a value. A call that was cancelled meanwhile ignores it.
    pub fn ok(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    /// Answer with an error.
    pub fn err(self, error: ApiError) {
        let _ = self.tx.send(Err(error));
    }
}

type Pending<T> = oneshot::Receiver<Result<T, ApiError>>;

#[derive(Default)]
struct Script {
    carts: HashMap<Endpoint, VecDeque<Pending<Cart>>>,
    orders: VecDeque<Pending<Order>>,
    calls: Vec<Call>,
}

/// A [`CartBackend`] whose answers are released by the test.
///
/// Calls without a scripted reply fail with `ApiError::NotFound`.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a reply for the next call to `endpoint`.
    #[must_use]
    pub fn next(&self, endpoint: Endpoint) -> Reply<Cart> {
        let (tx, rx) = oneshot::channel();
        self.lock().carts.entry(endpoint).or_default().push_back(rx);
        Reply { tx }
    }

    /// Queue an immediate reply for the next call to `endpoint`.
    pub fn answer(&self, endpoint: Endpoint, result: Result<Cart, ApiError>) {
        let reply = self.next(endpoint);
        match result {
            Ok(cart) => reply.ok(cart),
            Err(error) => reply.err(error),
        }
    }

    /// Queue a reply for the next checkout.
    #[must_use]
    pub fn next_order(&self) -> Reply<Order> {
        let (tx, rx) = oneshot::channel();
        self.lock().orders.push_back(rx);
        Reply { tx }
    }

    /// Calls received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn record(&self, call: Call, endpoint: Endpoint) -> Option<Pending<Cart>> {
        let mut script = self.lock();
        script.calls.push(call);
        script.carts.get_mut(&endpoint).and_then(VecDeque::pop_front)
    }

    async fn answer_cart(&self, call: Call, endpoint: Endpoint) -> Result<Cart, ApiError> {
        let pending = self.record(call, endpoint);
        await_reply(pending, endpoint).await
    }
}

async fn await_reply<T>(pending: Option<Pending<T>>, endpoint: Endpoint) -> Result<T, ApiError> {
    match pending {
        Some(rx) => rx
            .await
            .unwrap_or_else(|_| Err(ApiError::NotFound(format!("{endpoint:?}: reply dropped")))),
        None => Err(ApiError::NotFound(format!("{endpoint:?}: no reply scripted"))),
    }
}

#[async_trait]
impl CartBackend for ScriptedBackend {
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.answer_cart(Call::GetCart, Endpoint::GetCart).await
    }

    async fn add_item(&self, variant_id: VariantId, quantity: i64) -> Result<Cart, ApiError> {
        self.answer_cart(Call::AddItem(variant_id, quantity), Endpoint::AddItem)
            .await
    }

    async fn update_item_quantity(
        &self,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<Cart, ApiError> {
        self.answer_cart(
            Call::UpdateItemQuantity(item_id, quantity),
            Endpoint::UpdateItemQuantity,
        )
        .await
    }

    async fn delete_item(&self, item_id: CartItemId) -> Result<Cart, ApiError> {
        self.answer_cart(Call::DeleteItem(item_id), Endpoint::DeleteItem)
            .await
    }

    async fn update_details(&self, patch: CartDetailsPatch) -> Result<Cart, ApiError> {
        self.answer_cart(Call::UpdateDetails(patch), Endpoint::UpdateDetails)
            .await
    }

    async fn complete(&self, payload: CompletePayload) -> Result<Order, ApiError> {
        let pending = {
            let mut script = self.lock();
            script.calls.push(Call::Complete(payload));
            script.orders.pop_front()
        };
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::NotFound("complete: reply dropped".to_string()))),
            None => Err(ApiError::NotFound("complete: no reply scripted".to_string())),
        }
    }

    async fn apply_wallet_credit(&self) -> Result<Cart, ApiError> {
        self.answer_cart(Call::ApplyWalletCredit, Endpoint::ApplyWalletCredit)
            .await
    }

    async fn remove_wallet_credit(&self) -> Result<Cart, ApiError> {
        self.answer_cart(Call::RemoveWalletCredit, Endpoint::RemoveWalletCredit)
            .await
    }
}

// =============================================================================
// Recording collaborators
// =============================================================================

/// A notification shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// Keeps every notification for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn all(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Error(message) => Some(message),
                Notification::Success(_) => None,
            })
            .collect()
    }

    fn push(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}

/// Keeps every navigation target.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &Route) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.clone());
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A cart holding `(item_id, variant_id, quantity)` lines at 10.00 each.
#[must_use]
pub fn cart_with(lines: &[(i64, i64, i64)]) -> Cart {
    let mut cart = Cart::empty(CartId::new(1));
    cart.items = lines
        .iter()
        .map(|&(item, variant, quantity)| CartItem {
            id: CartItemId::new(item),
            variant_id: VariantId::new(variant),
            quantity,
            price: Decimal::from(10),
            name: format!("Product {variant}"),
            variant_title: None,
        })
        .collect();
    cart.subtotal = cart.items.iter().map(CartItem::line_total).sum();
    cart.total = cart.subtotal;
    cart
}

/// A freshly placed order.
#[must_use]
pub fn order(id: i64) -> Order {
    Order {
        id: OrderId::new(id),
        number: Some(format!("V-{id}")),
        status: OrderStatus::Pending,
        total: Decimal::from(10),
        created_at: None,
    }
}

/// Yield to spawned tasks until `done` holds.
///
/// # Panics
///
/// Panics if the condition does not hold after many scheduler turns.
pub async fn settle_until(mut done: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
