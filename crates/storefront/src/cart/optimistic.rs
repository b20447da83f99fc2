//! Optimistic update with rollback.
//!
//! A mutation moves through these states:
//!
//! ```text
//! begin ──▶ optimistic value visible ──▶ request ──┬─▶ committed
//!                                                  ├─▶ rolled back (+ one error notification)
//!                                                  └─▶ stale (cache left to the newer owner)
//! ```
//!
//! Requests always run to completion. A newer operation on the same key
//! only takes the cache away from an older one.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::store::{QueryKey, QueryStore};
use super::SyncError;
use crate::api::ApiError;
use crate::notify::Notifier;

/// Applied when a request takes longer and no timeout was configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const FALLBACK_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// What to do with the cache once the request succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settle<V> {
    /// Store the authoritative value from the response.
    Replace(V),
    /// Drop the entry; the caller refetches.
    Evict,
}

type Transform<'s, V> = Box<dyn FnOnce(&V) -> V + Send + 's>;

/// One optimistic change to a cached value.
///
/// ```rust,ignore
/// let cart = OptimisticMutation::new(&store, QueryKey::CART, "change_quantity", &notifier)
///     .optimistic(move |cart| set_item_quantity(cart, item_id, 5))
///     .on_failure("Could not update quantity")
///     .run(backend.update_item_quantity(item_id, 5), |cart| Settle::Replace(cart.clone()))
///     .await?;
/// ```
pub struct OptimisticMutation<'s, V> {
    store: &'s QueryStore<V>,
    key: QueryKey,
    label: &'static str,
    transform: Option<Transform<'s, V>>,
    notifier: &'s dyn Notifier,
    timeout: Duration,
    failure_message: &'static str,
    success_message: Option<&'static str>,
}

impl<'s, V: Clone> OptimisticMutation<'s, V> {
    #[must_use]
    pub fn new(
        store: &'s QueryStore<V>,
        key: QueryKey,
        label: &'static str,
        notifier: &'s dyn Notifier,
    ) -> Self {
        Self {
            store,
            key,
            label,
            transform: None,
            notifier,
            timeout: DEFAULT_TIMEOUT,
            failure_message: FALLBACK_FAILURE_MESSAGE,
            success_message: None,
        }
    }

    /// Local change shown while the request is in flight.
    #[must_use]
    pub fn optimistic(mut self, transform: impl FnOnce(&V) -> V + Send + 's) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Message shown on failure when the backend sent none.
    #[must_use]
    pub const fn on_failure(mut self, message: &'static str) -> Self {
        self.failure_message = message;
        self
    }

    #[must_use]
    pub const fn on_success(mut self, message: &'static str) -> Self {
        self.success_message = Some(message);
        self
    }

    /// Apply the local change, await `request`, then settle the cache.
    ///
    /// When a newer operation took the key meanwhile, the response is not
    /// written and a failure does not roll back; the shopper is still told
    /// about the outcome.
    ///
    /// # Errors
    ///
    /// [`SyncError::Request`] or [`SyncError::TimedOut`], after one error
    /// notification and, if the key is still owned, a rollback.
    pub async fn run<T, F, S>(self, request: F, settle: S) -> Result<T, SyncError>
    where
        F: Future<Output = Result<T, ApiError>>,
        S: FnOnce(&T) -> Settle<V>,
    {
        let lease = self.store.begin(self.key);
        if let Some(transform) = self.transform {
            self.store.update_if_current(&lease, transform);
        }
        debug!(
            mutation = self.label,
            key = %self.key,
            generation = lease.generation(),
            "Optimistic update applied"
        );

        let outcome = flatten(tokio::time::timeout(self.timeout, request).await, self.timeout);

        match outcome {
            Ok(response) => {
                let committed = match settle(&response) {
                    Settle::Replace(value) => self.store.write_if_current(&lease, value),
                    Settle::Evict => self.store.evict_if_current(&lease),
                };
                if !committed {
                    warn!(
                        mutation = self.label,
                        generation = lease.generation(),
                        "Discarded stale response"
                    );
                }
                if let Some(message) = self.success_message {
                    self.notifier.success(message);
                }
                Ok(response)
            }
            Err(err) => {
                if self.store.restore_if_current(&lease) {
                    warn!(mutation = self.label, error = %err, "Rolled back optimistic update");
                } else {
                    warn!(mutation = self.label, error = %err, "Stale operation failed; rollback skipped");
                }
                self.notifier
                    .error(err.user_message().unwrap_or(self.failure_message));
                Err(err)
            }
        }
    }
}

fn flatten<T>(
    result: Result<Result<T, ApiError>, tokio::time::error::Elapsed>,
    timeout: Duration,
) -> Result<T, SyncError> {
    match result {
        Ok(inner) => inner.map_err(SyncError::from),
        Err(_) => Err(SyncError::TimedOut(timeout)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::oneshot;

    use super::*;
    use crate::notify::MockNotifier;

    const KEY: QueryKey = QueryKey::new("counter");

    fn server_error(message: &str) -> ApiError {
        ApiError::Server {
            status: 422,
            message: Some(message.to_string()),
        }
    }

    fn silent() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_success().never();
        notifier.expect_error().never();
        notifier
    }

    #[tokio::test]
    async fn test_commit_replaces_value() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_success()
            .withf(|m| m == "Saved")
            .times(1)
            .return_const(());

        let result = OptimisticMutation::new(&store, KEY, "inc", &notifier)
            .optimistic(|v| v + 1)
            .on_success("Saved")
            .run(async { Ok::<_, ApiError>(5) }, |v| Settle::Replace(*v))
            .await;

        assert_eq!(result.unwrap(), 5);
        assert_eq!(store.get(KEY), Some(5));
    }

    #[tokio::test]
    async fn test_evict_drops_value() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let notifier = silent();

        OptimisticMutation::new(&store, KEY, "evict", &notifier)
            .run(async { Ok::<_, ApiError>(()) }, |_| Settle::Evict)
            .await
            .unwrap();

        assert_eq!(store.get(KEY), None);
    }

    #[tokio::test]
    async fn test_failure_restores_snapshot_and_notifies_once() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .withf(|m| m == "Out of stock")
            .times(1)
            .return_const(());

        let result = OptimisticMutation::new(&store, KEY, "inc", &notifier)
            .optimistic(|v| v + 1)
            .on_failure("Could not update")
            .run(async { Err::<i32, _>(server_error("Out of stock")) }, |v| {
                Settle::Replace(*v)
            })
            .await;

        assert!(matches!(result, Err(SyncError::Request(_))));
        assert_eq!(store.get(KEY), Some(1));
    }

    #[tokio::test]
    async fn test_failure_without_message_uses_fallback() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .withf(|m| m == "Could not update")
            .times(1)
            .return_const(());

        let _ = OptimisticMutation::new(&store, KEY, "inc", &notifier)
            .on_failure("Could not update")
            .run(async { Err::<i32, _>(ApiError::RateLimited(1)) }, |v| {
                Settle::Replace(*v)
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_rolls_back() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let mut notifier = MockNotifier::new();
        notifier.expect_error().times(1).return_const(());

        let result = OptimisticMutation::new(&store, KEY, "slow", &notifier)
            .optimistic(|v| v * 10)
            .timeout(Duration::from_secs(2))
            .run(std::future::pending::<Result<i32, ApiError>>(), |v| {
                Settle::Replace(*v)
            })
            .await;

        assert!(matches!(result, Err(SyncError::TimedOut(d)) if d == Duration::from_secs(2)));
        assert_eq!(store.get(KEY), Some(1));
    }

    #[tokio::test]
    async fn test_older_request_completes_after_newer_mutation() {
        let store = Arc::new(QueryStore::new());
        store.set(KEY, 1);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_success()
            .withf(|m| m == "Saved")
            .times(2)
            .return_const(());
        notifier.expect_error().never();
        let notifier = Arc::new(notifier);
        let (tx, rx) = oneshot::channel::<Result<i32, ApiError>>();

        let first = tokio::spawn({
            let store = Arc::clone(&store);
            let notifier = Arc::clone(&notifier);
            async move {
                OptimisticMutation::new(&store, KEY, "first", notifier.as_ref())
                    .optimistic(|v| v + 1)
                    .on_success("Saved")
                    .run(async move { rx.await.unwrap() }, |v| Settle::Replace(*v))
                    .await
            }
        });
        while store.generation(KEY) < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.get(KEY), Some(2));

        let second = OptimisticMutation::new(&store, KEY, "second", notifier.as_ref())
            .optimistic(|v| v + 1)
            .on_success("Saved")
            .run(async { Ok::<_, ApiError>(7) }, |v| Settle::Replace(*v))
            .await;
        assert_eq!(second.unwrap(), 7);
        assert!(!first.is_finished());

        tx.send(Ok(6)).unwrap();
        assert_eq!(first.await.unwrap().unwrap(), 6);
        assert_eq!(store.get(KEY), Some(7));
        assert!(!store.is_pending(KEY));
    }

    #[tokio::test]
    async fn test_stale_success_is_discarded() {
        let store = Arc::new(QueryStore::new());
        store.set(KEY, 1);
        let notifier = Arc::new(silent());
        let (tx, rx) = oneshot::channel::<Result<i32, ApiError>>();

        let slow = tokio::spawn({
            let store = Arc::clone(&store);
            let notifier = Arc::clone(&notifier);
            async move {
                OptimisticMutation::new(&store, KEY, "slow", notifier.as_ref())
                    .run(async move { rx.await.unwrap() }, |v| Settle::Replace(*v))
                    .await
            }
        });
        while store.generation(KEY) < 2 {
            tokio::task::yield_now().await;
        }

        store.set(KEY, 50);
        tx.send(Ok(99)).unwrap();

        assert_eq!(slow.await.unwrap().unwrap(), 99);
        assert_eq!(store.get(KEY), Some(50));
    }

    #[tokio::test]
    async fn test_stale_failure_skips_rollback_but_notifies() {
        let store = Arc::new(QueryStore::new());
        store.set(KEY, 1);
        let mut notifier = MockNotifier::new();
        notifier
            .expect_error()
            .withf(|m| m == "Payment declined")
            .times(1)
            .return_const(());
        notifier.expect_success().never();
        let notifier = Arc::new(notifier);
        let (tx, rx) = oneshot::channel::<Result<i32, ApiError>>();

        let slow = tokio::spawn({
            let store = Arc::clone(&store);
            let notifier = Arc::clone(&notifier);
            async move {
                OptimisticMutation::new(&store, KEY, "slow", notifier.as_ref())
                    .optimistic(|v| v + 1)
                    .run(async move { rx.await.unwrap() }, |v| Settle::Replace(*v))
                    .await
            }
        });
        while store.generation(KEY) < 2 {
            tokio::task::yield_now().await;
        }

        store.set(KEY, 50);
        tx.send(Err(server_error("Payment declined"))).unwrap();

        assert!(matches!(slow.await.unwrap(), Err(SyncError::Request(_))));
        assert_eq!(store.get(KEY), Some(50));
    }
}
