//! Keyed query cache with per-key generations.
//!
//! A mutation takes ownership of a key with [`QueryStore::begin`], which
//! hands back a [`Lease`]. Writes made through the lease land only while no
//! newer lease or external write has happened since. Every write bumps the
//! key's generation except the owner's optimistic update and conditional
//! fetch writes ([`QueryStore::write_if`]).
//!
//! Fetches hold a [`FetchTicket`] instead. A fetch result is written only
//! when the generation is unchanged and no lease on the key is outstanding,
//! so it never replaces an optimistic value.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

/// Name of a cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey(&'static str);

impl QueryKey {
    /// The shopper's cart.
    pub const CART: Self = Self("cart");

    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

struct Slot<V> {
    value: Option<V>,
    generation: u64,
    /// Leases taken and not yet dropped.
    leases: usize,
    signal: watch::Sender<u64>,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            value: None,
            generation: 0,
            leases: 0,
            signal: watch::Sender::new(0),
        }
    }
}

impl<V> Slot<V> {
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.signal.send_replace(self.generation);
        self.generation
    }
}

/// Ownership of one key for the duration of a mutation.
///
/// Holds the value seen before the mutation touched the cache so it can be
/// put back verbatim on failure. Fetch writes to the key are refused until
/// every outstanding lease is dropped.
#[derive(Debug)]
pub struct Lease<'s, V> {
    store: &'s QueryStore<V>,
    key: QueryKey,
    generation: u64,
    snapshot: Option<V>,
}

impl<V> Lease<'_, V> {
    #[must_use]
    pub const fn key(&self) -> QueryKey {
        self.key
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The cached value captured when the lease was taken.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&V> {
        self.snapshot.as_ref()
    }
}

impl<V> Drop for Lease<'_, V> {
    fn drop(&mut self) {
        self.store.release(self.key);
    }
}

/// A fetch's view of a key, taken before going to the network.
#[derive(Debug)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
    changed: watch::Receiver<u64>,
}

impl FetchTicket {
    #[must_use]
    pub const fn key(&self) -> QueryKey {
        self.key
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves once a mutation or an external write changes the key.
    ///
    /// Never resolves if the store is dropped first.
    pub async fn superseded(&mut self) {
        let generation = self.generation;
        let closed = self.changed.wait_for(|g| *g != generation).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// In-memory query cache shared between the views of one session.
pub struct QueryStore<V> {
    slots: Mutex<HashMap<QueryKey, Slot<V>>>,
}

impl<V> Default for QueryStore<V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> std::fmt::Debug for QueryStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<QueryKey> = self.lock().keys().copied().collect();
        f.debug_struct("QueryStore").field("keys", &keys).finish()
    }
}

impl<V> QueryStore<V> {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, key: QueryKey) {
        if let Some(slot) = self.lock().get_mut(&key) {
            slot.leases = slot.leases.saturating_sub(1);
        }
    }

    /// Whether a mutation on `key` is still in flight.
    #[must_use]
    pub fn is_pending(&self, key: QueryKey) -> bool {
        self.lock().get(&key).is_some_and(|slot| slot.leases > 0)
    }

    /// Current generation of `key` (0 if never written).
    #[must_use]
    pub fn generation(&self, key: QueryKey) -> u64 {
        self.lock().get(&key).map_or(0, |slot| slot.generation)
    }

    /// Record the state of `key` before fetching it.
    pub fn watch(&self, key: QueryKey) -> FetchTicket {
        let mut slots = self.lock();
        let slot = slots.entry(key).or_default();
        FetchTicket {
            key,
            generation: slot.generation,
            changed: slot.signal.subscribe(),
        }
    }

    /// Drop the cached value. Supersedes any mutation in flight on `key`.
    pub fn invalidate(&self, key: QueryKey) {
        let mut slots = self.lock();
        if let Some(slot) = slots.get_mut(&key) {
            slot.value = None;
            slot.bump();
        }
    }

    /// Write `value` only if `key` is still at `generation` and no mutation
    /// holds a lease on it.
    ///
    /// Used by plain fetches: the fetch records the generation before going
    /// to the network and loses to anything that happened meanwhile. The
    /// generation is left unchanged.
    pub fn write_if(&self, key: QueryKey, generation: u64, value: V) -> bool {
        let mut slots = self.lock();
        let slot = slots.entry(key).or_default();
        if slot.generation != generation || slot.leases > 0 {
            return false;
        }
        slot.value = Some(value);
        true
    }

    /// Whether `lease` still owns its key.
    #[must_use]
    pub fn is_current(&self, lease: &Lease<'_, V>) -> bool {
        self.generation(lease.key) == lease.generation
    }
}

impl<V: Clone> QueryStore<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value, including any optimistic change in flight.
    #[must_use]
    pub fn get(&self, key: QueryKey) -> Option<V> {
        self.lock().get(&key).and_then(|slot| slot.value.clone())
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, key: QueryKey, f: impl FnOnce(Option<&V>) -> R) -> R {
        f(self.lock().get(&key).and_then(|slot| slot.value.as_ref()))
    }

    /// Unconditional write. Supersedes any mutation in flight on `key`.
    pub fn set(&self, key: QueryKey, value: V) {
        let mut slots = self.lock();
        let slot = slots.entry(key).or_default();
        slot.value = Some(value);
        slot.bump();
    }

    /// Take ownership of `key` for a mutation.
    pub fn begin(&self, key: QueryKey) -> Lease<'_, V> {
        let mut slots = self.lock();
        let slot = slots.entry(key).or_default();
        let generation = slot.bump();
        slot.leases += 1;
        Lease {
            store: self,
            key,
            generation,
            snapshot: slot.value.clone(),
        }
    }

    /// Run `f` on the slot if `lease` owns it. Settling writes end the
    /// lease, so fetches that started while it was in flight are discarded.
    fn apply_if_current(
        &self,
        lease: &Lease<'_, V>,
        settles: bool,
        f: impl FnOnce(&mut Option<V>),
    ) -> bool {
        let mut slots = self.lock();
        match slots.get_mut(&lease.key) {
            Some(slot) if slot.generation == lease.generation => {
                f(&mut slot.value);
                if settles {
                    slot.bump();
                }
                true
            }
            _ => false,
        }
    }

    /// Replace the cached value with `f(current)`.
    ///
    /// Nothing happens when the key holds no value.
    pub fn update_if_current(&self, lease: &Lease<'_, V>, f: impl FnOnce(&V) -> V) -> bool {
        self.apply_if_current(lease, false, |value| {
            if let Some(current) = value.as_ref() {
                *value = Some(f(current));
            }
        })
    }

    pub fn write_if_current(&self, lease: &Lease<'_, V>, new_value: V) -> bool {
        self.apply_if_current(lease, true, |value| *value = Some(new_value))
    }

    /// Put back the value captured by [`begin`](Self::begin).
    pub fn restore_if_current(&self, lease: &Lease<'_, V>) -> bool {
        let snapshot = lease.snapshot.clone();
        self.apply_if_current(lease, true, |value| *value = snapshot)
    }

    pub fn evict_if_current(&self, lease: &Lease<'_, V>) -> bool {
        self.apply_if_current(lease, true, |value| *value = None)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const KEY: QueryKey = QueryKey::new("test");

    #[test]
    fn test_set_and_get() {
        let store = QueryStore::new();
        assert_eq!(store.get(KEY), None);
        assert_eq!(store.generation(KEY), 0);

        store.set(KEY, 1);
        assert_eq!(store.get(KEY), Some(1));
        assert_eq!(store.generation(KEY), 1);

        store.invalidate(KEY);
        assert_eq!(store.get(KEY), None);
        assert_eq!(store.generation(KEY), 2);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let lease = store.begin(QueryKey::CART);
        store.set(KEY, 2);

        assert!(store.is_current(&lease));
        assert!(!store.is_pending(KEY));
        assert!(store.write_if(KEY, store.generation(KEY), 3));
        assert_eq!(store.generation(QueryKey::CART), 1);
    }

    #[test]
    fn test_begin_captures_snapshot() {
        let store = QueryStore::new();
        store.set(KEY, 10);

        let lease = store.begin(KEY);
        assert_eq!(lease.snapshot(), Some(&10));
        assert!(store.update_if_current(&lease, |v| v + 5));
        assert_eq!(store.get(KEY), Some(15));

        assert!(store.restore_if_current(&lease));
        assert_eq!(store.get(KEY), Some(10));

        // Settled: the lease is spent
        assert!(!store.is_current(&lease));
    }

    #[test]
    fn test_lease_is_pending_until_dropped() {
        let store = QueryStore::new();
        store.set(KEY, 1);

        let first = store.begin(KEY);
        let second = store.begin(KEY);
        assert!(store.is_pending(KEY));

        drop(first);
        assert!(store.is_pending(KEY));
        drop(second);
        assert!(!store.is_pending(KEY));
    }

    #[test]
    fn test_fetch_during_mutation_keeps_optimistic_value() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let lease = store.begin(KEY);
        assert!(store.update_if_current(&lease, |v| v + 2));

        let ticket = store.watch(KEY);
        assert!(!store.write_if(KEY, ticket.generation(), 1));
        assert_eq!(store.get(KEY), Some(3));

        drop(lease);
        assert!(store.write_if(KEY, ticket.generation(), 1));
        assert_eq!(store.get(KEY), Some(1));
    }

    #[test]
    fn test_fetch_started_during_mutation_is_discarded_after_settle() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let lease = store.begin(KEY);
        let ticket = store.watch(KEY);

        assert!(store.write_if_current(&lease, 2));
        drop(lease);

        assert!(!store.write_if(KEY, ticket.generation(), 0));
        assert_eq!(store.get(KEY), Some(2));
    }

    #[test]
    fn test_fetch_started_before_mutation_is_discarded() {
        let store = QueryStore::new();
        let ticket = store.watch(KEY);

        let lease = store.begin(KEY);
        drop(lease);

        assert!(!store.write_if(KEY, ticket.generation(), 1));
        assert_eq!(store.get(KEY), None);
    }

    #[test]
    fn test_update_without_value_is_noop() {
        let store: QueryStore<i32> = QueryStore::new();
        let lease = store.begin(KEY);
        assert!(store.update_if_current(&lease, |v| v + 1));
        assert_eq!(store.get(KEY), None);
    }

    #[test]
    fn test_newer_lease_discards_older_writes() {
        let store = QueryStore::new();
        store.set(KEY, 1);

        let first = store.begin(KEY);
        let second = store.begin(KEY);

        assert!(!store.is_current(&first));
        assert!(!store.write_if_current(&first, 100));
        assert!(!store.restore_if_current(&first));
        assert!(!store.evict_if_current(&first));
        assert_eq!(store.get(KEY), Some(1));

        assert!(store.write_if_current(&second, 2));
        assert_eq!(store.get(KEY), Some(2));
    }

    #[test]
    fn test_external_write_supersedes_lease() {
        let store = QueryStore::new();
        let lease = store.begin(KEY);
        store.set(KEY, 7);

        assert!(!store.write_if_current(&lease, 8));
        assert_eq!(store.get(KEY), Some(7));
    }

    #[tokio::test]
    async fn test_ticket_superseded_on_begin() {
        let store: QueryStore<i32> = QueryStore::new();
        let mut ticket = store.watch(KEY);

        let pending = tokio::time::timeout(Duration::from_millis(20), ticket.superseded()).await;
        assert!(pending.is_err());

        let _lease = store.begin(KEY);
        let resolved = tokio::time::timeout(Duration::from_millis(20), ticket.superseded()).await;
        assert!(resolved.is_ok());
    }

    #[tokio::test]
    async fn test_ticket_superseded_on_invalidate() {
        let store = QueryStore::new();
        store.set(KEY, 1);
        let mut ticket = store.watch(KEY);

        store.invalidate(KEY);
        let resolved = tokio::time::timeout(Duration::from_millis(20), ticket.superseded()).await;
        assert!(resolved.is_ok());
    }
}
