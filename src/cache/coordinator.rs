//! Single-flight resolution on top of [`CacheStore`].

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, trace};

use super::store::CacheStore;

/// Shared result slot for one outstanding fetch. `None` until it settles.
type Slot<V, E> = watch::Receiver<Option<Result<V, E>>>;

type InflightMap<K, V, E> = Mutex<HashMap<K, Slot<V, E>>>;

/// Why [`FetchCoordinator::resolve`] produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError<E> {
    /// The fetch ran and failed; every caller waiting on it sees this error.
    #[error("{0}")]
    Fetch(E),

    /// The fetch task ended without reporting a result (it panicked or the
    /// runtime shut down).
    #[error("fetch ended without a result")]
    Abandoned,
}

/// Collapses concurrent lookups of the same key into one fetch.
///
/// A fresh cached value is returned straight away. On a miss the first caller
/// for a key spawns the fetch on its own task and publishes a result slot;
/// callers arriving while it runs wait on that slot instead of fetching
/// again. A successful result is written to the store before anyone is
/// released; a failure is handed to the waiters and forgotten.
///
/// Because the fetch runs on its own task, a waiter that is dropped (for
/// example by a request timeout) does not cancel it.
#[derive(Debug)]
pub struct FetchCoordinator<K, V, E> {
    store: Arc<CacheStore<K, V>>,
    inflight: Arc<InflightMap<K, V, E>>,
}

impl<K, V, E> FetchCoordinator<K, V, E>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<CacheStore<K, V>>) -> Self {
        Self {
            store,
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &Arc<CacheStore<K, V>> {
        &self.store
    }

    /// Number of keys with a fetch currently outstanding.
    pub fn inflight(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Resolve `key`, fetching it with `fetch` only if no fresh value is
    /// cached and no fetch for it is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn resolve<F, Fut>(
        &self,
        key: K,
        ttl: Duration,
        fetch: F,
    ) -> Result<V, ResolveError<E>>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        if let Some(value) = self.store.get(&key) {
            trace!("cache hit");
            return Ok(value);
        }

        let (mut slot, start) = {
            let mut inflight = self.inflight.lock();
            // A fetch may have landed between the first lookup and the lock
            if let Some(value) = self.store.get(&key) {
                return Ok(value);
            }
            match inflight.get(&key) {
                Some(slot) => {
                    trace!("joining outstanding fetch");
                    (slot.clone(), None)
                }
                None => {
                    debug!("cache miss, starting fetch");
                    let (tx, rx) = watch::channel(None);
                    inflight.insert(key.clone(), rx.clone());
                    let guard = InflightGuard {
                        key: key.clone(),
                        inflight: self.inflight.clone(),
                    };
                    (rx, Some((tx, guard)))
                }
            }
        };

        // The fetch is built and spawned outside the lock. If either step
        // panics the guard unwinds with it and the slot is cleared.
        if let Some((tx, guard)) = start {
            let fut = fetch(key);
            self.spawn_fetch(guard, ttl, fut, tx);
        }

        let settled = slot.wait_for(Option::is_some).await;
        match settled.as_deref() {
            Ok(Some(Ok(value))) => Ok(value.clone()),
            Ok(Some(Err(err))) => Err(ResolveError::Fetch(err.clone())),
            Ok(None) | Err(_) => Err(ResolveError::Abandoned),
        }
    }

    fn spawn_fetch<Fut>(
        &self,
        guard: InflightGuard<K, V, E>,
        ttl: Duration,
        fetch: Fut,
        tx: watch::Sender<Option<Result<V, E>>>,
    ) where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let store = self.store.clone();

        tokio::spawn(async move {
            let outcome = fetch.await;
            if let Ok(value) = &outcome {
                store.put(guard.key.clone(), value.clone(), ttl);
            }
            // Clear the slot before publishing so a caller that sees the
            // result and immediately retries never joins a settled fetch.
            drop(guard);
            tx.send_replace(Some(outcome));
        });
    }
}

/// Removes a key's in-flight slot when the fetch task finishes, including
/// when it unwinds.
struct InflightGuard<K, V, E>
where
    K: Eq + Hash,
{
    key: K,
    inflight: Arc<InflightMap<K, V, E>>,
}

impl<K, V, E> Drop for InflightGuard<K, V, E>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        self.inflight.lock().remove(&self.key);
    }
}
