//! Expiring Cache
//!
//! Cloneable, thread-safe handle over a [`CacheStore`]. Construct one per
//! process (or per test) and pass clones to every consumer.
//!
//! Values are handed out by clone, so a caller can never mutate the cached
//! copy in place. Store `Arc<T>` when cloning the payload is expensive.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::cache::in_flight::{Claim, InFlight};
use crate::cache::{CacheStats, CacheStore, TtlClass, TtlPolicy};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweep_task, Sweep};

/// State shared by every clone of an [`ExpiringCache`].
struct Shared<V> {
    store: Mutex<CacheStore<V>>,
    in_flight: Arc<InFlight<V>>,
    policy: TtlPolicy,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V: Clone + Send + 'static> Sweep for Shared<V> {
    fn sweep_expired(&self) -> usize {
        self.store.lock().cleanup_expired()
    }
}

impl<V> Drop for Shared<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

// == Expiring Cache ==
/// In-process key/value cache where every entry expires on its own TTL.
pub struct ExpiringCache<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for ExpiringCache<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V: Clone + Send + 'static> ExpiringCache<V> {
    // == Constructors ==
    /// Creates an empty cache with the default TTL policy.
    pub fn new() -> Self {
        Self::with_policy(TtlPolicy::default())
    }

    /// Creates an empty cache that resolves TTL classes through `policy`.
    pub fn with_policy(policy: TtlPolicy) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Mutex::new(CacheStore::new()),
                in_flight: Arc::new(InFlight::new()),
                policy,
                sweeper: Mutex::new(None),
            }),
        }
    }

    /// Creates an empty cache using the TTL policy from `config`.
    ///
    /// The sweeper is not started; call [`start_sweeper`](Self::start_sweeper)
    /// with `config.sweep_interval()`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_policy(config.ttl_policy())
    }

    // == TTL Classes ==
    /// Resolves a TTL class to a duration.
    pub fn ttl(&self, class: TtlClass) -> Duration {
        self.shared.policy.ttl_for(class)
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.shared.policy
    }

    // == Get ==
    /// Returns a clone of the live value under `key`, or `None`.
    ///
    /// An expired entry found here is removed.
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self.shared.store.lock().get(key);
        trace!(key, hit = value.is_some(), "cache get");
        value
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    ///
    /// A zero `ttl` expires immediately: afterwards `key` reads as absent.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        trace!(key = %key, ttl_ms = ttl.as_millis() as u64, "cache set");
        self.shared.store.lock().set(key, value, ttl);
    }

    /// Stores `value` under `key` with the TTL of `class`.
    pub fn set_class(&self, key: impl Into<String>, value: V, class: TtlClass) {
        self.set(key, value, self.ttl(class));
    }

    // == Invalidate ==
    /// Removes every entry whose key contains `pattern`.
    ///
    /// Intended for key families that share a prefix, e.g. `"employee:"`.
    /// An empty pattern matches every key.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let removed = self.shared.store.lock().invalidate(pattern);
        debug!(pattern, removed, "cache invalidate");
        removed
    }

    // == Clear ==
    /// Removes every entry, e.g. on logout.
    pub fn clear(&self) -> usize {
        let removed = self.shared.store.lock().clear();
        debug!(removed, "cache cleared");
        removed
    }

    // == Read-through ==
    /// Returns the cached value for `key`, or awaits `fetcher`, caches its
    /// result for `ttl` and returns it.
    ///
    /// A fetcher error is returned unchanged and nothing is cached, so the
    /// next call fetches again. Dropping the returned future before the fetch
    /// completes also leaves `key` unpopulated.
    ///
    /// Concurrent misses on the same key each run their own fetcher and the
    /// last one to finish wins. Use [`wrap_coalesced`](Self::wrap_coalesced)
    /// when duplicate fetches are too costly.
    pub async fn wrap<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetcher: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        self.fetch_and_store(key, ttl, fetcher).await
    }

    /// [`wrap`](Self::wrap) with the TTL of `class`.
    pub async fn wrap_class<F, Fut, E>(
        &self,
        key: &str,
        class: TtlClass,
        fetcher: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        self.wrap(key, self.ttl(class), fetcher).await
    }

    /// Like [`wrap`](Self::wrap), but concurrent misses on `key` share a
    /// single fetch.
    ///
    /// Callers arriving while a fetch is in flight wait for it and receive
    /// the leader's value, even when `ttl` is too short for it to still be
    /// cached. If the leading fetch failed or was cancelled, one waiter runs
    /// its own fetcher; errors are never shared between callers.
    pub async fn wrap_coalesced<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetcher: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        loop {
            if let Some(value) = self.get(key) {
                return Ok(value);
            }

            match self.shared.in_flight.claim(key) {
                Claim::Lead(guard) => {
                    // a previous leader may have stored the value after our miss
                    let cached = self.shared.store.lock().peek(key);
                    if let Some(value) = cached {
                        guard.complete(value.clone());
                        return Ok(value);
                    }
                    let result = self.fetch_and_store(key, ttl, fetcher).await;
                    if let Ok(value) = &result {
                        guard.complete(value.clone());
                    }
                    return result;
                }
                Claim::Wait(waiter) => {
                    self.shared.store.lock().stats_mut().record_coalesced();
                    trace!(key, "waiting on in-flight fetch");
                    if let Some(value) = waiter.wait().await {
                        return Ok(value);
                    }
                }
            }
        }
    }

    async fn fetch_and_store<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetcher: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        self.shared.store.lock().stats_mut().record_fetch();

        match fetcher().await {
            Ok(value) => {
                self.set(key, value.clone(), ttl);
                Ok(value)
            }
            Err(err) => {
                self.shared.store.lock().stats_mut().record_fetch_error();
                debug!(key, "fetch failed, nothing cached");
                Err(err)
            }
        }
    }

    // == Sweeper Lifecycle ==
    /// Starts the background sweep on the current tokio runtime.
    ///
    /// Returns `Ok(false)` if a sweeper is already running for this cache.
    pub fn start_sweeper(&self, interval: Duration) -> Result<bool> {
        if interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::NoRuntime);
        }

        let mut sweeper = self.shared.sweeper.lock();
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("TTL sweeper already running");
            return Ok(false);
        }

        *sweeper = Some(spawn_sweep_task(Arc::downgrade(&self.shared), interval));
        Ok(true)
    }

    /// Stops the background sweep. Returns true if one was running.
    pub fn stop_sweeper(&self) -> bool {
        match self.shared.sweeper.lock().take() {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                if was_running {
                    info!("TTL sweeper stopped");
                }
                was_running
            }
            None => false,
        }
    }

    pub fn is_sweeper_running(&self) -> bool {
        self.shared
            .sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Runs one sweep pass immediately. Returns the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        self.shared.sweep_expired()
    }

    // == Introspection ==
    /// Returns true if a live entry exists for `key`. Records no stats.
    pub fn contains_key(&self, key: &str) -> bool {
        self.shared.store.lock().contains_key(key)
    }

    /// Number of stored entries, including expired entries not yet evicted.
    pub fn len(&self) -> usize {
        self.shared.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.store.lock().is_empty()
    }

    /// Number of keys with a coalesced fetch in progress.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.shared.store.lock().stats()
    }
}

impl<V: Clone + Send + 'static> Default for ExpiringCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
