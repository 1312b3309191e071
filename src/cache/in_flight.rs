//! In-flight fetch registry
//!
//! Lets concurrent read-through calls for the same key share one fetch.
//! The first caller to miss becomes the leader and holds a [`FetchGuard`];
//! later callers get a [`Waiter`] that resolves when that guard is dropped,
//! whether the fetch succeeded, failed or was cancelled. A successful leader
//! hands its value to the waiters directly, so they do not depend on the
//! value still being cached when they wake.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

/// Outcome of registering interest in a key.
pub enum Claim<V> {
    /// No fetch was running; the caller must fetch, then `complete` or drop
    /// the guard.
    Lead(FetchGuard<V>),
    /// Another caller is fetching.
    Wait(Waiter<V>),
}

struct Pending<V> {
    done: watch::Receiver<()>,
    result: Arc<Mutex<Option<V>>>,
}

pub struct InFlight<V> {
    pending: Mutex<HashMap<String, Pending<V>>>,
}

impl<V: Clone> InFlight<V> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Registers the caller as leader for `key`, or returns a handle on the
    /// fetch already running for it.
    pub fn claim(self: &Arc<Self>, key: &str) -> Claim<V> {
        let mut pending = self.pending.lock();

        if let Some(entry) = pending.get(key) {
            return Claim::Wait(Waiter {
                done: entry.done.clone(),
                result: Arc::clone(&entry.result),
            });
        }

        let (tx, rx) = watch::channel(());
        let result = Arc::new(Mutex::new(None));
        pending.insert(
            key.to_string(),
            Pending {
                done: rx,
                result: Arc::clone(&result),
            },
        );

        Claim::Lead(FetchGuard {
            registry: Arc::clone(self),
            key: key.to_string(),
            result,
            _done: tx,
        })
    }

    /// Number of keys with a fetch in progress.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }
}

/// Leadership over one key's fetch. Dropping it unregisters the key and
/// wakes every waiter.
pub struct FetchGuard<V> {
    registry: Arc<InFlight<V>>,
    key: String,
    result: Arc<Mutex<Option<V>>>,
    // never sent on; waiters are released when the sender is dropped
    _done: watch::Sender<()>,
}

impl<V> FetchGuard<V> {
    /// Publishes the fetched value to waiters and releases them.
    pub fn complete(self, value: V) {
        *self.result.lock() = Some(value);
    }
}

impl<V> Drop for FetchGuard<V> {
    fn drop(&mut self) {
        self.registry.pending.lock().remove(&self.key);
    }
}

/// Handle on another caller's fetch.
pub struct Waiter<V> {
    done: watch::Receiver<()>,
    result: Arc<Mutex<Option<V>>>,
}

impl<V: Clone> Waiter<V> {
    /// Waits for the leader to finish. Returns its value if it succeeded,
    /// `None` if it failed or was cancelled.
    pub async fn wait(mut self) -> Option<V> {
        // resolves with Err once the leader drops its guard
        let _ = self.done.changed().await;
        self.result.lock().clone()
    }
}
