//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.
//!
//! Timestamps come from `tokio::time::Instant`, which follows the tokio
//! test clock when it is paused and the monotonic system clock otherwise.

use std::time::Duration;

use tokio::time::Instant;

/// Longest freshness window an entry can have (30 years)
pub const MAX_TTL: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// Represents a single cache entry with value and expiration.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was written
    pub created_at: Instant,
    /// When the entry stops being served
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` after `now`.
    ///
    /// TTLs longer than [`MAX_TTL`] are capped to it.
    pub fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now + ttl.min(MAX_TTL),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now` reaches `expires_at`, so an entry is
    /// never served at its exact expiration instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Checks if the entry has expired at the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}
