//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of reads that returned a live value
    pub hits: u64,
    /// Number of reads that found nothing or an expired entry
    pub misses: u64,
    /// Number of writes
    pub sets: u64,
    /// Entries removed lazily because a read found them expired
    pub expirations: u64,
    /// Entries removed by sweep passes
    pub swept: u64,
    /// Number of completed sweep passes
    pub sweeps: u64,
    /// Entries removed by `invalidate`
    pub invalidated: u64,
    /// Entries removed by `clear`
    pub cleared: u64,
    /// Fetcher invocations made by read-through calls
    pub fetches: u64,
    /// Fetcher invocations that returned an error
    pub fetch_errors: u64,
    /// Read-through calls that waited on another caller's fetch
    pub coalesced: u64,
    /// Time of the last completed sweep pass
    pub last_sweep_at: Option<DateTime<Utc>>,
    /// Current number of stored entries, expired-but-unswept included
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Sweep ==
    /// Records a completed sweep pass that removed `removed` entries.
    pub fn record_sweep(&mut self, removed: usize) {
        self.sweeps += 1;
        self.swept += removed as u64;
        self.last_sweep_at = Some(Utc::now());
    }

    pub fn record_invalidation(&mut self, removed: usize) {
        self.invalidated += removed as u64;
    }

    pub fn record_clear(&mut self, removed: usize) {
        self.cleared += removed as u64;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_fetch_error(&mut self) {
        self.fetch_errors += 1;
    }

    pub fn record_coalesced(&mut self) {
        self.coalesced += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
