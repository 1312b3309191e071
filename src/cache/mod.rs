//! Cache Module
//!
//! Provides an in-process key/value cache with per-entry TTL expiration,
//! substring invalidation and read-through fetching.

mod entry;
mod expiring;
mod in_flight;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::CacheEntry;
pub use expiring::ExpiringCache;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use ttl::{
    TtlClass, TtlPolicy, DEFAULT_REFERENCE_TTL, DEFAULT_STANDARD_TTL, DEFAULT_VOLATILE_TTL,
};

// == Public Constants ==
/// Default interval between background sweep passes
pub const DEFAULT_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);
