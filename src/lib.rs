//! TTL Cache - An in-process expiring cache
//!
//! Memoizes reads from a slow remote source for a bounded time, with TTL
//! classes, substring invalidation, read-through fetching and a background
//! sweep.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{ExpiringCache, TtlClass, TtlPolicy};
pub use config::Config;
pub use error::CacheError;
