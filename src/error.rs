//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Cache reads and writes
//! are infallible; only lifecycle and configuration can fail. Fetcher errors
//! in `wrap` are returned in the caller's own error type.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache lifecycle and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The sweeper was started outside a tokio runtime
    #[error("No tokio runtime available to spawn the sweeper")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
