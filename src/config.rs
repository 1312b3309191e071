//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{
    TtlPolicy, DEFAULT_REFERENCE_TTL, DEFAULT_STANDARD_TTL, DEFAULT_SWEEP_INTERVAL,
    DEFAULT_VOLATILE_TTL,
};
use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Seconds between background sweep passes
    pub sweep_interval: u64,
    /// TTL in seconds for reference data
    pub ttl_reference: u64,
    /// TTL in seconds for standard data
    pub ttl_standard: u64,
    /// TTL in seconds for volatile data
    pub ttl_volatile: u64,
    /// Seconds between stats log lines in the host binary, 0 disables
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SWEEP_INTERVAL` - Sweep cadence in seconds (default: 60)
    /// - `CACHE_TTL_REFERENCE` - Reference-class TTL in seconds (default: 3600)
    /// - `CACHE_TTL_STANDARD` - Standard-class TTL in seconds (default: 300)
    /// - `CACHE_TTL_VOLATILE` - Volatile-class TTL in seconds (default: 30)
    /// - `CACHE_STATS_INTERVAL` - Stats log cadence in seconds (default: 300)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_interval: env_u64("CACHE_SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            ttl_reference: env_u64("CACHE_TTL_REFERENCE").unwrap_or(defaults.ttl_reference),
            ttl_standard: env_u64("CACHE_TTL_STANDARD").unwrap_or(defaults.ttl_standard),
            ttl_volatile: env_u64("CACHE_TTL_VOLATILE").unwrap_or(defaults.ttl_volatile),
            stats_interval: env_u64("CACHE_STATS_INTERVAL").unwrap_or(defaults.stats_interval),
        }
    }

    /// Rejects zero sweep intervals and zero TTLs.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "CACHE_SWEEP_INTERVAL must be greater than zero".to_string(),
            ));
        }

        for (name, value) in [
            ("CACHE_TTL_REFERENCE", self.ttl_reference),
            ("CACHE_TTL_STANDARD", self.ttl_standard),
            ("CACHE_TTL_VOLATILE", self.ttl_volatile),
        ] {
            if value == 0 {
                return Err(CacheError::InvalidConfig(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    /// Returns the stats log cadence, or `None` when disabled.
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval > 0).then(|| Duration::from_secs(self.stats_interval))
    }

    pub fn ttl_policy(&self) -> TtlPolicy {
        TtlPolicy {
            reference: Duration::from_secs(self.ttl_reference),
            standard: Duration::from_secs(self.ttl_standard),
            volatile: Duration::from_secs(self.ttl_volatile),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL.as_secs(),
            ttl_reference: DEFAULT_REFERENCE_TTL.as_secs(),
            ttl_standard: DEFAULT_STANDARD_TTL.as_secs(),
            ttl_volatile: DEFAULT_VOLATILE_TTL.as_secs(),
            stats_interval: 300,
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
