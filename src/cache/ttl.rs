//! TTL Classes
//!
//! Named freshness policies. Callers pick a class per kind of data instead of
//! scattering raw durations across the code base.

use std::fmt;
use std::time::Duration;

/// Default TTL for long-lived reference data (1 hour)
pub const DEFAULT_REFERENCE_TTL: Duration = Duration::from_secs(60 * 60);

/// Default TTL for ordinary data (5 minutes)
pub const DEFAULT_STANDARD_TTL: Duration = Duration::from_secs(5 * 60);

/// Default TTL for highly volatile transactional data (30 seconds)
pub const DEFAULT_VOLATILE_TTL: Duration = Duration::from_secs(30);

// == TTL Class ==
/// Volatility group a cache key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlClass {
    /// Rarely changing data such as branch lists or branding settings
    Reference,
    /// Directory-style data that changes occasionally
    Standard,
    /// Transactional data such as attendance or cash-desk records
    Volatile,
}

impl TtlClass {
    pub const ALL: [TtlClass; 3] = [TtlClass::Reference, TtlClass::Standard, TtlClass::Volatile];

    pub fn as_str(&self) -> &'static str {
        match self {
            TtlClass::Reference => "reference",
            TtlClass::Standard => "standard",
            TtlClass::Volatile => "volatile",
        }
    }
}

impl fmt::Display for TtlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == TTL Policy ==
/// Maps each [`TtlClass`] to a concrete duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub reference: Duration,
    pub standard: Duration,
    pub volatile: Duration,
}

impl TtlPolicy {
    /// Returns the duration configured for `class`.
    pub fn ttl_for(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Reference => self.reference,
            TtlClass::Standard => self.standard,
            TtlClass::Volatile => self.volatile,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            reference: DEFAULT_REFERENCE_TTL,
            standard: DEFAULT_STANDARD_TTL,
            volatile: DEFAULT_VOLATILE_TTL,
        }
    }
}
