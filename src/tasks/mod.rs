//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is alive.
//!
//! # Tasks
//! - TTL Sweep: Removes expired cache entries at a fixed cadence

mod sweep;

pub use sweep::{spawn_sweep_task, Sweep};
