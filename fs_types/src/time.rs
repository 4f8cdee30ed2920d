//! Timestamps and the clock abstraction
//!
//! Node records carry creation/modification/access instants. The instants
//! come from a [`Clock`] so registries can run against real time in
//! production and a fixed time in tests.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A point in time, in nanoseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds since the epoch
    pub fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Returns nanoseconds since the epoch
    pub fn as_nanos(&self) -> u64 {
        self.nanos
    }
}

/// Source of "now" for node timestamps
pub trait Clock: Send + Sync {
    /// Returns the current instant
    fn now(&self) -> Timestamp;
}

/// Clock backed by the host system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Timestamp::from_nanos(nanos)
    }
}

/// Clock that always reports the same instant (for deterministic tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: Timestamp,
}

impl FixedClock {
    /// Creates a fixed clock pinned to the given instant
    pub fn at(at: Timestamp) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.at
    }
}
