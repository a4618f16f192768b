//! Time source for node metadata.
//!
//! Every `created_at` / `modified_at` in the namespace comes from a [`Clock`].
//! Production code uses [`SystemClock`]; tests inject a [`TickClock`] so
//! timestamps are deterministic and strictly increasing.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A point in time, in microseconds since the Unix epoch.
///
/// Only a [`Clock`] produces these. Comparable, and never decreasing for a
/// given clock.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Microseconds since the Unix epoch.
    pub fn as_micros(&self) -> u64 {
        self.0
    }

    /// Convert to a `SystemTime`.
    pub fn to_system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_micros(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / 1_000_000, self.0 % 1_000_000)
    }
}

/// Source of timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock, clamped so it never runs backwards.
///
/// If the system time steps back (NTP adjustment, manual change), the last
/// value handed out is repeated until the wall clock catches up.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        let prev = self.last.fetch_max(wall, Ordering::AcqRel);
        Timestamp(prev.max(wall))
    }
}

/// Deterministic clock that advances by a fixed step on every call.
#[derive(Debug)]
pub struct TickClock {
    next: AtomicU64,
    step: u64,
}

impl TickClock {
    /// Start at `start` microseconds and advance by `step` per call.
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
            step,
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(1_000_000, 1)
    }
}

impl Clock for TickClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.next.fetch_add(self.step, Ordering::AcqRel))
    }
}
