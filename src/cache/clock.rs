//! Tick Clock Module
//!
//! Process-wide time base for the scheduler. Ticks are always derived from
//! elapsed time since start, never from counting timer fires, so a delayed or
//! skipped timer fire does not shift later ticks.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

// == Cache Settings ==
/// Process-wide scheduling settings.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Monotonic reference point for tick arithmetic
    start: Instant,
    /// Wall-clock time at which the cache was created
    started_at: DateTime<Utc>,
    /// Duration of one tick in milliseconds (never zero)
    tick_interval_ms: u64,
}

impl CacheSettings {
    // == Constructor ==
    /// Creates settings anchored at the current instant.
    ///
    /// A zero interval is clamped to one millisecond.
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            start: Instant::now(),
            started_at: Utc::now(),
            tick_interval_ms: tick_interval_ms.max(1),
        }
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // == Elapsed Ticks ==
    /// Returns `floor((now - start) / tick_interval)`.
    pub fn elapsed_ticks_at(&self, now: Instant) -> u64 {
        let elapsed_ms = now.saturating_duration_since(self.start).as_millis() as u64;
        elapsed_ms / self.tick_interval_ms
    }

    /// Tick index for the current instant.
    pub fn current_tick(&self) -> u64 {
        self.elapsed_ticks_at(Instant::now())
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::new(1000)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
