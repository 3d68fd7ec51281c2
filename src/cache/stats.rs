//! Cache Statistics Module
//!
//! Tracks fetch traffic: how many fetches were issued, forced, and how they settled.

use serde::Serialize;

// == Cache Stats ==
/// Tracks fetch traffic counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Scheduler ticks evaluated
    pub ticks: u64,
    /// Fetches issued by the scheduler
    pub scheduled_fetches: u64,
    /// Fetches issued through the force-fetch path
    pub forced_fetches: u64,
    /// Fetches that settled successfully
    pub successes: u64,
    /// Fetches that settled with a failure
    pub failures: u64,
    /// Keys with a subscription record
    pub subscriptions: usize,
    /// Keys with a cached item
    pub items: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Failure Rate ==
    /// Returns failures / (successes + failures), or 0.0 if nothing settled yet.
    pub fn failure_rate(&self) -> f64 {
        let total = self.successes + self.failures;
        if total == 0 {
            0.0
        } else {
            self.failures as f64 / total as f64
        }
    }

    /// Fetches issued but not yet settled.
    pub fn in_flight(&self) -> u64 {
        (self.scheduled_fetches + self.forced_fetches)
            .saturating_sub(self.successes + self.failures)
    }

    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    pub fn record_scheduled(&mut self) {
        self.scheduled_fetches += 1;
    }

    pub fn record_forced(&mut self) {
        self.forced_fetches += 1;
    }

    pub fn record_success(&mut self) {
        self.successes += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    // == Update Key Counts ==
    /// Updates the subscription and item counts.
    pub fn set_key_counts(&mut self, subscriptions: usize, items: usize) {
        self.subscriptions = subscriptions;
        self.items = items;
    }
}
