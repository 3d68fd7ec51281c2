//! Cache Subscription Module
//!
//! Per-key registration bookkeeping and the scheduler's eligibility predicate.

use serde::Serialize;
use serde_json::Value;

/// Opaque consumer identifier.
pub type ConsumerId = String;

// == Cache Subscription ==
/// Who wants a key, how often, and where its fetch cycle stands.
///
/// `subscribers` and `requested_rates` are parallel lists with one entry per
/// registration. A consumer registering twice holds two entries; nothing
/// merges them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSubscription {
    /// Method path used to perform the fetch
    pub method: String,
    /// Arguments used to perform the fetch
    pub args: Value,
    subscribers: Vec<ConsumerId>,
    /// Refresh period in ticks; `None` or `Some(0)` means fetch once
    requested_rates: Vec<Option<u64>>,
    /// Tick at which a fetch was last issued
    pub last_fetch_tick: Option<u64>,
    /// Tick at which a fetch last settled
    pub last_response_tick: Option<u64>,
    /// Weight the next failure adds to the error streak
    pub score: u32,
    /// Issued fetches that have not settled yet
    pub in_flight: u32,
}

impl CacheSubscription {
    // == Constructor ==
    /// Creates a record with no registrations and a neutral score.
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            method: method.into(),
            args,
            subscribers: Vec::new(),
            requested_rates: Vec::new(),
            last_fetch_tick: None,
            last_response_tick: None,
            score: 1,
            in_flight: 0,
        }
    }

    // == Add ==
    /// Appends one registration.
    pub fn add(&mut self, consumer: ConsumerId, rate: Option<u64>) {
        self.subscribers.push(consumer);
        self.requested_rates.push(rate);
    }

    // == Remove ==
    /// Removes the first registration held by `consumer`.
    ///
    /// Returns false (and changes nothing) when the consumer holds none.
    pub fn remove(&mut self, consumer: &str) -> bool {
        match self.subscribers.iter().position(|c| c == consumer) {
            Some(index) => {
                self.subscribers.remove(index);
                self.requested_rates.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn subscribers(&self) -> &[ConsumerId] {
        &self.subscribers
    }

    pub fn requested_rates(&self) -> &[Option<u64>] {
        &self.requested_rates
    }

    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    // == Effective Rate ==
    /// Smallest positive requested rate, or `None` when every registration
    /// is one-shot.
    pub fn effective_rate(&self) -> Option<u64> {
        self.requested_rates
            .iter()
            .filter_map(|rate| rate.filter(|r| *r > 0))
            .min()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight > 0
    }

    // == Is Eligible ==
    /// Whether the scheduler may issue a fetch for this key at `tick`.
    ///
    /// Never eligible while a previous fetch is still outstanding. A key with
    /// only one-shot registrations is fetched once and then left alone.
    pub fn is_eligible(&self, tick: u64) -> bool {
        if !self.has_subscribers() || self.is_in_flight() {
            return false;
        }

        if self.last_fetch_tick.is_none() {
            return true;
        }

        match (self.effective_rate(), self.last_response_tick) {
            (Some(rate), Some(responded)) => tick.saturating_sub(responded) >= rate,
            _ => false,
        }
    }

    // == Fetch Lifecycle ==
    /// Records that a fetch was issued at `tick`.
    pub fn mark_issued(&mut self, tick: u64) {
        self.last_fetch_tick = Some(tick);
        self.in_flight = self.in_flight.saturating_add(1);
    }

    /// Records that a fetch settled at `tick`.
    ///
    /// Returns the score in effect for this completion and resets it to 1.
    pub fn mark_settled(&mut self, tick: u64) -> u32 {
        self.last_response_tick = Some(tick);
        self.in_flight = self.in_flight.saturating_sub(1);
        std::mem::replace(&mut self.score, 1)
    }
}
