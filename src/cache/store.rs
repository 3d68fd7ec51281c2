//! Cache Store Module
//!
//! The single authoritative state: cached results per key plus the
//! subscription records the scheduler evaluates. Every mutation is synchronous;
//! callers share the store behind one lock so a completion handler never
//! interleaves with another.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::{
    CacheItem, CacheKey, CacheSettings, CacheStats, CacheSubscription, CacheView, ConsumerId,
};
use crate::surface::RemoteError;

// == Fetch Command ==
/// Everything the executor needs to perform one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCommand {
    pub key: CacheKey,
    pub method: String,
    pub args: Value,
}

// == Cache Store ==
/// Cached items and subscription records for every known key.
#[derive(Debug)]
pub struct CacheStore {
    /// Fetch results, present once a key has settled at least once
    items: HashMap<CacheKey, CacheItem>,
    /// Registration and schedule bookkeeping
    subscriptions: HashMap<CacheKey, CacheSubscription>,
    /// Time base
    settings: CacheSettings,
    /// Traffic counters
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            items: HashMap::new(),
            subscriptions: HashMap::new(),
            settings,
            stats: CacheStats::new(),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Tick index for the current instant.
    pub fn current_tick(&self) -> u64 {
        self.settings.current_tick()
    }

    // == Register ==
    /// Adds one registration for `key`, creating the subscription record on
    /// first use. Does not fetch anything by itself.
    pub fn register(
        &mut self,
        key: CacheKey,
        method: &str,
        args: Value,
        consumer: ConsumerId,
        rate: Option<u64>,
    ) {
        self.subscriptions
            .entry(key)
            .or_insert_with(|| CacheSubscription::new(method, args))
            .add(consumer, rate);
    }

    // == Unregister ==
    /// Drops the first registration `consumer` holds on `key`.
    ///
    /// Unknown keys and consumers are ignored. The record itself is kept even
    /// when no subscribers remain.
    pub fn unregister(&mut self, key: &CacheKey, consumer: &str) -> bool {
        self.subscriptions
            .get_mut(key)
            .map(|sub| sub.remove(consumer))
            .unwrap_or(false)
    }

    pub fn subscription(&self, key: &CacheKey) -> Option<&CacheSubscription> {
        self.subscriptions.get(key)
    }

    pub fn item(&self, key: &CacheKey) -> Option<&CacheItem> {
        self.items.get(key)
    }

    // == Read ==
    /// Current `{data, error, loading}` view for `key`.
    pub fn read(&self, key: &CacheKey) -> CacheView {
        self.items
            .get(key)
            .map(CacheView::from)
            .unwrap_or_else(CacheView::pending)
    }

    // == Due Fetches ==
    /// Keys the scheduler may fetch at `tick`, ordered by key.
    pub fn due_fetches(&self, tick: u64) -> Vec<FetchCommand> {
        let mut due: Vec<FetchCommand> = self
            .subscriptions
            .iter()
            .filter(|(_, sub)| sub.is_eligible(tick))
            .map(|(key, sub)| FetchCommand {
                key: key.clone(),
                method: sub.method.clone(),
                args: sub.args.clone(),
            })
            .collect();
        due.sort_by(|a, b| a.key.cmp(&b.key));
        due
    }

    // == Issue Scheduled ==
    /// Evaluates one tick: marks every eligible key as issued and returns the
    /// commands to run.
    pub fn issue_scheduled(&mut self, tick: u64) -> Vec<FetchCommand> {
        self.stats.record_tick();
        let due = self.due_fetches(tick);
        for command in &due {
            if let Some(sub) = self.subscriptions.get_mut(&command.key) {
                sub.mark_issued(tick);
                self.stats.record_scheduled();
            }
        }
        due
    }

    // == Issue Forced ==
    /// Marks a forced fetch as issued with an explicit failure weight.
    ///
    /// Skips every eligibility check. A key with no record gets a
    /// zero-subscriber one to carry the score and tick bookkeeping.
    pub fn issue_forced(
        &mut self,
        key: CacheKey,
        method: &str,
        args: Value,
        score: u32,
        tick: u64,
    ) -> FetchCommand {
        let sub = self
            .subscriptions
            .entry(key.clone())
            .or_insert_with(|| CacheSubscription::new(method, args.clone()));
        sub.score = score;
        sub.mark_issued(tick);
        self.stats.record_forced();

        FetchCommand {
            key,
            method: method.to_string(),
            args,
        }
    }

    // == Complete Fetch ==
    /// Applies a settled fetch.
    ///
    /// Success overwrites data and clears failure accounting. Failure keeps
    /// prior data and adds the current score to the error streak. Either way
    /// the score resets to 1 and the response tick advances, which is what
    /// lets the scheduler consider the key again.
    pub fn complete_fetch(
        &mut self,
        key: &CacheKey,
        outcome: Result<Value, RemoteError>,
        tick: u64,
    ) {
        let score = self
            .subscriptions
            .get_mut(key)
            .map(|sub| sub.mark_settled(tick))
            .unwrap_or(1);

        let item = self.items.entry(key.clone()).or_default();
        match outcome {
            Ok(data) => {
                item.apply_success(data);
                self.stats.record_success();
            }
            Err(error) => {
                item.apply_failure(error, score);
                self.stats.record_failure();
            }
        }
    }

    // == Stats ==
    /// Returns current traffic statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_key_counts(self.subscriptions.len(), self.items.len());
        stats
    }

    /// Number of subscription records.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fingerprint;
    use serde_json::json;

    fn key(id: u64) -> CacheKey {
        fingerprint("tickets.get", &json!([id]))
    }

    fn register(store: &mut CacheStore, id: u64, consumer: &str, rate: Option<u64>) -> CacheKey {
        let k = key(id);
        store.register(k.clone(), "tickets.get", json!([id]), consumer.to_string(), rate);
        k
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::default();
        assert!(store.is_empty());
        assert_eq!(store.stats(), CacheStats::default());
    }

    #[test]
    fn test_register_dedups_by_key() {
        let mut store = CacheStore::default();
        for consumer in ["a", "b", "c"] {
            register(&mut store, 1, consumer, Some(5));
        }

        assert_eq!(store.len(), 1);
        let sub = store.subscription(&key(1)).unwrap();
        assert_eq!(sub.subscribers().len(), 3);
        assert_eq!(sub.method, "tickets.get");
        assert_eq!(sub.args, json!([1]));

        assert!(store.unregister(&key(1), "b"));
        assert_eq!(store.subscription(&key(1)).unwrap().subscribers(), ["a", "c"]);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let mut store = CacheStore::default();
        register(&mut store, 1, "a", None);

        assert!(!store.unregister(&key(1), "zzz"));
        assert!(!store.unregister(&key(2), "a"));
        assert_eq!(store.subscription(&key(1)).unwrap().subscribers().len(), 1);
    }

    #[test]
    fn test_zero_subscriber_record_is_kept_but_never_scheduled() {
        let mut store = CacheStore::default();
        let k = register(&mut store, 1, "a", Some(1));
        store.unregister(&k, "a");

        assert_eq!(store.len(), 1);
        assert!(store.issue_scheduled(0).is_empty());
    }

    #[test]
    fn test_registration_does_not_create_item() {
        let mut store = CacheStore::default();
        let k = register(&mut store, 1, "a", None);
        assert!(store.item(&k).is_none());
        assert!(store.read(&k).loading);
    }

    #[test]
    fn test_issue_scheduled_marks_in_flight() {
        let mut store = CacheStore::default();
        let k = register(&mut store, 1, "a", Some(2));

        let issued = store.issue_scheduled(0);
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].key, k);
        assert_eq!(issued[0].args, json!([1]));

        // Still outstanding, so no duplicate
        assert!(store.issue_scheduled(1).is_empty());
        assert!(store.issue_scheduled(10).is_empty());

        store.complete_fetch(&k, Ok(json!({"id": 1})), 10);
        assert!(store.issue_scheduled(11).is_empty());
        assert_eq!(store.issue_scheduled(12).len(), 1);

        let stats = store.stats();
        assert_eq!(stats.ticks, 5);
        assert_eq!(stats.scheduled_fetches, 2);
        assert_eq!(stats.successes, 1);
    }

    #[test]
    fn test_due_fetches_sorted_by_key() {
        let mut store = CacheStore::default();
        for id in 0..10 {
            register(&mut store, id, "a", None);
        }
        let due = store.due_fetches(0);
        assert_eq!(due.len(), 10);
        assert!(due.windows(2).all(|w| w[0].key < w[1].key));
    }

    #[test]
    fn test_stale_while_revalidate() {
        let mut store = CacheStore::default();
        let k = register(&mut store, 1, "a", Some(1));

        store.issue_scheduled(0);
        store.complete_fetch(&k, Ok(json!("X")), 0);

        store.issue_scheduled(1);
        store.complete_fetch(&k, Err(RemoteError::new("offline")), 1);
        let view = store.read(&k);
        assert_eq!(view.data, Some(json!("X")));
        assert_eq!(view.error, Some(RemoteError::new("offline")));
        assert!(!view.loading);

        store.issue_scheduled(2);
        store.complete_fetch(&k, Ok(json!("Y")), 2);
        let view = store.read(&k);
        assert_eq!(view.data, Some(json!("Y")));
        assert!(view.error.is_none());
        assert_eq!(view.error_streak, 0);
    }

    #[test]
    fn test_forced_failure_uses_supplied_score_once() {
        let mut store = CacheStore::default();
        let k = register(&mut store, 1, "a", None);

        store.issue_forced(k.clone(), "tickets.get", json!([1]), 5, 0);
        assert_eq!(store.subscription(&k).unwrap().score, 5);

        store.complete_fetch(&k, Err(RemoteError::new("boom")), 1);
        assert_eq!(store.item(&k).unwrap().error_streak, 5);
        assert_eq!(store.subscription(&k).unwrap().score, 1);

        // Plain failure afterwards only weighs 1
        store.issue_forced(k.clone(), "tickets.get", json!([1]), 1, 2);
        store.complete_fetch(&k, Err(RemoteError::new("boom")), 2);
        assert_eq!(store.item(&k).unwrap().error_streak, 6);
    }

    #[test]
    fn test_forced_on_unknown_key_creates_empty_record() {
        let mut store = CacheStore::default();
        let k = key(9);

        let command = store.issue_forced(k.clone(), "tickets.get", json!([9]), 2, 3);
        assert_eq!(command.method, "tickets.get");

        let sub = store.subscription(&k).unwrap();
        assert!(!sub.has_subscribers());
        assert_eq!(sub.last_fetch_tick, Some(3));
        assert_eq!(sub.in_flight, 1);
        assert_eq!(store.stats().forced_fetches, 1);
    }

    #[test]
    fn test_forced_ignores_in_flight_guard() {
        let mut store = CacheStore::default();
        let k = register(&mut store, 1, "a", Some(1));
        store.issue_scheduled(0);

        store.issue_forced(k.clone(), "tickets.get", json!([1]), 1, 0);
        assert_eq!(store.subscription(&k).unwrap().in_flight, 2);

        store.complete_fetch(&k, Ok(json!(1)), 1);
        assert!(store.issue_scheduled(2).is_empty());
        store.complete_fetch(&k, Ok(json!(2)), 1);
        assert_eq!(store.issue_scheduled(2).len(), 1);
        assert_eq!(store.read(&k).data, Some(json!(2)));
    }

    #[test]
    fn test_stats_key_counts() {
        let mut store = CacheStore::default();
        let k = register(&mut store, 1, "a", None);
        register(&mut store, 2, "a", None);
        store.issue_scheduled(0);
        store.complete_fetch(&k, Ok(json!(null)), 0);

        let stats = store.stats();
        assert_eq!(stats.subscriptions, 2);
        assert_eq!(stats.items, 1);
        assert_eq!(stats.in_flight(), 1);
    }
}
