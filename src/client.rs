//! Request Cache
//!
//! The consumer-facing handle: registration, force-fetch, reads, one-tick
//! evaluation, and the `query` / `mutate` hooks UI code builds on. One
//! instance owns the store and is cloned into every collaborator.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{
    CacheKey, CacheSettings, CacheStats, CacheStore, CacheSubscription, CacheView, ConsumerId,
    MAX_CONSUMER_ID_LENGTH,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::executor::{FetchExecutor, FetchOutcome};
use crate::surface::CallSurface;

// == Mutation ==
/// Result of a successful [`RequestCache::mutate`] call.
#[derive(Debug)]
pub struct Mutation {
    /// Payload returned by the mutating call
    pub data: Value,
    /// Refetches triggered for the listed keys
    pub refetches: Vec<JoinHandle<FetchOutcome>>,
}

// == Request Cache ==
/// Cloneable handle to the shared cache.
#[derive(Debug, Clone)]
pub struct RequestCache {
    cache: Arc<RwLock<CacheStore>>,
    surface: Arc<CallSurface>,
    executor: FetchExecutor,
    tick_interval: Duration,
}

impl RequestCache {
    // == Constructors ==
    pub fn new(surface: CallSurface, settings: CacheSettings) -> Self {
        let tick_interval = settings.tick_interval();
        let cache = Arc::new(RwLock::new(CacheStore::new(settings)));
        let surface = Arc::new(surface);
        let executor = FetchExecutor::new(cache.clone(), surface.clone());

        Self {
            cache,
            surface,
            executor,
            tick_interval,
        }
    }

    /// Creates a cache using the configured tick interval.
    pub fn from_config(surface: CallSurface, config: &Config) -> Self {
        Self::new(surface, CacheSettings::new(config.tick_interval_ms))
    }

    pub fn surface(&self) -> &CallSurface {
        &self.surface
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    // == Key ==
    /// Validated fingerprint of `(method, args)`.
    pub fn key(&self, method: &str, args: &Value) -> Result<CacheKey> {
        self.surface.key(method, args)
    }

    // == Register ==
    /// Declares interest in `(method, args)` with a refresh period in ticks.
    ///
    /// `None` or `Some(0)` asks for a single fetch. Registering does not fetch;
    /// the next scheduler tick picks the key up.
    pub async fn register(
        &self,
        method: &str,
        args: Value,
        consumer: impl Into<ConsumerId>,
        rate: Option<u64>,
    ) -> Result<CacheKey> {
        let consumer = consumer.into();
        validate_consumer(&consumer)?;
        let key = self.key(method, &args)?;

        self.cache
            .write()
            .await
            .register(key.clone(), method, args, consumer, rate);
        debug!("Registered {} ({}) every {:?} ticks", method, key, rate);

        Ok(key)
    }

    // == Unregister ==
    /// Drops one registration. Unknown keys or consumers are a no-op.
    pub async fn unregister(&self, key: &CacheKey, consumer: &str) -> bool {
        self.cache.write().await.unregister(key, consumer)
    }

    // == Force Fetch ==
    /// Fetches right away, ignoring subscribers, refresh rates and any fetch
    /// already in flight. A failure adds `score` to the error streak.
    ///
    /// Racing an in-flight fetch for the same key is allowed; whichever
    /// settles last is what the cache keeps.
    pub async fn force_fetch(
        &self,
        key: CacheKey,
        method: &str,
        args: Value,
        score: u32,
    ) -> JoinHandle<FetchOutcome> {
        let command = {
            let mut cache = self.cache.write().await;
            let tick = cache.current_tick();
            cache.issue_forced(key, method, args, score, tick)
        };
        debug!("Force-fetching {} ({}) with score {}", method, command.key, score);
        self.executor.spawn(command)
    }

    // == Run Tick ==
    /// Evaluates every key once and spawns a fetch for each eligible one.
    ///
    /// Eligibility and the issue mark happen under one write lock, so a key
    /// can never be issued twice by overlapping ticks.
    pub async fn run_tick(&self) -> Vec<JoinHandle<FetchOutcome>> {
        let (tick, commands) = {
            let mut cache = self.cache.write().await;
            let tick = cache.current_tick();
            (tick, cache.issue_scheduled(tick))
        };

        if !commands.is_empty() {
            debug!("Tick {}: issuing {} fetches", tick, commands.len());
        }

        commands
            .into_iter()
            .map(|command| self.executor.spawn(command))
            .collect()
    }

    // == Read ==
    pub async fn read(&self, key: &CacheKey) -> CacheView {
        self.cache.read().await.read(key)
    }

    pub async fn subscription(&self, key: &CacheKey) -> Option<CacheSubscription> {
        self.cache.read().await.subscription(key).cloned()
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    pub async fn current_tick(&self) -> u64 {
        self.cache.read().await.current_tick()
    }

    pub async fn settings(&self) -> CacheSettings {
        self.cache.read().await.settings().clone()
    }

    // == Query Hook ==
    /// Registers interest and returns the key with the current snapshot.
    pub async fn query(
        &self,
        method: &str,
        args: Value,
        consumer: impl Into<ConsumerId>,
        rate: Option<u64>,
    ) -> Result<(CacheKey, CacheView)> {
        let key = self.register(method, args, consumer, rate).await?;
        let view = self.read(&key).await;
        Ok((key, view))
    }

    // == Mutation Hook ==
    /// Performs an uncached call, then force-fetches each key in `refetch`
    /// that has a subscription record.
    ///
    /// On failure the error is returned and nothing is refetched.
    pub async fn mutate(
        &self,
        method: &str,
        args: Value,
        refetch: &[CacheKey],
        score: u32,
    ) -> Result<Mutation> {
        let handler = self.surface.resolve(method)?;
        let data = handler.call(args).await.map_err(CacheError::from)?;

        let descriptors: Vec<(CacheKey, String, Value)> = {
            let cache = self.cache.read().await;
            refetch
                .iter()
                .filter_map(|key| {
                    cache
                        .subscription(key)
                        .map(|sub| (key.clone(), sub.method.clone(), sub.args.clone()))
                })
                .collect()
        };

        let mut refetches = Vec::with_capacity(descriptors.len());
        for (key, method, args) in descriptors {
            refetches.push(self.force_fetch(key, &method, args, score).await);
        }

        Ok(Mutation { data, refetches })
    }
}

fn validate_consumer(consumer: &str) -> Result<()> {
    if consumer.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Consumer id cannot be empty".to_string(),
        ));
    }
    if consumer.len() > MAX_CONSUMER_ID_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Consumer id exceeds maximum length of {} bytes",
            MAX_CONSUMER_ID_LENGTH
        )));
    }
    Ok(())
}
