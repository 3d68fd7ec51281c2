//! Fetch Executor
//!
//! Runs issued fetch commands against the call surface and writes the outcome
//! back into the store. Failures are absorbed here and turned into state;
//! nothing a remote call does can propagate to the scheduler.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheStore, FetchCommand};
use crate::surface::{CallSurface, RemoteError};

// == Fetch Outcome ==
/// How a fetch settled.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Succeeded,
    Failed(RemoteError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Succeeded)
    }
}

// == Fetch Executor ==
/// Shared handle pairing the store with the call surface.
#[derive(Debug, Clone)]
pub struct FetchExecutor {
    cache: Arc<RwLock<CacheStore>>,
    surface: Arc<CallSurface>,
}

impl FetchExecutor {
    pub fn new(cache: Arc<RwLock<CacheStore>>, surface: Arc<CallSurface>) -> Self {
        Self { cache, surface }
    }

    // == Spawn ==
    /// Runs `command` on its own task.
    ///
    /// The command must already be marked as issued in the store. There is
    /// no cancellation: the task always settles and always writes back.
    pub fn spawn(&self, command: FetchCommand) -> JoinHandle<FetchOutcome> {
        let executor = self.clone();
        tokio::spawn(async move { executor.run(command).await })
    }

    // == Run ==
    /// Calls the surface and applies the result.
    ///
    /// A method that vanished from the surface settles as a failure so the
    /// key does not stay in flight forever.
    pub async fn run(&self, command: FetchCommand) -> FetchOutcome {
        let FetchCommand { key, method, args } = command;
        debug!("Fetching {} ({})", method, key);

        let result = match self.surface.resolve(&method) {
            Ok(handler) => handler.call(args).await,
            Err(e) => Err(RemoteError::new(e.to_string())),
        };

        let outcome = match &result {
            Ok(_) => FetchOutcome::Succeeded,
            Err(error) => {
                warn!("Fetch of {} ({}) failed: {}", method, key, error);
                FetchOutcome::Failed(error.clone())
            }
        };

        let mut cache = self.cache.write().await;
        let tick = cache.current_tick();
        cache.complete_fetch(&key, result, tick);
        debug!("Fetch of {} ({}) settled at tick {}", method, key, tick);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{fingerprint, CacheKey, CacheSettings};
    use serde_json::{json, Value};
    use tokio_test::{assert_err, assert_ok};

    fn setup() -> (Arc<RwLock<CacheStore>>, FetchExecutor) {
        let surface = CallSurface::new()
            .with_method("tickets.get", |args: Value| async move {
                Ok::<_, RemoteError>(json!({"id": args[0]}))
            })
            .unwrap()
            .with_method("tickets.broken", |_: Value| async {
                Err::<Value, _>(RemoteError::new("500 Internal Server Error"))
            })
            .unwrap();
        let cache = Arc::new(RwLock::new(CacheStore::new(CacheSettings::new(1000))));
        let executor = FetchExecutor::new(cache.clone(), Arc::new(surface));
        (cache, executor)
    }

    async fn issue(cache: &Arc<RwLock<CacheStore>>, method: &str, score: u32) -> FetchCommand {
        let args = json!([42]);
        let key = fingerprint(method, &args);
        cache.write().await.issue_forced(key, method, args, score, 0)
    }

    #[tokio::test]
    async fn test_run_success_writes_data() {
        let (cache, executor) = setup();
        let command = issue(&cache, "tickets.get", 1).await;
        let key = command.key.clone();

        let outcome = executor.run(command).await;
        assert!(outcome.is_success());

        let cache = cache.read().await;
        let view = cache.read(&key);
        assert_eq!(view.data, Some(json!({"id": 42})));
        assert!(!view.loading);
        let sub = cache.subscription(&key).unwrap();
        assert_eq!(sub.in_flight, 0);
        assert_eq!(sub.last_response_tick, Some(0));
    }

    #[tokio::test]
    async fn test_run_failure_is_absorbed() {
        let (cache, executor) = setup();
        let command = issue(&cache, "tickets.broken", 3).await;
        let key = command.key.clone();

        let outcome = assert_ok!(executor.spawn(command).await);
        assert_eq!(
            outcome,
            FetchOutcome::Failed(RemoteError::new("500 Internal Server Error"))
        );

        let cache = cache.read().await;
        let item = cache.item(&key).unwrap();
        assert!(item.data.is_none());
        assert_eq!(item.error_streak, 3);
        assert_eq!(cache.subscription(&key).unwrap().score, 1);
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_run_unknown_method_settles_as_failure() {
        let (cache, executor) = setup();
        let key = CacheKey::from_raw("orphan");
        assert_err!(executor.surface.key("tickets.gone", &json!([])));
        let command = cache
            .write()
            .await
            .issue_forced(key.clone(), "tickets.gone", json!([]), 1, 0);

        let outcome = executor.run(command).await;
        assert!(!outcome.is_success());

        let cache = cache.read().await;
        assert_eq!(cache.subscription(&key).unwrap().in_flight, 0);
        let error = cache.item(&key).unwrap().error.clone().unwrap();
        assert!(error.message.contains("tickets.gone"));
    }
}
