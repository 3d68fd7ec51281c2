//! Scheduler Task
//!
//! Recurring tick loop that issues every due fetch.

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::client::RequestCache;

/// Spawns the tick loop for `cache`.
///
/// The timer fires once per tick interval, the first time immediately. Late
/// fires are not caught up in a burst; the tick index is recomputed from the
/// clock on each fire, so delays never accumulate into drift.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the loop
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_scheduler(cache.clone());
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_scheduler(cache: RequestCache) -> JoinHandle<()> {
    let period = cache.tick_interval();

    tokio::spawn(async move {
        info!("Starting scheduler with tick interval of {:?}", period);

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let issued = cache.run_tick().await;
            if issued.is_empty() {
                debug!("Scheduler tick: nothing due");
            } else {
                debug!("Scheduler tick: issued {} fetches", issued.len());
            }
        }
    })
}

// == Scheduler ==
/// Owns the tick loop handle.
///
/// Starting again replaces the running loop with a fresh one; the cache's
/// start time is untouched, so tick indices carry on where they were.
#[derive(Debug)]
pub struct Scheduler {
    cache: RequestCache,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(cache: RequestCache) -> Self {
        Self {
            cache,
            handle: None,
        }
    }

    // == Start ==
    /// Spawns the tick loop, aborting a previous one if present.
    pub fn start(&mut self) {
        if let Some(previous) = self.handle.take() {
            previous.abort();
            info!("Scheduler restarted");
        }
        self.handle = Some(spawn_scheduler(self.cache.clone()));
    }

    // == Stop ==
    /// Aborts the tick loop. Returns false if it was not running.
    ///
    /// Fetches already issued keep running and still write their results.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                info!("Scheduler stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}
