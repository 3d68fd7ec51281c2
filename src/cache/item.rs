//! Cache Item Module
//!
//! Per-key fetch results with stale-while-revalidate semantics.

use serde::Serialize;
use serde_json::Value;

use crate::cache::clock::current_timestamp_ms;
use crate::surface::RemoteError;

// == Cache Item ==
/// Result of the most recent completed fetches for one key.
///
/// Created by the first completion (success or failure) and updated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheItem {
    /// Last successful payload, kept across later failures
    pub data: Option<Value>,
    /// Failure from the most recent completion, cleared on success
    pub error: Option<RemoteError>,
    /// Score-weighted count of failures since the last success
    pub error_streak: u32,
    /// Completion timestamp (Unix milliseconds)
    pub updated_at: u64,
}

impl CacheItem {
    // == Apply Success ==
    /// Overwrites data and clears all failure accounting.
    pub fn apply_success(&mut self, data: Value) {
        self.data = Some(data);
        self.error = None;
        self.error_streak = 0;
        self.updated_at = current_timestamp_ms();
    }

    // == Apply Failure ==
    /// Records the failure weighted by `score`. Prior data stays untouched.
    pub fn apply_failure(&mut self, error: RemoteError, score: u32) {
        self.error = Some(error);
        self.error_streak = self.error_streak.saturating_add(score);
        self.updated_at = current_timestamp_ms();
    }

    /// An error is present but last known good data is still being served.
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }

    /// An error is present and there is nothing to fall back on.
    pub fn is_hard_error(&self) -> bool {
        self.data.is_none() && self.error.is_some()
    }
}

// == Cache View ==
/// Read-side snapshot handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheView {
    pub data: Option<Value>,
    pub error: Option<RemoteError>,
    /// True until the first completion for the key, regardless of later refreshes
    pub loading: bool,
    pub error_streak: u32,
}

impl CacheView {
    /// View of a key that has never completed a fetch.
    pub fn pending() -> Self {
        Self {
            data: None,
            error: None,
            loading: true,
            error_streak: 0,
        }
    }
}

impl From<&CacheItem> for CacheView {
    fn from(item: &CacheItem) -> Self {
        Self {
            data: item.data.clone(),
            error: item.error.clone(),
            loading: false,
            error_streak: item.error_streak,
        }
    }
}
