//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheKey, CacheStats, CacheSubscription, CacheView};

/// Response body for POST /subscriptions
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    /// Success message
    pub message: String,
    /// Fingerprint the consumer should read from
    pub key: CacheKey,
}

impl RegisterResponse {
    pub fn new(key: CacheKey, consumer: &str) -> Self {
        Self {
            message: format!("Consumer '{}' registered", consumer),
            key,
        }
    }
}

/// Response body for DELETE /subscriptions/:key/:consumer
#[derive(Debug, Clone, Serialize)]
pub struct UnregisterResponse {
    pub key: CacheKey,
    pub consumer: String,
    /// False when the consumer held no registration on the key
    pub removed: bool,
}

/// Response body for POST /fetch
#[derive(Debug, Clone, Serialize)]
pub struct ForceFetchResponse {
    pub message: String,
    pub key: CacheKey,
    pub score: u32,
}

impl ForceFetchResponse {
    pub fn new(key: CacheKey, score: u32) -> Self {
        Self {
            message: format!("Fetch issued for '{}'", key),
            key,
            score,
        }
    }
}

/// Response body for POST /mutate
#[derive(Debug, Clone, Serialize)]
pub struct MutateResponse {
    pub data: Value,
    /// Number of keys refetched
    pub refetched: usize,
}

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct ReadResponse {
    pub key: CacheKey,
    #[serde(flatten)]
    pub view: CacheView,
}

/// Response body for GET /subscriptions/:key
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub key: CacheKey,
    pub method: String,
    pub args: Value,
    pub subscribers: Vec<String>,
    pub requested_rates: Vec<Option<u64>>,
    /// Refresh period the scheduler applies, None for fetch-once keys
    pub effective_rate: Option<u64>,
    pub last_fetch_tick: Option<u64>,
    pub last_response_tick: Option<u64>,
    pub score: u32,
    pub in_flight: u32,
}

impl SubscriptionResponse {
    pub fn new(key: CacheKey, sub: &CacheSubscription) -> Self {
        Self {
            key,
            method: sub.method.clone(),
            args: sub.args.clone(),
            subscribers: sub.subscribers().to_vec(),
            requested_rates: sub.requested_rates().to_vec(),
            effective_rate: sub.effective_rate(),
            last_fetch_tick: sub.last_fetch_tick,
            last_response_tick: sub.last_response_tick,
            score: sub.score,
            in_flight: sub.in_flight,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// failures / (successes + failures)
    pub failure_rate: f64,
    pub in_flight: u64,
    /// Tick index at the time of the request
    pub current_tick: u64,
    pub tick_interval_ms: u64,
    /// Cache start time in ISO 8601 format
    pub started_at: String,
}

impl StatsResponse {
    pub fn new(
        stats: CacheStats,
        current_tick: u64,
        tick_interval_ms: u64,
        started_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            failure_rate: stats.failure_rate(),
            in_flight: stats.in_flight(),
            stats,
            current_tick,
            tick_interval_ms,
            started_at: started_at.to_rfc3339(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RemoteError;
    use serde_json::json;

    #[test]
    fn test_read_response_flattens_view() {
        let resp = ReadResponse {
            key: CacheKey::from_raw("k1"),
            view: CacheView {
                data: Some(json!([1, 2])),
                error: Some(RemoteError::new("stale")),
                loading: false,
                error_streak: 2,
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "k1");
        assert_eq!(json["data"], json!([1, 2]));
        assert_eq!(json["error"]["message"], "stale");
        assert_eq!(json["loading"], false);
        assert_eq!(json["error_streak"], 2);
    }

    #[test]
    fn test_subscription_response() {
        let mut sub = CacheSubscription::new("tickets.list", json!([]));
        sub.add("a".to_string(), Some(10));
        sub.add("b".to_string(), None);
        sub.add("c".to_string(), Some(4));

        let resp = SubscriptionResponse::new(CacheKey::from_raw("k"), &sub);
        assert_eq!(resp.subscribers, vec!["a", "b", "c"]);
        assert_eq!(resp.requested_rates, vec![Some(10), None, Some(4)]);
        assert_eq!(resp.effective_rate, Some(4));
        assert_eq!(resp.score, 1);
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let mut stats = CacheStats::new();
        stats.record_scheduled();
        stats.record_failure();
        let resp = StatsResponse::new(stats, 12, 1000, chrono::Utc::now());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["scheduled_fetches"], 1);
        assert_eq!(json["failures"], 1);
        assert_eq!(json["failure_rate"], 1.0);
        assert_eq!(json["current_tick"], 12);
        assert!(json["started_at"].is_string());
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
