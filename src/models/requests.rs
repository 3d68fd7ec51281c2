//! Request DTOs for the cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheKey;

fn empty_args() -> Value {
    Value::Array(Vec::new())
}

/// Request body for registering interest (POST /subscriptions)
///
/// # Fields
/// - `method`: Dot-path method name on the call surface
/// - `args`: Argument list (defaults to `[]`)
/// - `consumer`: Opaque consumer id
/// - `rate`: Optional refresh period in ticks (absent or 0 = fetch once)
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub method: String,
    #[serde(default = "empty_args")]
    pub args: Value,
    pub consumer: String,
    #[serde(default)]
    pub rate: Option<u64>,
}

impl RegisterRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.method.is_empty() {
            return Some("Method cannot be empty".to_string());
        }
        None
    }
}

/// Request body for an immediate refresh (POST /fetch)
#[derive(Debug, Clone, Deserialize)]
pub struct ForceFetchRequest {
    pub method: String,
    #[serde(default = "empty_args")]
    pub args: Value,
    /// Failure weight (defaults to 1)
    #[serde(default)]
    pub score: Option<u32>,
}

/// Request body for an uncached call followed by refetches (POST /mutate)
#[derive(Debug, Clone, Deserialize)]
pub struct MutateRequest {
    pub method: String,
    #[serde(default = "empty_args")]
    pub args: Value,
    /// Keys to refresh once the call succeeds
    #[serde(default)]
    pub refetch: Vec<CacheKey>,
    #[serde(default)]
    pub score: Option<u32>,
}
