//! Cache Key Module
//!
//! Content-addressed fingerprints for `(method, args)` call descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

// == Cache Key ==
/// Deterministic fingerprint of a remote call.
///
/// Hex-encoded SHA-256 over the JSON serialization of `{method, args}`.
/// Object keys inside `args` are hashed in insertion order, so two argument
/// objects that differ only in key order get different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps an already computed fingerprint (e.g. one taken from a URL path).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
struct CallDescriptor<'a> {
    method: &'a str,
    args: &'a Value,
}

// == Fingerprint ==
/// Hashes a call descriptor into a [`CacheKey`].
///
/// This does not check that `method` exists; use
/// [`CallSurface::key`](crate::surface::CallSurface::key) for the validated path.
pub fn fingerprint(method: &str, args: &Value) -> CacheKey {
    let canonical = serde_json::to_vec(&CallDescriptor { method, args })
        .expect("Value serialization is infallible");
    CacheKey(hex::encode(Sha256::digest(&canonical)))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint("tickets.list", &json!([{"status": "open", "page": 1}]));
        let b = fingerprint("tickets.list", &json!([{"status": "open", "page": 1}]));
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_method_sensitive() {
        let args = json!([1]);
        assert_ne!(fingerprint("tickets.get", &args), fingerprint("events.get", &args));
    }

    #[test]
    fn test_fingerprint_argument_order_sensitive() {
        assert_ne!(
            fingerprint("tickets.get", &json!([1, 2])),
            fingerprint("tickets.get", &json!([2, 1]))
        );
    }

    #[test]
    fn test_fingerprint_object_key_order_not_normalized() {
        // Key order is part of the fingerprint; this is a known limitation.
        let a: Value = serde_json::from_str(r#"[{"a": 1, "b": 2}]"#).unwrap();
        let b: Value = serde_json::from_str(r#"[{"b": 2, "a": 1}]"#).unwrap();
        assert_ne!(fingerprint("tickets.list", &a), fingerprint("tickets.list", &b));
    }

    #[test]
    fn test_fingerprint_top_level_object_key_order() {
        let a: Value = serde_json::from_str(r#"{"status": "open", "page": 1}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"page": 1, "status": "open"}"#).unwrap();
        assert_ne!(fingerprint("tickets.list", &a), fingerprint("tickets.list", &b));

        let again: Value = serde_json::from_str(r#"{"status": "open", "page": 1}"#).unwrap();
        assert_eq!(fingerprint("tickets.list", &a), fingerprint("tickets.list", &again));
    }

    #[test]
    fn test_cache_key_serializes_as_string() {
        let key = CacheKey::from_raw("abc");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""abc""#);
        assert_eq!(key.to_string(), "abc");
    }
}
