//! Call Surface Module
//!
//! The external collaborator that actually performs remote calls. Methods are
//! registered by dot-path name at startup; the cache only ever reaches them
//! through this registry.

mod http;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::cache::{fingerprint, CacheKey};
use crate::error::{CacheError, Result};

pub use http::{register_upstream, HttpMethod};

// == Remote Error ==
/// Failure value produced by a rejected remote call.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct RemoteError {
    /// Human-readable message
    pub message: String,
    /// Optional structured payload returned alongside the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

// == Remote Method ==
/// An asynchronous named operation on the call surface.
#[async_trait]
pub trait RemoteMethod: Send + Sync {
    async fn call(&self, args: Value) -> std::result::Result<Value, RemoteError>;
}

#[async_trait]
impl<F, Fut> RemoteMethod for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Value, RemoteError>> + Send + 'static,
{
    async fn call(&self, args: Value) -> std::result::Result<Value, RemoteError> {
        (self)(args).await
    }
}

// == Call Surface ==
/// Registry mapping dot-path method names to handlers.
#[derive(Clone, Default)]
pub struct CallSurface {
    methods: HashMap<String, Arc<dyn RemoteMethod>>,
}

impl CallSurface {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Adds (or replaces) a handler under `path`.
    ///
    /// Fails with `InvalidRequest` when the path is empty or has an empty segment.
    pub fn register<M>(&mut self, path: impl Into<String>, method: M) -> Result<()>
    where
        M: RemoteMethod + 'static,
    {
        let path = path.into();
        validate_method_path(&path)?;
        self.methods.insert(path, Arc::new(method));
        Ok(())
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with_method<M>(mut self, path: impl Into<String>, method: M) -> Result<Self>
    where
        M: RemoteMethod + 'static,
    {
        self.register(path, method)?;
        Ok(self)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.methods.contains_key(path)
    }

    // == Resolve ==
    /// Looks up the handler for `path`.
    pub fn resolve(&self, path: &str) -> Result<Arc<dyn RemoteMethod>> {
        self.methods
            .get(path)
            .cloned()
            .ok_or_else(|| CacheError::UnknownMethod(path.to_string()))
    }

    // == Key ==
    /// Validated fingerprint: fails fast with `UnknownMethod` on typos
    /// instead of caching a call that can never succeed.
    pub fn key(&self, method: &str, args: &Value) -> Result<CacheKey> {
        if !self.contains(method) {
            return Err(CacheError::UnknownMethod(method.to_string()));
        }
        Ok(fingerprint(method, args))
    }

    /// Sorted list of registered method names.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for CallSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSurface")
            .field("methods", &self.method_names())
            .finish()
    }
}

fn validate_method_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Method path cannot be empty".to_string(),
        ));
    }
    if path
        .split('.')
        .any(|segment| segment.is_empty() || segment.chars().any(char::is_whitespace))
    {
        return Err(CacheError::InvalidRequest(format!(
            "Malformed method path: {}",
            path
        )));
    }
    Ok(())
}
