//! HTTP Upstream Methods
//!
//! Remote methods backed by an HTTP upstream. A dot path such as
//! `tickets.list` is served by `POST {base}/tickets/list` with the JSON
//! arguments as the request body.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::{CallSurface, RemoteError, RemoteMethod};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == HTTP Method ==
/// A single upstream endpoint exposed as a [`RemoteMethod`].
#[derive(Debug, Clone)]
pub struct HttpMethod {
    client: reqwest::Client,
    url: String,
}

impl HttpMethod {
    /// Creates a method for `path` under `base_url`.
    pub fn new(client: reqwest::Client, base_url: &str, path: &str) -> Self {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.replace('.', "/")
        );
        Self { client, url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteMethod for HttpMethod {
    async fn call(&self, args: Value) -> std::result::Result<Value, RemoteError> {
        let response = self
            .client
            .post(&self.url)
            .json(&args)
            .send()
            .await
            .map_err(|e| RemoteError::new(format!("request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            // Body is best-effort context; upstreams may not answer with JSON
            let body = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<Value>(&body).unwrap_or_else(|_| json!(body));
            return Err(
                RemoteError::new(format!("upstream returned {}", status)).with_details(details)
            );
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RemoteError::new(format!("invalid response body: {}", e)))
    }
}

// == Register Upstream ==
/// Registers every configured upstream method on `surface`.
///
/// The shared client carries the upstream timeout; the cache itself never
/// times out a fetch.
pub fn register_upstream(surface: &mut CallSurface, config: &Config) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .build()
        .map_err(|e| CacheError::Internal(format!("failed to build HTTP client: {}", e)))?;

    for path in &config.upstream_methods {
        let method = HttpMethod::new(client.clone(), &config.upstream_url, path);
        info!("Registered upstream method {} -> {}", path, method.url());
        surface.register(path.clone(), method)?;
    }

    Ok(())
}
