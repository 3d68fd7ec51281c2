//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::str::FromStr;

const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Wall-clock duration of one scheduler tick in milliseconds
    pub tick_interval_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream call surface
    pub upstream_url: String,
    /// Dot-path method names the upstream exposes
    pub upstream_methods: Vec<String>,
    /// Per-call timeout applied by the HTTP call surface
    pub upstream_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TICK_INTERVAL_MS` - Tick duration in milliseconds (default: 1000, zero is rejected)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream base URL (default: http://127.0.0.1:8080)
    /// - `UPSTREAM_METHODS` - Comma-separated method paths (default: none)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream call timeout (default: 30)
    pub fn from_env() -> Self {
        let tick_interval_ms = parse_var::<u64>("TICK_INTERVAL_MS")
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS);

        Self {
            tick_interval_ms,
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            upstream_url: env::var("UPSTREAM_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
            upstream_methods: env::var("UPSTREAM_METHODS")
                .map(|raw| parse_method_list(&raw))
                .unwrap_or_default(),
            upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            server_port: DEFAULT_SERVER_PORT,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_methods: Vec::new(),
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Splits a comma-separated method list, dropping blanks.
fn parse_method_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}
