//! Query Cache - A shared request cache and polling scheduler
//!
//! Deduplicates remote calls across many consumers, refreshes them on a
//! tick-driven schedule and tracks failures with a weighted backoff score.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod surface;
pub mod tasks;

pub use api::AppState;
pub use client::RequestCache;
pub use config::Config;
pub use surface::CallSurface;
pub use tasks::{spawn_scheduler, Scheduler};
