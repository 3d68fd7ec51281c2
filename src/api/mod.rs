//! API Module
//!
//! HTTP handlers and routing for the request cache.
//!
//! # Endpoints
//! - `POST /subscriptions` - Register interest in a call
//! - `GET /subscriptions/:key` - Inspect a subscription record
//! - `DELETE /subscriptions/:key/:consumer` - Drop one registration
//! - `POST /fetch` - Force an immediate fetch
//! - `POST /mutate` - Uncached call followed by refetches
//! - `GET /cache/:key` - Read cached data
//! - `GET /stats` - Fetch traffic statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
