//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    force_fetch_handler, health_handler, mutate_handler, read_handler, register_handler,
    stats_handler, subscription_handler, unregister_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /subscriptions` - Register interest in a call
/// - `GET /subscriptions/:key` - Inspect a subscription record
/// - `DELETE /subscriptions/:key/:consumer` - Drop one registration
/// - `POST /fetch` - Force an immediate fetch
/// - `POST /mutate` - Uncached call followed by refetches
/// - `GET /cache/:key` - Read cached data / error / loading
/// - `GET /stats` - Fetch traffic statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/subscriptions", post(register_handler))
        .route("/subscriptions/:key", get(subscription_handler))
        .route("/subscriptions/:key/:consumer", delete(unregister_handler))
        .route("/fetch", post(force_fetch_handler))
        .route("/mutate", post(mutate_handler))
        .route("/cache/:key", get(read_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
