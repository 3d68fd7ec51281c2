//! API Handlers
//!
//! HTTP request handlers exposing registration, force-fetch, mutation and the
//! read surface to out-of-process consumers.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheKey, DEFAULT_SCORE};
use crate::client::RequestCache;
use crate::error::{CacheError, Result};
use crate::models::{
    ForceFetchRequest, ForceFetchResponse, HealthResponse, MutateRequest, MutateResponse,
    ReadResponse, RegisterRequest, RegisterResponse, StatsResponse, SubscriptionResponse,
    UnregisterResponse,
};

/// Application state shared across all handlers.
///
/// `RequestCache` is already a cheap, cloneable handle around the shared store.
#[derive(Clone)]
pub struct AppState {
    pub cache: RequestCache,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: RequestCache) -> Self {
        Self { cache }
    }
}

/// Handler for POST /subscriptions
///
/// Registers a consumer's interest in `(method, args)` and returns the key.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = state
        .cache
        .register(&req.method, req.args, req.consumer.clone(), req.rate)
        .await?;

    Ok(Json(RegisterResponse::new(key, &req.consumer)))
}

/// Handler for DELETE /subscriptions/:key/:consumer
///
/// Always succeeds; `removed` reports whether a registration was dropped.
pub async fn unregister_handler(
    State(state): State<AppState>,
    Path((key, consumer)): Path<(String, String)>,
) -> Json<UnregisterResponse> {
    let key = CacheKey::from_raw(key);
    let removed = state.cache.unregister(&key, &consumer).await;

    Json(UnregisterResponse {
        key,
        consumer,
        removed,
    })
}

/// Handler for GET /subscriptions/:key
pub async fn subscription_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<SubscriptionResponse>> {
    let key = CacheKey::from_raw(key);
    let sub = state
        .cache
        .subscription(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

    Ok(Json(SubscriptionResponse::new(key, &sub)))
}

/// Handler for POST /fetch
///
/// Issues a fetch immediately and returns without waiting for it to settle.
pub async fn force_fetch_handler(
    State(state): State<AppState>,
    Json(req): Json<ForceFetchRequest>,
) -> Result<Json<ForceFetchResponse>> {
    let key = state.cache.key(&req.method, &req.args)?;
    let score = req.score.unwrap_or(DEFAULT_SCORE);

    // Detached: the fetch writes its own result back
    state
        .cache
        .force_fetch(key.clone(), &req.method, req.args, score)
        .await;

    Ok(Json(ForceFetchResponse::new(key, score)))
}

/// Handler for POST /mutate
///
/// Runs an uncached call and refreshes the listed keys on success.
pub async fn mutate_handler(
    State(state): State<AppState>,
    Json(req): Json<MutateRequest>,
) -> Result<Json<MutateResponse>> {
    let mutation = state
        .cache
        .mutate(
            &req.method,
            req.args,
            &req.refetch,
            req.score.unwrap_or(DEFAULT_SCORE),
        )
        .await?;

    Ok(Json(MutateResponse {
        data: mutation.data,
        refetched: mutation.refetches.len(),
    }))
}

/// Handler for GET /cache/:key
///
/// Unknown keys read as loading rather than 404.
pub async fn read_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ReadResponse> {
    let key = CacheKey::from_raw(key);
    let view = state.cache.read(&key).await;

    Json(ReadResponse { key, view })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let settings = state.cache.settings().await;

    Json(StatsResponse::new(
        stats,
        settings.current_tick(),
        settings.tick_interval_ms(),
        settings.started_at(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
