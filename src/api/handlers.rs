//! API Handlers
//!
//! HTTP request handlers translating each endpoint into one cache operation.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheService, CacheStore, LatencySimulator};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, CounterResponse, DeleteResponse, ExistsResponse, GetResponse, HealthResponse,
    KeysQuery, KeysResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache facade; clones share one store
    pub cache: CacheService,
}

impl AppState {
    pub fn new(cache: CacheService) -> Self {
        Self { cache }
    }

    /// Creates state around `store` using the configured latency.
    pub fn from_config(config: &Config, store: Arc<CacheStore>) -> Self {
        Self::new(CacheService::new(store, config.latency()))
    }

    /// State over a fresh store with no simulated latency.
    pub fn in_memory() -> Self {
        Self::new(CacheService::new(
            Arc::new(CacheStore::new()),
            LatencySimulator::disabled(),
        ))
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(msg) => Err(CacheError::InvalidRequest(msg)),
        None => Ok(key),
    }
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let key = checked_key(key)?;
    match state.cache.get::<Value>(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /cache/:key
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let key = checked_key(key)?;
    state.cache.set(&key, &req.value, req.ttl()).await?;
    Ok(Json(SetResponse::new(key, true)))
}

/// Handler for PUT /cache/:key/nx
pub async fn set_if_not_exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let key = checked_key(key)?;
    let stored = state
        .cache
        .set_if_not_exists(&key, &req.value, req.ttl())
        .await?;
    Ok(Json(SetResponse::new(key, stored)))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let key = checked_key(key)?;
    let deleted = state.cache.delete(&key).await;
    Ok(Json(DeleteResponse::new(key, deleted)))
}

/// Handler for GET /cache/:key/exists
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ExistsResponse>> {
    let key = checked_key(key)?;
    let exists = state.cache.exists(&key).await;
    Ok(Json(ExistsResponse::new(key, exists)))
}

/// Handler for POST /cache/:key/incr
pub async fn increment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CounterResponse>> {
    let key = checked_key(key)?;
    let value = state.cache.increment(&key).await;
    Ok(Json(CounterResponse::new(key, value)))
}

/// Handler for POST /cache/:key/decr
pub async fn decrement_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<CounterResponse>> {
    let key = checked_key(key)?;
    let value = state.cache.decrement(&key).await;
    Ok(Json(CounterResponse::new(key, value)))
}

/// Handler for GET /keys?pattern=
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Json<KeysResponse> {
    let pattern = query.pattern();
    let keys = state.cache.get_keys(pattern).await;
    Json(KeysResponse::new(pattern, keys))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
