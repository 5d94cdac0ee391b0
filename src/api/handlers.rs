//! Request Handlers

use super::{
    errors::ApiError,
    middleware::RequestId,
    models::*,
};
use crate::casino::Casino;
use crate::ledger::{GlobalStats, RankField};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub casino: Arc<Casino>,
    pub started_at: DateTime<Utc>,
    pub version: String,
}

impl AppState {
    pub fn new(casino: Arc<Casino>) -> Self {
        Self {
            casino,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
    })
}

/// GET /api/status
pub async fn status_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let registered_accounts = state
        .casino
        .store()
        .account_count()
        .await
        .map_err(|e| ApiError::internal_error(request_id.0.clone(), format!("Failed to count accounts: {}", e)))?;

    let uptime_seconds = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Ok(Json(StatusResponse {
        status: "Running".to_string(),
        uptime: format_uptime(uptime_seconds),
        uptime_seconds,
        registered_accounts,
        active_blackjack_sessions: state.casino.sessions().active_count(),
        version: state.version.clone(),
    }))
}

/// GET /api/stats
pub async fn stats_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<GlobalStats>, ApiError> {
    state
        .casino
        .store()
        .global_stats()
        .await
        .map(Json)
        .map_err(|e| ApiError::internal_error(request_id.0, format!("Failed to read stats: {}", e)))
}

/// GET /api/leaderboard/:category?limit={n}
///
/// Unknown categories fall back to cash.
pub async fn leaderboard_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    if query.limit == 0 || query.limit > MAX_LEADERBOARD_LIMIT {
        return Err(ApiError::bad_request(
            request_id.0,
            format!("limit must be between 1 and {}", MAX_LEADERBOARD_LIMIT),
        ));
    }

    let field = category.parse::<RankField>().unwrap_or(RankField::Cash);
    let entries = state
        .casino
        .leaderboard(&field.to_string(), query.limit)
        .await
        .map_err(|e| ApiError::internal_error(request_id.0, format!("Failed to rank accounts: {}", e)))?;

    Ok(Json(LeaderboardResponse {
        category: field,
        entries,
    }))
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = state.casino.metrics();
    metrics.set_active_sessions(state.casino.sessions().active_count());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        metrics.render(),
    )
}
