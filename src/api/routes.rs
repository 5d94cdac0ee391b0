//! Route Definitions

use super::handlers::*;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Build the status router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/leaderboard/:category", get(leaderboard_handler))
        // Prometheus scrape target
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
