//! Status server setup

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::casino::Casino;
use crate::config::StatusConfig;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Status server configuration
#[derive(Debug, Clone)]
pub struct StatusServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for StatusServerConfig {
    fn default() -> Self {
        Self::from(&StatusConfig::default())
    }
}

impl From<&StatusConfig> for StatusServerConfig {
    fn from(config: &StatusConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            allowed_origins: config.allowed_origins.clone(),
            request_timeout_secs: 30,
        }
    }
}

pub struct StatusServer {
    config: StatusServerConfig,
    casino: Arc<Casino>,
}

impl StatusServer {
    pub fn new(config: StatusServerConfig, casino: Arc<Casino>) -> Self {
        Self { config, casino }
    }

    /// Serve until ctrl-c or SIGTERM
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.socket_addr()?;
        let app = self.create_app();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Status server listening on http://{}", addr);
        info!("   GET  /health");
        info!("   GET  /api/status");
        info!("   GET  /api/stats");
        info!("   GET  /api/leaderboard/:category");
        info!("   GET  /metrics");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Status server stopped");
        Ok(())
    }

    /// Router with the middleware stack applied
    pub fn create_app(&self) -> axum::Router {
        let state = Arc::new(AppState::new(self.casino.clone()));

        create_router(state)
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(create_cors_layer(self.config.allowed_origins.clone()))
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        Ok(SocketAddr::from((
            self.config.host.parse::<std::net::IpAddr>()?,
            self.config.port,
        )))
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::games::CoinSide;
    use crate::storage::JsonLedger;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn app() -> (TempDir, Arc<Casino>, axum::Router) {
        let dir = TempDir::new().unwrap();
        let ledger = JsonLedger::open(dir.path().join("data.json"), 1000).await.unwrap();
        let config = ConfigBuilder::new().without_cooldowns().build();
        let casino = Arc::new(Casino::new(Arc::new(ledger), config).unwrap());
        let router = StatusServer::new(StatusServerConfig::default(), casino.clone()).create_app();
        (dir, casino, router)
    }

    async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, _casino, router) = app().await;
        let (status, body) = get_json(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Running");
    }

    #[tokio::test]
    async fn test_status_and_stats() {
        let (_dir, casino, router) = app().await;
        casino.coinflip_landing("1", "100", "heads", CoinSide::Tails).await.unwrap();

        let (status, body) = get_json(router.clone(), "/api/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["registered_accounts"], 1);
        assert_eq!(body["active_blackjack_sessions"], 0);

        let (_, stats) = get_json(router, "/api/stats").await;
        assert_eq!(stats["total_bets"], 1);
        assert_eq!(stats["total_cash_lost"], 100);
    }

    #[tokio::test]
    async fn test_leaderboard_falls_back_to_cash() {
        let (_dir, casino, router) = app().await;
        casino.coinflip_landing("rich", "500", "heads", CoinSide::Heads).await.unwrap();
        casino.profile("poor").await.unwrap();

        let (status, body) = get_json(router.clone(), "/api/leaderboard/luck?limit=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "cash");
        assert_eq!(body["entries"][0]["user_id"], "rich");
        assert_eq!(body["entries"][0]["value"], 1500);

        let (status, body) = get_json(router, "/api/leaderboard/cash?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body["request_id"].is_string());
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (_dir, casino, router) = app().await;
        casino.slots("m", "10").await.unwrap();

        let response = router
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("casino_games_total{game=\"slots\""));
        assert!(text.contains("casino_active_blackjack_sessions 0"));
    }
}
