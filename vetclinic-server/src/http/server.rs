//! Axum server setup
//!
//! Server skeleton with:
//! - CORS open to any origin unless an allow-list is given
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::gateway::QueryGateway;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    /// Origins allowed by CORS. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            allowed_origins: Vec::new(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub gateway: QueryGateway,
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, ServerError> {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ServerError::InvalidOrigin(origin.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Build the application router over a gateway.
pub fn build_router(gateway: QueryGateway, config: &ServerConfig) -> Result<Router, ServerError> {
    let cors = cors_layer(&config.allowed_origins)?;
    let state = AppState { gateway };

    Ok(Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::tutors::router())
        .merge(routes::animals::router())
        .merge(routes::consultations::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state)))
}

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_server(gateway: QueryGateway, config: ServerConfig) -> Result<(), ServerError> {
    if config.allowed_origins.is_empty() {
        tracing::warn!("CORS: no origins configured, all origins allowed");
    }
    tracing::info!(slot_policy = %gateway.slot_policy(), "scheduling policy");

    let app = build_router(gateway, &config)?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRecordStore;
    use crate::scheduling::SlotPolicy;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn gateway() -> QueryGateway {
        QueryGateway::new(Arc::new(MemoryRecordStore::new(SlotPolicy::Global)))
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.bind_addr.ip().is_unspecified());
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn invalid_origin_rejected() {
        let config = ServerConfig {
            allowed_origins: vec!["http://bad\norigin".into()],
            ..Default::default()
        };
        assert!(matches!(
            build_router(gateway(), &config),
            Err(ServerError::InvalidOrigin(_))
        ));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = build_router(gateway(), &ServerConfig::default()).unwrap();
        let response = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_echoes_allowed_origin() {
        let config = ServerConfig {
            allowed_origins: vec!["http://front.clinic.test".into()],
            ..Default::default()
        };
        let app = build_router(gateway(), &config).unwrap();
        let response = app
            .oneshot(
                Request::get("/health")
                    .header("origin", "http://front.clinic.test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://front.clinic.test"
        );
    }
}
