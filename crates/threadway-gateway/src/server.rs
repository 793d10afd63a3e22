// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use threadway_agent::ChatOrchestrator;
use threadway_core::{PluginAdapter, ThreadwayError};
use threadway_twilio::SignatureVerifier;
use tokio_util::sync::CancellationToken;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// State for the health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    /// Adapters whose health checks make up the report.
    pub components: Vec<Arc<dyn PluginAdapter>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<ChatOrchestrator>,
    /// `None` disables signature verification.
    pub verifier: Option<Arc<SignatureVerifier>>,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors GatewayConfig from threadway-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path Twilio posts inbound messages to. Status callbacks use `{path}/status`.
    pub webhook_path: String,
    pub max_concurrent_requests: usize,
}

/// Build the application router.
///
/// - POST {webhook_path}
/// - POST, GET {webhook_path}/status
/// - GET /health
pub fn build_router(config: &ServerConfig, state: GatewayState) -> Router {
    let webhook_path = match config.webhook_path.trim_end_matches('/') {
        "" => "/",
        path => path,
    };
    let status_path = format!("{}/status", webhook_path.trim_end_matches('/'));

    Router::new()
        .route(webhook_path, post(handlers::post_webhook))
        .route(
            &status_path,
            post(handlers::post_status).get(handlers::get_status),
        )
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Runs until `shutdown` is cancelled, then stops accepting connections and
/// waits for in-flight requests to finish.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ThreadwayError> {
    let app = build_router(config, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ThreadwayError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!(webhook_path = %config.webhook_path, "gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ThreadwayError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
