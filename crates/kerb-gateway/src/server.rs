// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the webhook surface.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use kerb_config::model::{ServerConfig, WhatsAppConfig};
use kerb_core::KerbError;
use kerb_engine::ConversationEngine;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The conversation engine driving the booking dialog.
    pub engine: Arc<ConversationEngine>,
    /// Token echoed back during the webhook subscription handshake.
    pub verify_token: Option<String>,
    /// App secret for payload signature verification. `None` skips it.
    pub app_secret: Option<String>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(engine: Arc<ConversationEngine>, whatsapp: &WhatsAppConfig) -> Self {
        Self {
            engine,
            verify_token: whatsapp.verify_token.clone(),
            app_secret: whatsapp.app_secret.clone(),
            start_time: Instant::now(),
        }
    }
}

/// Build the webhook router.
///
/// Routes:
/// - POST /webhook: inbound message deliveries
/// - GET /webhook: subscription handshake
/// - GET /health: liveness probe
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route(
            "/webhook",
            post(handlers::post_webhook).get(handlers::verify_webhook),
        )
        .route("/health", get(handlers::get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve the webhook server until SIGINT.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), KerbError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| KerbError::Channel {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| KerbError::Channel {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
