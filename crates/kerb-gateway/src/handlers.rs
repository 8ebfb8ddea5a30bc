// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook surface.
//!
//! The provider treats any non-2xx as a delivery failure and retries,
//! which would replay the turn. So POST /webhook acknowledges with an
//! empty 200 no matter how the turn went; the only refusal is 403 for a
//! payload that fails signature verification, before any decoding.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, warn};

use kerb_whatsapp::{payload, signature};

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /webhook
///
/// Verifies the payload signature when an app secret is configured,
/// decodes at most one inbound turn, and runs it through the engine.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(app_secret) = &state.app_secret {
        let provided = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !signature::verify(app_secret, &body, provided) {
            warn!("webhook payload failed signature verification");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match payload::decode(content_type, &body) {
        Ok(Some(turn)) => state.engine.handle_turn(&turn).await,
        Ok(None) => debug!("webhook delivery carried no user message"),
        Err(e) => warn!(error = %e, "undecodable webhook payload"),
    }

    StatusCode::OK.into_response()
}

/// GET /webhook
///
/// Subscription handshake: echoes `hub.challenge` when `hub.mode` is
/// `subscribe` and `hub.verify_token` matches the configured token.
pub async fn verify_webhook(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge");

    match (&state.verify_token, mode, token, challenge) {
        (Some(expected), Some("subscribe"), Some(provided), Some(challenge))
            if provided == expected =>
        {
            (StatusCode::OK, challenge.clone()).into_response()
        }
        _ => {
            warn!("webhook verification attempt rejected");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use http::StatusCode;
    use tower::ServiceExt;

    use kerb_config::model::WhatsAppConfig;
    use kerb_core::{SessionStore, Step};
    use kerb_engine::ConversationEngine;
    use kerb_test_utils::{MemoryStore, MockDispatcher};

    use crate::server::{GatewayState, build_router};

    const BOOK_CAB_BODY: &[u8] = br#"{"entry":[{"changes":[{"value":{"messages":[{"from":"919900001111","type":"text","text":{"body":"book cab"}}]}}]}]}"#;
    // HMAC-SHA256 of BOOK_CAB_BODY keyed with "secret-1".
    const BOOK_CAB_SIGNATURE: &str =
        "sha256=c2694fe7a98a774432bd68f2494311b647f78764e3ff490ed305d7be4bfbfc4c";

    fn whatsapp_config(verify_token: Option<&str>, app_secret: Option<&str>) -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: None,
            phone_number_id: None,
            verify_token: verify_token.map(str::to_string),
            app_secret: app_secret.map(str::to_string),
            api_base: "https://graph.facebook.com/v21.0".into(),
        }
    }

    fn router_with(
        verify_token: Option<&str>,
        app_secret: Option<&str>,
    ) -> (Arc<MemoryStore>, Arc<MockDispatcher>, Router) {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(MockDispatcher::new());
        let engine = Arc::new(ConversationEngine::new(
            store.clone(),
            store.clone(),
            dispatcher.clone(),
            5,
        ));
        let state = GatewayState::new(engine, &whatsapp_config(verify_token, app_secret));
        (store, dispatcher, build_router(state))
    }

    fn post_webhook(body: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(body.to_vec()))
            .unwrap()
    }

    #[tokio::test]
    async fn delivery_advances_dialog_and_acks_empty_200() {
        let (store, dispatcher, router) = router_with(None, None);
        let response = router.oneshot(post_webhook(BOOK_CAB_BODY)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());

        let session = store.get("919900001111").await.unwrap().unwrap();
        assert_eq!(session.step, Step::AwaitingPickup);
        assert_eq!(dispatcher.sent_count().await, 1);
    }

    #[tokio::test]
    async fn status_only_delivery_still_acks() {
        let (store, _dispatcher, router) = router_with(None, None);
        let body = br#"{"entry":[{"changes":[{"value":{"statuses":[{"status":"delivered"}]}}]}]}"#;
        let response = router.oneshot(post_webhook(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(store.get("919900001111").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undecodable_payload_still_acks() {
        let (_store, _dispatcher, router) = router_with(None, None);
        let response = router.oneshot(post_webhook(b"{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn valid_signature_is_accepted() {
        let (store, _dispatcher, router) = router_with(None, Some("secret-1"));
        let mut request = post_webhook(BOOK_CAB_BODY);
        request
            .headers_mut()
            .insert("x-hub-signature-256", BOOK_CAB_SIGNATURE.parse().unwrap());

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(store.get("919900001111").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn bad_signature_is_refused_before_decoding() {
        let (store, _dispatcher, router) = router_with(None, Some("secret-1"));
        let mut request = post_webhook(BOOK_CAB_BODY);
        request
            .headers_mut()
            .insert("x-hub-signature-256", "sha256=deadbeef".parse().unwrap());

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(store.get("919900001111").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_signature_is_refused_when_secret_configured() {
        let (_store, _dispatcher, router) = router_with(None, Some("secret-1"));
        let response = router.oneshot(post_webhook(BOOK_CAB_BODY)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn handshake_echoes_challenge() {
        let (_store, _dispatcher, router) = router_with(Some("verify-1"), None);
        let request = Request::builder()
            .uri("/webhook?hub.mode=subscribe&hub.verify_token=verify-1&hub.challenge=12345")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"12345");
    }

    #[tokio::test]
    async fn handshake_with_wrong_token_is_refused() {
        let (_store, _dispatcher, router) = router_with(Some("verify-1"), None);
        let request = Request::builder()
            .uri("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=12345")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn handshake_without_configured_token_is_refused() {
        let (_store, _dispatcher, router) = router_with(None, None);
        let request = Request::builder()
            .uri("/webhook?hub.mode=subscribe&hub.verify_token=anything&hub.challenge=12345")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (_store, _dispatcher, router) = router_with(None, None);
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
