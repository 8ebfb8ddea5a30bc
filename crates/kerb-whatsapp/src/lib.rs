// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API adapter for the Kerb booking bot.
//!
//! Implements [`ReplyDispatcher`] against the Cloud API `/messages`
//! endpoint and provides inbound payload decoding and webhook signature
//! verification for the gateway.

pub mod payload;
pub mod signature;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use kerb_config::model::WhatsAppConfig;
use kerb_core::{KerbError, MessageId, ReplyChoice, ReplyDispatcher};

/// Cloud API cap on buttons per interactive message.
const MAX_BUTTONS: usize = 3;
/// Cloud API cap on button title length.
const MAX_BUTTON_TITLE: usize = 20;

/// Outbound client for the WhatsApp Cloud API.
pub struct WhatsAppClient {
    http: reqwest::Client,
    access_token: String,
    phone_number_id: String,
    api_base: String,
}

impl WhatsAppClient {
    /// Creates a client from config.
    ///
    /// Requires `whatsapp.access_token` and `whatsapp.phone_number_id`.
    pub fn new(config: &WhatsAppConfig) -> Result<Self, KerbError> {
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                KerbError::Config("whatsapp.access_token is required for outbound sends".into())
            })?;
        let phone_number_id = config
            .phone_number_id
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                KerbError::Config("whatsapp.phone_number_id is required for outbound sends".into())
            })?;

        Ok(Self {
            http: reqwest::Client::new(),
            access_token,
            phone_number_id,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.phone_number_id)
    }

    async fn post(&self, payload: serde_json::Value) -> Result<MessageId, KerbError> {
        let response = self
            .http
            .post(self.messages_url())
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| KerbError::Channel {
                message: format!("failed to reach WhatsApp API: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KerbError::Channel {
                message: format!("WhatsApp API returned {status}: {body}"),
                source: None,
            });
        }

        let sent: SendResponse = response.json().await.map_err(|e| KerbError::Channel {
            message: format!("invalid WhatsApp API response: {e}"),
            source: Some(Box::new(e)),
        })?;
        let id = sent
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .unwrap_or_default();
        Ok(MessageId(id))
    }
}

#[async_trait]
impl ReplyDispatcher for WhatsAppClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<MessageId, KerbError> {
        self.post(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "text",
            "text": { "preview_url": false, "body": body },
        }))
        .await
    }

    async fn send_interactive(
        &self,
        to: &str,
        prompt: &str,
        choices: &[ReplyChoice],
    ) -> Result<MessageId, KerbError> {
        if choices.len() > MAX_BUTTONS {
            warn!(
                count = choices.len(),
                "too many interactive choices, truncating"
            );
        }
        let buttons: Vec<serde_json::Value> = choices
            .iter()
            .take(MAX_BUTTONS)
            .map(|choice| {
                let title: String = choice.label.chars().take(MAX_BUTTON_TITLE).collect();
                json!({
                    "type": "reply",
                    "reply": { "id": choice.id, "title": title },
                })
            })
            .collect();

        self.post(json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": "interactive",
            "interactive": {
                "type": "button",
                "body": { "text": prompt },
                "action": { "buttons": buttons },
            },
        }))
        .await
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> WhatsAppConfig {
        WhatsAppConfig {
            access_token: Some("token-1".into()),
            phone_number_id: Some("5550001".into()),
            verify_token: None,
            app_secret: None,
            api_base: server.uri(),
        }
    }

    fn sent_ok() -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "messages": [{ "id": "wamid.out.1" }] }))
    }

    #[test]
    fn new_requires_credentials() {
        let config = WhatsAppConfig {
            access_token: None,
            phone_number_id: Some("5550001".into()),
            verify_token: None,
            app_secret: None,
            api_base: "https://graph.facebook.com/v21.0".into(),
        };
        assert!(matches!(
            WhatsAppClient::new(&config),
            Err(KerbError::Config(_))
        ));

        let config = WhatsAppConfig {
            access_token: Some("token-1".into()),
            phone_number_id: Some(String::new()),
            verify_token: None,
            app_secret: None,
            api_base: "https://graph.facebook.com/v21.0".into(),
        };
        assert!(matches!(
            WhatsAppClient::new(&config),
            Err(KerbError::Config(_))
        ));
    }

    #[tokio::test]
    async fn send_text_posts_to_messages_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/5550001/messages"))
            .and(header("authorization", "Bearer token-1"))
            .and(body_partial_json(serde_json::json!({
                "to": "919900001111",
                "type": "text",
                "text": { "body": "Where should we pick you up?" },
            })))
            .respond_with(sent_ok())
            .expect(1)
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config_for(&server)).unwrap();
        let id = client
            .send_text("919900001111", "Where should we pick you up?")
            .await
            .unwrap();
        assert_eq!(id, MessageId("wamid.out.1".into()));
    }

    #[tokio::test]
    async fn send_interactive_truncates_to_three_buttons() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/5550001/messages"))
            .respond_with(sent_ok())
            .expect(1)
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config_for(&server)).unwrap();
        let choices: Vec<ReplyChoice> = (0..5)
            .map(|i| ReplyChoice::new(&format!("c{i}"), &format!("Choice {i}")))
            .collect();
        client
            .send_interactive("919900001111", "Pick one", &choices)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let buttons = body["interactive"]["action"]["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[0]["reply"]["id"], "c0");
    }

    #[tokio::test]
    async fn api_error_surfaces_as_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let client = WhatsAppClient::new(&config_for(&server)).unwrap();
        let result = client.send_text("919900001111", "hello").await;
        assert!(matches!(result, Err(KerbError::Channel { .. })));
    }
}
