// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reply dispatcher for deterministic testing.
//!
//! `MockDispatcher` implements `ReplyDispatcher`, capturing every send for
//! assertion and optionally failing on demand to exercise the engine's
//! log-and-drop failure path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use kerb_core::{KerbError, MessageId, Reply, ReplyChoice, ReplyDispatcher};

/// One captured outbound send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub to: String,
    pub reply: Reply,
}

/// A mock messaging dispatcher for testing.
pub struct MockDispatcher {
    sent: Arc<Mutex<Vec<SentReply>>>,
    fail_sends: AtomicBool,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Make every subsequent send fail with a channel error.
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// All captured sends, in order.
    pub async fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().await.clone()
    }

    /// The most recent captured send.
    pub async fn last_sent(&self) -> Option<SentReply> {
        self.sent.lock().await.last().cloned()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    async fn record(&self, to: &str, reply: Reply) -> Result<MessageId, KerbError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(KerbError::Channel {
                message: "mock dispatcher set to fail".to_string(),
                source: None,
            });
        }
        self.sent.lock().await.push(SentReply {
            to: to.to_string(),
            reply,
        });
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyDispatcher for MockDispatcher {
    async fn send_text(&self, to: &str, body: &str) -> Result<MessageId, KerbError> {
        self.record(to, Reply::Text(body.to_string())).await
    }

    async fn send_interactive(
        &self,
        to: &str,
        prompt: &str,
        choices: &[ReplyChoice],
    ) -> Result<MessageId, KerbError> {
        self.record(
            to,
            Reply::Interactive {
                prompt: prompt.to_string(),
                choices: choices.to_vec(),
            },
        )
        .await
    }
}
