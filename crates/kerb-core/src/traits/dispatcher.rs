// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound reply contract for messaging provider integrations.

use async_trait::async_trait;

use crate::error::KerbError;
use crate::types::{MessageId, ReplyChoice};

/// Sends replies back to a sender through the messaging provider.
///
/// Both operations are fire-and-forget from the state machine's
/// perspective: the turn runner logs failures and does not retry.
#[async_trait]
pub trait ReplyDispatcher: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, to: &str, body: &str) -> Result<MessageId, KerbError>;

    /// Send a prompt with selectable buttons.
    ///
    /// Providers impose a cap on the number of options; implementations
    /// truncate longer choice lists.
    async fn send_interactive(
        &self,
        to: &str,
        prompt: &str,
        choices: &[ReplyChoice],
    ) -> Result<MessageId, KerbError>;
}
