// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session persistence contract.

use async_trait::async_trait;

use crate::error::KerbError;
use crate::types::Session;

/// Keyed mapping from sender address to conversation state.
///
/// Concurrent turns for the same sender are not serialized by the store;
/// `save` is last-write-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for a sender, if one exists.
    async fn get(&self, sender: &str) -> Result<Option<Session>, KerbError>;

    /// Fetch the session for a sender, creating a fresh idle one if absent.
    async fn create_if_absent(&self, sender: &str) -> Result<Session, KerbError>;

    /// Persist the session's step and draft in a single statement.
    async fn save(&self, session: &Session) -> Result<(), KerbError>;

    /// Lazily create the user record for a sender on first contact.
    async fn ensure_user(
        &self,
        sender: &str,
        display_name: Option<&str>,
    ) -> Result<(), KerbError>;
}
